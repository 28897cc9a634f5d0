/*!
  The parser for the predicate mini-language. The grammar is exactly

      predicate  ::=  symbol operator immediate

  and nothing else: three tokens, no nesting. The result is a three node
  expression tree with the operator at the root.
*/

use string_cache::DefaultAtom;

use crate::bytecode::Word;
use crate::error::PredicateError;
use super::token::{OperatorKind, Token, Tokenizer};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
  Symbol(DefaultAtom),
  Immediate(Word),
  Operator {
    kind  :  OperatorKind,
    left  :  Box<Node>,
    right :  Box<Node>
  }
}

fn unexpected(expected: &str, found: Option<Token>) -> PredicateError {
  match found {
    Some(token) => PredicateError::Parse(format!("expected {}, found `{}`", expected, token)),
    None        => PredicateError::Parse(format!("expected {}, found end of input", expected))
  }
}

pub fn parse(text: &str) -> Result<Node, PredicateError> {
  let mut tokenizer = Tokenizer::new(text);

  let left =
    match tokenizer.next_token()? {
      Some(Token::Symbol(name)) => Node::Symbol(name),
      other => return Err(unexpected("a symbol", other))
    };

  let kind =
    match tokenizer.next_token()? {
      Some(Token::Operator(kind)) => kind,
      other => return Err(unexpected("an operator", other))
    };

  let right =
    match tokenizer.next_token()? {
      Some(Token::Immediate(value)) => Node::Immediate(value),
      other => return Err(unexpected("an immediate", other))
    };

  match tokenizer.next_token()? {
    None => Ok(Node::Operator {
      kind,
      left: Box::new(left),
      right: Box::new(right)
    }),
    other => Err(unexpected("end of input", other))
  }
}
