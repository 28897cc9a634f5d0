/*!
  Lowers a predicate expression tree to the flat stack bytecode the evaluator
  runs: a post-order walk emits the operand pushes, then the operator's
  opcode, then the `Done` sentinel.
*/

use std::fmt::{Display, Formatter};

use string_cache::DefaultAtom;

use crate::bytecode::Word;
use crate::error::PredicateError;
use super::parser::Node;
use super::token::OperatorKind;

/// The code buffer is bounded like the evaluator's stack.
pub const CODE_SIZE: usize = 1024;

/// One cell of predicate bytecode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Code {
  PushSymbol(DefaultAtom),
  PushImmediate(Word),
  Equal,
  GreaterThan,
  /// Sentinel: evaluation ends here.
  Done
}

impl Display for Code {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Code::PushSymbol(name)     => write!(f, "PushSymbol({})", name),
      Code::PushImmediate(value) => write!(f, "PushImmediate({})", value),
      Code::Equal                => write!(f, "Equal"),
      Code::GreaterThan          => write!(f, "GreaterThan"),
      Code::Done                 => write!(f, "Done")
    }
  }
}

pub fn compile(node: &Node) -> Result<Vec<Code>, PredicateError> {
  let mut code = Vec::new();
  emit(node, &mut code)?;
  push(&mut code, Code::Done)?;
  Ok(code)
}

fn emit(node: &Node, code: &mut Vec<Code>) -> Result<(), PredicateError> {
  match node {

    Node::Symbol(name) => {
      push(code, Code::PushSymbol(name.clone()))
    }

    Node::Immediate(value) => {
      push(code, Code::PushImmediate(*value))
    }

    Node::Operator { kind, left, right } => {
      emit(left, code)?;
      emit(right, code)?;
      let opcode =
        match kind {
          OperatorKind::Equal       => Code::Equal,
          OperatorKind::GreaterThan => Code::GreaterThan,
          OperatorKind::Increment   => {
            // In the operator table but with no evaluator opcode; rejected
            // here rather than left to fall off the end of the program.
            return Err(PredicateError::UnsupportedOperator(kind.to_string()));
          }
        };
      push(code, opcode)
    }

  }
}

fn push(code: &mut Vec<Code>, op: Code) -> Result<(), PredicateError> {
  if code.len() >= CODE_SIZE {
    return Err(PredicateError::CodeTooLong(CODE_SIZE));
  }
  code.push(op);
  Ok(())
}
