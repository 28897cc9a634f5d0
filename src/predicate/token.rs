/*!
  The tokenizer for the predicate mini-language. A token is classified by its
  first character: a digit starts an immediate (C-style, so a `0x` prefix
  selects hexadecimal), a letter starts a symbol run of alphanumerics, and
  anything else starts an operator, matched against a fixed table of operator
  spellings by longest match. Whitespace separates tokens and is otherwise
  ignored.
*/

use std::fmt::{Display, Formatter};

use string_cache::DefaultAtom;

use crate::bytecode::Word;
use crate::chariter::CharIter;
use crate::error::PredicateError;

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum OperatorKind {
  Equal,
  GreaterThan,
  /// Tokenized and parsed, but rejected by the compiler: there is no
  /// evaluator opcode for it.
  Increment
}

/// Operator spellings. Longest match wins; table order breaks ties among
/// candidates of equal length.
pub const OPERATOR_TABLE: [(&str, OperatorKind); 3] = [
  ("=",  OperatorKind::Equal),
  (">",  OperatorKind::GreaterThan),
  ("++", OperatorKind::Increment)
];

impl Display for OperatorKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    for (repr, kind) in OPERATOR_TABLE.iter() {
      if kind == self {
        return write!(f, "{}", repr);
      }
    }
    unreachable!("Every operator kind has a table entry.");
  }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Token {
  Symbol(DefaultAtom),
  Immediate(Word),
  Operator(OperatorKind)
}

impl Display for Token {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Token::Symbol(name)     => write!(f, "{}", name),
      Token::Immediate(value) => write!(f, "{}", value),
      Token::Operator(kind)   => write!(f, "{}", kind)
    }
  }
}

fn find_operator(text: &str) -> Option<(&'static str, OperatorKind)> {
  let mut found: Option<(&'static str, OperatorKind)> = None;
  for (repr, kind) in OPERATOR_TABLE.iter() {
    if text.starts_with(repr) {
      match found {
        Some((best, _)) if best.len() >= repr.len() => {}
        _ => {
          found = Some((*repr, *kind));
        }
      }
    }
  }
  found
}

#[derive(Clone, Debug)]
pub struct Tokenizer<'d> {
  chars: CharIter<'d>
}

impl<'d> Tokenizer<'d> {
  pub fn new(text: &'d str) -> Self {
    Tokenizer {
      chars: CharIter::new(text)
    }
  }

  fn next_immediate(&mut self) -> Result<Token, PredicateError> {
    let rest = self.chars.data();

    // A C integer literal: `0x` selects base 16, otherwise base 10.
    if rest.starts_with("0x") || rest.starts_with("0X") {
      self.chars.next();
      self.chars.next();
      let digits =
        self.chars
            .take_prefix(|c| c.is_ascii_hexdigit())
            .ok_or_else(|| PredicateError::Parse(format!("`{}` is not a number", rest)))?;
      return Word::from_str_radix(digits, 16)
                  .map(Token::Immediate)
                  .map_err(|_| PredicateError::Parse(format!("`0x{}` does not fit in a word", digits)));
    }

    // `next_token` guarantees at least one digit is present.
    let digits = self.chars.take_prefix(|c| c.is_ascii_digit()).unwrap();
    digits.parse::<Word>()
          .map(Token::Immediate)
          .map_err(|_| PredicateError::Parse(format!("`{}` does not fit in a word", digits)))
  }

  fn next_operator(&mut self) -> Result<Token, PredicateError> {
    // Characters like `٣` or `²` are alphanumeric without being ASCII
    // digits or alphabetic, so they fall through to this branch and the
    // prefix comes up empty. They must surface as errors, never a panic.
    let rest = self.chars.data();
    let run =
      self.chars
          .take_prefix(|c| !c.is_alphanumeric() && !c.is_whitespace())
          .ok_or_else(|| PredicateError::Parse(format!("`{}` is not an operator", rest)))?;
    // Consume the whole run of operator characters, then require an exact
    // table match: `>=` must not silently read as `>`.
    match find_operator(run) {
      Some((repr, kind)) if repr.len() == run.len() => Ok(Token::Operator(kind)),
      _ => Err(PredicateError::Parse(format!("`{}` is not an operator", run)))
    }
  }

  pub fn next_token(&mut self) -> Result<Option<Token>, PredicateError> {
    self.chars.trim_left();

    let first =
      match self.chars.peek() {
        Some(c) => c,
        None => return Ok(None)
      };

    let token =
      if first.is_ascii_digit() {
        self.next_immediate()?
      } else if first.is_alphabetic() {
        let name = self.chars.take_prefix(|c| c.is_ascii_alphanumeric()).unwrap();
        Token::Symbol(DefaultAtom::from(name))
      } else {
        self.next_operator()?
      };

    Ok(Some(token))
  }
}

impl<'d> Iterator for Tokenizer<'d> {
  type Item = Result<Token, PredicateError>;

  fn next(&mut self) -> Option<Self::Item> {
    self.next_token().transpose()
  }
}
