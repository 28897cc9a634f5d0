/*!
  Error types for the machine and for the predicate subsystem.

  Machine errors are terminal: once one occurs the machine transitions to
  `MachineStatus::Failed` and no further steps are valid. Predicate errors are
  local to whoever submitted the predicate; they never affect the machine
  being debugged.
*/

use thiserror::Error;

/// A fatal condition encountered while stepping the machine.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum MachineError {

  #[error("invalid opcode {0}")]
  InvalidOpcode(u8),

  #[error("register index {0} out of range")]
  InvalidRegisterIndex(u8),

  #[error("unknown array {0}")]
  UnknownArray(u32),

  #[error("offset {offset} out of bounds for array {id} of length {length}")]
  OutOfBounds {
    id: u32,
    offset: u32,
    length: u32
  },

  #[error("division by zero")]
  DivisionByZero,

  #[error("output value {0} does not fit in one byte")]
  OutputOutOfRange(u32),

  #[error("cannot abandon the program array")]
  AbandonedProgram,

  #[error("codex length {0} is not a multiple of 4 bytes")]
  MalformedCodex(usize),

  #[error("i/o failure: {0}")]
  Io(String),

}

/// A failure while compiling or evaluating a predicate.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum PredicateError {

  #[error("parse error: {0}")]
  Parse(String),

  #[error("unresolved symbol `{0}`")]
  UnresolvedSymbol(String),

  #[error("operator `{0}` has no evaluator opcode")]
  UnsupportedOperator(String),

  #[error("predicate bytecode exceeds {0} cells")]
  CodeTooLong(usize),

  #[error("evaluator stack overflow")]
  StackOverflow,

  #[error("evaluator stack underflow")]
  StackUnderflow,

}
