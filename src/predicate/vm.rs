/*!
  The stack machine that evaluates compiled predicates. Symbols are resolved
  through a caller-supplied `SymbolResolver` capability, which is the sole
  coupling point to whatever is being inspected; the evaluator itself knows
  nothing about the target machine.
*/

use crate::bytecode::Word;
use crate::error::PredicateError;
use super::compiler::Code;

pub const STACK_SIZE: usize = 1024;

/// Maps a predicate symbol name to its live value, `None` if the name is
/// unknown.
pub trait SymbolResolver {
  fn resolve(&self, symbol: &str) -> Option<Word>;
}

pub struct PredicateVm {
  stack: Vec<Word>
}

impl PredicateVm {

  pub fn new() -> PredicateVm {
    PredicateVm {
      stack: Vec::new()
    }
  }

  /**
    Runs the bytecode to completion. The `Done` sentinel ends evaluation; the
    result is whatever is on top of the stack, or `0` when nothing was
    pushed. Stack faults are evaluator errors, never fatal to the caller.
  */
  pub fn execute(&mut self, code: &[Code], resolver: &dyn SymbolResolver)
    -> Result<Word, PredicateError>
  {
    self.stack.clear();

    for op in code {
      match op {

        Code::PushImmediate(value) => {
          self.push(*value)?;
        }

        Code::PushSymbol(name) => {
          let value =
            resolver.resolve(name)
                    .ok_or_else(|| PredicateError::UnresolvedSymbol(name.to_string()))?;
          self.push(value)?;
        }

        Code::Equal => {
          let s1 = self.pop()?;
          let s2 = self.pop()?;
          self.push((s1 == s2) as Word)?;
        }

        Code::GreaterThan => {
          let top    = self.pop()?;
          let bottom = self.pop()?;
          self.push((bottom > top) as Word)?;
        }

        Code::Done => {
          break;
        }

      }
    }

    Ok(self.stack.last().copied().unwrap_or(0))
  }

  fn push(&mut self, value: Word) -> Result<(), PredicateError> {
    if self.stack.len() >= STACK_SIZE {
      return Err(PredicateError::StackOverflow);
    }
    self.stack.push(value);
    Ok(())
  }

  fn pop(&mut self) -> Result<Word, PredicateError> {
    self.stack.pop().ok_or(PredicateError::StackUnderflow)
  }
}


#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;
  use crate::predicate::compile_predicate;

  impl SymbolResolver for HashMap<&'static str, Word> {
    fn resolve(&self, symbol: &str) -> Option<Word> {
      self.get(symbol).copied()
    }
  }

  fn environment(pairs: &[(&'static str, Word)]) -> HashMap<&'static str, Word> {
    pairs.iter().cloned().collect()
  }

  #[test]
  fn greater_than_compares_bottom_to_top() {
    let code = compile_predicate("IP > 0").unwrap();
    let mut vm = PredicateVm::new();
    assert_eq!(vm.execute(&code, &environment(&[("IP", 5)])), Ok(1));
    assert_eq!(vm.execute(&code, &environment(&[("IP", 0)])), Ok(0));
  }

  #[test]
  fn equality() {
    let code = compile_predicate("R0 = 12").unwrap();
    let mut vm = PredicateVm::new();
    assert_eq!(vm.execute(&code, &environment(&[("R0", 12)])), Ok(1));
    assert_eq!(vm.execute(&code, &environment(&[("R0", 11)])), Ok(0));
  }

  #[test]
  fn unresolved_symbols_are_reported() {
    let code = compile_predicate("BOGUS = 1").unwrap();
    let mut vm = PredicateVm::new();
    assert_eq!(
      vm.execute(&code, &environment(&[])),
      Err(PredicateError::UnresolvedSymbol("BOGUS".to_string()))
    );
  }

  #[test]
  fn empty_program_evaluates_to_zero() {
    let mut vm = PredicateVm::new();
    assert_eq!(vm.execute(&[Code::Done], &environment(&[])), Ok(0));
    assert_eq!(vm.execute(&[], &environment(&[])), Ok(0));
  }

  #[test]
  fn underflow_is_an_evaluator_error() {
    let mut vm = PredicateVm::new();
    assert_eq!(
      vm.execute(&[Code::Equal], &environment(&[])),
      Err(PredicateError::StackUnderflow)
    );
  }

  #[test]
  fn overflow_is_an_evaluator_error() {
    // A pathological hand-built program; the compiler cannot produce one.
    let code = vec![Code::PushImmediate(1); STACK_SIZE + 1];
    let mut vm = PredicateVm::new();
    assert_eq!(
      vm.execute(&code, &environment(&[])),
      Err(PredicateError::StackOverflow)
    );
  }
}
