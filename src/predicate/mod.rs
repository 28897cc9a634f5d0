/*!

  The predicate subsystem: a second, much smaller virtual machine used by the
  debugger. A textual condition of the form

      SYMBOL OPERATOR IMMEDIATE        e.g.  IP > 0

  is tokenized, parsed into a three node expression tree, lowered to a tiny
  stack bytecode by post-order emission, and evaluated against a bounded
  stack. It shares the core machine's decode-dispatch-stack-effect structure
  but is entirely independent of it: the only connection is the
  `SymbolResolver` capability the caller supplies at evaluation time.

*/

mod compiler;
mod parser;
mod token;
mod vm;

pub use compiler::{compile, Code, CODE_SIZE};
pub use parser::{parse, Node};
pub use token::{OperatorKind, Token, Tokenizer, OPERATOR_TABLE};
pub use vm::{PredicateVm, SymbolResolver, STACK_SIZE};

use crate::error::PredicateError;

/// Compiles a textual predicate straight to bytecode.
pub fn compile_predicate(text: &str) -> Result<Vec<Code>, PredicateError> {
  compile(&parse(text)?)
}
