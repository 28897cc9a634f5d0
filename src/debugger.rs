/*!
  An interactive debugger console for a machine. The console owns all of its
  text I/O; the machine is driven exclusively through its single-step API,
  and predicates see it only through the `SymbolResolver` capability.

  Commands:

      h                       help
      where                   print the current instruction pointer
      n, next                 execute one instruction
      registers               dump the register file
      run-until <predicate>   step while the predicate evaluates to 0
      q                       quit
*/

use std::io::{self, BufRead, Write};

use crate::bytecode::Word;
use crate::error::PredicateError;
use crate::machine::{Machine, MachineStatus, REGISTER_COUNT};
use crate::predicate::{compile_predicate, Code, PredicateVm, SymbolResolver};

/// Resolves predicate symbols against the live machine: `IP` is the
/// instruction pointer, `R0` through `R7` are the registers.
pub struct MachineSymbols<'a>(pub &'a Machine);

impl<'a> SymbolResolver for MachineSymbols<'a> {
  fn resolve(&self, symbol: &str) -> Option<Word> {
    if symbol == "IP" {
      return Some(self.0.current_ip());
    }
    if let Some(digits) = symbol.strip_prefix('R') {
      return digits.parse::<usize>()
                   .ok()
                   .filter(|index| *index < REGISTER_COUNT)
                   .map(|index| self.0.register(index));
    }
    None
  }
}

pub struct Debugger {
  machine: Machine
}

impl Debugger {

  pub fn new(machine: Machine) -> Debugger {
    Debugger { machine }
  }

  /// The read-line loop. Returns when the user quits or input is exhausted.
  pub fn console(&mut self) -> io::Result<()> {
    println!("Debugger console (h for help)");
    let stdin = io::stdin();

    loop {
      print!("> ");
      io::stdout().flush()?;

      let mut line = String::new();
      if stdin.lock().read_line(&mut line)? == 0 {
        return Ok(());
      }
      let command = line.trim();

      match command {

        "" => {}

        "q" => {
          return Ok(());
        }

        "h" => {
          println!("where: print the current IP location");
          println!("n, next: execute the next instruction");
          println!("registers: dump the current state of the registers");
          println!("run-until <symbol> <=|>> <value>: run the program until the predicate");
          println!("\tevaluates to true, e.g. `run-until IP > 8` or `run-until R0 = 12`");
          println!("q: quit");
        }

        "where" => {
          println!("IP = {:#010X}", self.machine.current_ip());
        }

        "n" | "next" => {
          self.step_once();
        }

        "registers" => {
          println!("{}", self.machine);
        }

        _ if command.starts_with("run-until") => {
          self.run_until(command["run-until".len()..].trim());
        }

        _ => {
          println!("'{}' is an unknown command (type 'h' for help)", command);
        }

      }
    }
  }

  fn step_once(&mut self) {
    match self.machine.step() {
      Ok(MachineStatus::Halted) => println!("Processor halted"),
      Ok(_status)               => println!("IP = {:#010X}", self.machine.current_ip()),
      Err(error)                => println!("fail: {}", error)
    }
  }

  /// Compiles the predicate once, then steps the machine until it evaluates
  /// to a nonzero value or the machine reaches a terminal state. A bad
  /// predicate is reported and the machine is left untouched.
  fn run_until(&mut self, predicate: &str) {
    let code =
      match compile_predicate(predicate) {
        Ok(code) => code,
        Err(error) => {
          println!("{}", error);
          return;
        }
      };

    let mut vm = PredicateVm::new();
    loop {
      match self.evaluate(&mut vm, &code) {
        Ok(0) => {}
        Ok(_nonzero) => {
          println!("stopped: IP = {:#010X}", self.machine.current_ip());
          return;
        }
        Err(error) => {
          println!("{}", error);
          return;
        }
      }

      match self.machine.step() {
        Ok(MachineStatus::Halted) => {
          println!("Processor halted");
          return;
        }
        Ok(_status) => {}
        Err(error) => {
          println!("fail: {}", error);
          return;
        }
      }
    }
  }

  fn evaluate(&self, vm: &mut PredicateVm, code: &[Code]) -> Result<Word, PredicateError> {
    vm.execute(code, &MachineSymbols(&self.machine))
  }
}
