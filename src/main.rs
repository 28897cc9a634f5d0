/*!
  A 32-bit "Universal Machine": loads a binary codex of big-endian
  instruction words into the program cell and spins the fetch-decode-dispatch
  loop until the program halts or fails. With `--debug`, drops into the
  interactive debugger console instead of running freely.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;
extern crate strum;
#[macro_use] extern crate strum_macros;

mod bytecode;
mod chariter;
mod debugger;
mod error;
mod heap;
mod machine;
mod predicate;

use std::fs;
use std::process;

use crate::debugger::Debugger;
use crate::machine::{Machine, MachineStatus};

fn main() {
  let mut debug = false;
  let mut path: Option<String> = None;

  for argument in std::env::args().skip(1) {
    match argument.as_str() {
      "--debug" => {
        debug = true;
      }
      _ => {
        path = Some(argument);
      }
    }
  }

  let path =
    match path {
      Some(path) => path,
      None => {
        eprintln!("usage: um [--debug] <codex>");
        process::exit(2);
      }
    };

  let bytes =
    match fs::read(&path) {
      Ok(bytes) => bytes,
      Err(error) => {
        eprintln!("cannot read {}: {}", path, error);
        process::exit(1);
      }
    };

  let machine =
    match Machine::from_codex(&bytes) {
      Ok(machine) => machine,
      Err(error) => {
        eprintln!("cannot load {}: {}", path, error);
        process::exit(1);
      }
    };

  if debug {
    let mut debugger = Debugger::new(machine);
    if let Err(error) = debugger.console() {
      eprintln!("console failure: {}", error);
      process::exit(1);
    }
    return;
  }

  let mut machine = machine;
  match machine.run() {
    MachineStatus::Halted => {}
    MachineStatus::Failed(error) => {
      eprintln!("fail: {}", error);
      process::exit(1);
    }
    _status => unreachable!("run() only returns terminal states.")
  }
}
