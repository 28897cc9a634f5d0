/*!
  Structures and functions for the Universal Machine itself: the register
  file, the instruction pointer, and the fetch-decode-dispatch cycle over the
  heap's program cell.

  The machine is an explicitly constructed value, not a process-wide
  singleton, and every fatal condition is a value too: `step` reports it and
  the machine transitions to the terminal `Failed` state. Halting is likewise
  a status, not control flow.
*/

use std::fmt::{Display, Formatter};
use std::io::{Read, Write as IoWrite};

use prettytable::{format as TableFormat, Table};

use crate::bytecode::*;
use crate::error::MachineError;
use crate::heap::{CellId, Heap, PROGRAM_CELL_ID};

pub const REGISTER_COUNT: usize = 8;

/// Loaded into `R[C]` by the Input operation when the source is exhausted.
const END_OF_INPUT: Word = 0xFFFF_FFFF;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MachineStatus {
  /// Constructed but not yet stepped.
  Created,
  Running,
  /// Terminal: the Halt operation was executed.
  Halted,
  /// Terminal: a fatal condition stopped the run.
  Failed(MachineError)
}

impl MachineStatus {
  pub fn is_terminal(&self) -> bool {
    match self {
      MachineStatus::Created | MachineStatus::Running => false,
      _ => true
    }
  }
}

pub struct Machine {

  // Machine state //
  registers :  [Word; REGISTER_COUNT],
  ip        :  Word,   // A word index into the program cell, not a byte offset
  heap      :  Heap,
  status    :  MachineStatus,

  // The outside world, as seen by the Input and Output operations //
  input     :  Box<dyn Read>,
  output    :  Box<dyn IoWrite>

}

impl Machine {

  // region Construction

  /// Creates a machine with the codex image loaded into the program cell.
  /// Fails with `MalformedCodex` if the image is not a whole number of
  /// platters.
  pub fn from_codex(bytes: &[u8]) -> Result<Machine, MachineError> {
    Ok(Machine::from_words(words_from_codex(bytes)?))
  }

  pub fn from_words(words: Vec<Word>) -> Machine {
    Machine {
      registers :  [0; REGISTER_COUNT],
      ip        :  0,
      heap      :  Heap::with_program(words),
      status    :  MachineStatus::Created,
      input     :  Box::new(std::io::stdin()),
      output    :  Box::new(std::io::stdout())
    }
  }

  /// Replaces the byte source and sink used by the Input and Output
  /// operations. The defaults are stdin and stdout.
  pub fn with_io(mut self, input: Box<dyn Read>, output: Box<dyn IoWrite>) -> Machine {
    self.input = input;
    self.output = output;
    self
  }

  // endregion

  // region Accessors consumed by the debugger

  pub fn current_ip(&self) -> Word {
    self.ip
  }

  pub fn register(&self, index: usize) -> Word {
    self.registers[index]
  }

  pub fn status(&self) -> &MachineStatus {
    &self.status
  }

  pub fn heap(&self) -> &Heap {
    &self.heap
  }

  // endregion

  // region The fetch-decode-dispatch cycle

  /**
    Executes one fetch-decode-dispatch cycle and reports the resulting
    status. A fatal condition is returned as the error and recorded: the
    machine is then in the `Failed` state and stays there.

    Stepping a machine in a terminal state fetches nothing: a halted machine
    reports `Halted`, a failed machine reports its failure again.
  */
  pub fn step(&mut self) -> Result<MachineStatus, MachineError> {
    match &self.status {
      MachineStatus::Halted => {
        return Ok(MachineStatus::Halted);
      }
      MachineStatus::Failed(error) => {
        return Err(error.clone());
      }
      _ => {
        self.status = MachineStatus::Running;
      }
    }

    match self.execute_cycle() {
      Ok(status) => {
        self.status = status.clone();
        Ok(status)
      }
      Err(error) => {
        self.status = MachineStatus::Failed(error.clone());
        Err(error)
      }
    }
  }

  /// Steps until the machine reaches a terminal state.
  pub fn run(&mut self) -> MachineStatus {
    while !self.status.is_terminal() {
      if let Err(error) = self.step() {
        return MachineStatus::Failed(error);
      }
    }
    self.status.clone()
  }

  fn execute_cycle(&mut self) -> Result<MachineStatus, MachineError> {
    let word = self.heap.read(PROGRAM_CELL_ID, self.ip)?;
    self.ip += 1;
    let instruction = try_decode_instruction(word)?;

    #[cfg(feature = "trace_execution")]
    println!("[{:>10}]  {}", self.ip - 1, instruction);

    self.dispatch(instruction)
  }

  fn dispatch(&mut self, instruction: Instruction) -> Result<MachineStatus, MachineError> {
    match instruction {

      Instruction::Immediate { a, value } => {
        self.validate_register(a)?;
        self.registers[a as usize] = value;
      }

      Instruction::Standard { opcode, a, b, c } => {
        // The 3 bit fields guarantee these hold at this word size, but the
        // check must survive any change to the operand widths.
        self.validate_register(a)?;
        self.validate_register(b)?;
        self.validate_register(c)?;

        match opcode {

          Operation::ConditionalMove => {
            if self.reg(c) != 0 {
              self.registers[a as usize] = self.reg(b);
            }
          }

          Operation::ArrayIndex => {
            self.registers[a as usize] = self.heap.read(self.reg(b), self.reg(c))?;
          }

          Operation::ArrayAmend => {
            self.heap.write(self.reg(a), self.reg(b), self.reg(c))?;
          }

          Operation::Addition => {
            self.registers[a as usize] = self.reg(b).wrapping_add(self.reg(c));
          }

          Operation::Multiplication => {
            self.registers[a as usize] = self.reg(b).wrapping_mul(self.reg(c));
          }

          Operation::Division => {
            if self.reg(c) == 0 {
              return Err(MachineError::DivisionByZero);
            }
            self.registers[a as usize] = self.reg(b) / self.reg(c);
          }

          Operation::NotAnd => {
            self.registers[a as usize] = !(self.reg(b) & self.reg(c));
          }

          Operation::Halt => {
            return Ok(MachineStatus::Halted);
          }

          Operation::Allocation => {
            let id: CellId = self.heap.allocate(self.reg(c));
            self.registers[a as usize] = id;
          }

          Operation::Abandonment => {
            self.heap.free(self.reg(c))?;
          }

          Operation::Output => {
            let value = self.reg(c);
            if value > 255 {
              return Err(MachineError::OutputOutOfRange(value));
            }
            self.output
                .write_all(&[value as u8])
                .and_then(|_| self.output.flush())
                .map_err(|e| MachineError::Io(e.to_string()))?;
          }

          Operation::Input => {
            let mut buffer = [0u8; 1];
            self.registers[c as usize] =
              match self.input.read(&mut buffer) {
                Ok(0) => END_OF_INPUT,
                Ok(_) => buffer[0] as Word,
                Err(e) => return Err(MachineError::Io(e.to_string()))
              };
          }

          Operation::LoadProgram => {
            self.heap.replace_program(self.reg(b))?;
            self.ip = self.reg(c);
          }

          Operation::Orthography => {
            unreachable!("Orthography decodes to the immediate layout.");
          }

        } // end match on opcode
      }

    } // end match on instruction layout

    Ok(MachineStatus::Running)
  }

  fn reg(&self, r: Register) -> Word {
    self.registers[r as usize]
  }

  fn validate_register(&self, r: Register) -> Result<(), MachineError> {
    match (r as usize) < REGISTER_COUNT {
      true  => Ok(()),
      false => Err(MachineError::InvalidRegisterIndex(r))
    }
  }

  // endregion

}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);

    table.add_row(row![r->"IP =", format!("{:#010X}", self.ip)]);
    for (i, value) in self.registers.iter().enumerate() {
      table.add_row(row![r->format!("R[{}] =", i), format!("{:#010X}", value)]);
    }

    write!(f, "{}", table)
  }
}


#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::io::Cursor;
  use std::rc::Rc;

  use super::*;
  use crate::bytecode::assemble;

  /// A byte sink the test can still read after the machine takes ownership
  /// of its `Box<dyn Write>` half.
  #[derive(Clone, Default)]
  struct SharedSink(Rc<RefCell<Vec<u8>>>);

  impl IoWrite for SharedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
      self.0.borrow_mut().extend_from_slice(buf);
      Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
      Ok(())
    }
  }

  fn machine_for(text: &str) -> Machine {
    Machine::from_words(assemble(text).unwrap())
  }

  #[test]
  fn orthography_output_halt_end_to_end() {
    let sink = SharedSink::default();
    let mut machine = machine_for("
      Orthography(0, 65)
      Output(0)
      Halt
    ").with_io(Box::new(Cursor::new(vec![])), Box::new(sink.clone()));

    assert_eq!(machine.run(), MachineStatus::Halted);
    assert_eq!(&*sink.0.borrow(), b"A");
  }

  #[test]
  fn arithmetic_wraps_modulo_two_to_the_32() {
    let mut machine = machine_for("
      Orthography(1, 0x1FFFFFF)
      Orthography(2, 0x1FFFFFF)
      Addition(0, 1, 2)
      Multiplication(3, 1, 2)
      Halt
    ");
    assert_eq!(machine.run(), MachineStatus::Halted);
    assert_eq!(machine.register(0), 0x1FF_FFFFu32.wrapping_add(0x1FF_FFFF));
    assert_eq!(machine.register(3), 0x1FF_FFFFu32.wrapping_mul(0x1FF_FFFF));
  }

  #[test]
  fn not_and_is_bitwise_nand() {
    let mut machine = machine_for("
      Orthography(1, 0xFF)
      Orthography(2, 0x0F)
      NotAnd(0, 1, 2)
      Halt
    ");
    machine.run();
    assert_eq!(machine.register(0), !(0xFFu32 & 0x0F));
  }

  #[test]
  fn conditional_move_ignores_zero_condition() {
    let mut machine = machine_for("
      Orthography(1, 7)
      ConditionalMove(0, 1, 2)   # R2 is zero, no move
      Orthography(3, 1)
      ConditionalMove(4, 1, 3)   # R3 is nonzero, moves
      Halt
    ");
    machine.run();
    assert_eq!(machine.register(0), 0);
    assert_eq!(machine.register(4), 7);
  }

  #[test]
  fn division_by_zero_leaves_registers_untouched() {
    let mut machine = machine_for("
      Orthography(0, 99)
      Orthography(1, 12)
      Division(0, 1, 2)
    ");
    let status = machine.run();
    assert_eq!(status, MachineStatus::Failed(MachineError::DivisionByZero));
    assert_eq!(machine.status(), &status);
    // The destination register kept its prior value.
    assert_eq!(machine.register(0), 99);
  }

  #[test]
  fn unsigned_division() {
    let mut machine = machine_for("
      Orthography(1, 12)
      Orthography(2, 5)
      Division(0, 1, 2)
      Halt
    ");
    machine.run();
    assert_eq!(machine.register(0), 2);
  }

  #[test]
  fn output_rejects_values_above_one_byte() {
    let mut machine = machine_for("
      Orthography(0, 256)
      Output(0)
    ");
    assert_eq!(
      machine.run(),
      MachineStatus::Failed(MachineError::OutputOutOfRange(256))
    );

    let sink = SharedSink::default();
    let mut machine = machine_for("
      Orthography(0, 255)
      Output(0)
      Halt
    ").with_io(Box::new(Cursor::new(vec![])), Box::new(sink.clone()));
    assert_eq!(machine.run(), MachineStatus::Halted);
    assert_eq!(&*sink.0.borrow(), &[0xFFu8]);
  }

  #[test]
  fn input_reads_bytes_then_end_of_input() {
    let mut machine = machine_for("
      Input(0)
      Input(1)
      Halt
    ").with_io(Box::new(Cursor::new(b"Z".to_vec())), Box::new(SharedSink::default()));

    assert_eq!(machine.run(), MachineStatus::Halted);
    assert_eq!(machine.register(0), 'Z' as Word);
    assert_eq!(machine.register(1), 0xFFFF_FFFF);
  }

  #[test]
  fn allocation_amend_index_round_trip() {
    let mut machine = machine_for("
      Orthography(1, 3)       # size
      Allocation(2, 1)        # R2 := new id
      Orthography(3, 41)      # value
      Orthography(4, 1)       # offset
      ArrayAmend(2, 4, 3)
      ArrayIndex(5, 2, 4)
      Halt
    ");
    machine.run();
    assert_eq!(machine.register(2), 1);
    assert_eq!(machine.register(5), 41);
  }

  #[test]
  fn abandonment_of_program_cell_is_fatal() {
    let mut machine = machine_for("
      Abandonment(0)          # R0 is zero: the program cell
    ");
    assert_eq!(
      machine.run(),
      MachineStatus::Failed(MachineError::AbandonedProgram)
    );
  }

  #[test]
  fn abandoned_arrays_stay_unusable() {
    let mut machine = machine_for("
      Orthography(1, 2)
      Allocation(2, 1)
      Abandonment(2)
      ArrayIndex(3, 2, 0)     # the freed id is gone
    ");
    match machine.run() {
      MachineStatus::Failed(MachineError::UnknownArray(id)) => assert_eq!(id, 1),
      other => panic!("unexpected status {:?}", other)
    }
  }

  #[test]
  fn load_program_replaces_the_codex_and_jumps() {
    // Builds a one-platter program consisting of Halt (0x70000000) in a fresh
    // array, then loads it. The 25 bit immediate cannot hold the platter, so
    // it is assembled as 7 * 2^24 * 16.
    let mut machine = machine_for("
      Orthography(1, 1)
      Allocation(2, 1)
      Orthography(3, 7)
      Orthography(4, 0x1000000)
      Orthography(5, 16)
      Multiplication(3, 3, 4)
      Multiplication(3, 3, 5)
      Orthography(6, 0)
      ArrayAmend(2, 6, 3)
      LoadProgram(2, 6)
    ");
    assert_eq!(machine.run(), MachineStatus::Halted);
    assert_eq!(machine.current_ip(), 1);
    assert_eq!(machine.heap().lookup(0).unwrap().words(), &[0x7000_0000]);
  }

  #[test]
  fn instruction_pointer_past_the_program_is_fatal() {
    let mut machine = Machine::from_words(vec![]);
    match machine.run() {
      MachineStatus::Failed(MachineError::OutOfBounds { id, offset, .. }) => {
        assert_eq!(id, 0);
        assert_eq!(offset, 0);
      }
      other => panic!("unexpected status {:?}", other)
    }
  }

  #[test]
  fn unassigned_opcodes_fail_the_machine() {
    let mut machine = Machine::from_words(vec![0xF000_0000]);
    assert_eq!(
      machine.run(),
      MachineStatus::Failed(MachineError::InvalidOpcode(15))
    );
  }

  #[test]
  fn stepping_a_terminal_machine_is_a_no_op() {
    let mut machine = machine_for("Halt");
    assert_eq!(machine.step(), Ok(MachineStatus::Halted));
    let ip = machine.current_ip();
    assert_eq!(machine.step(), Ok(MachineStatus::Halted));
    assert_eq!(machine.current_ip(), ip);

    let mut machine = Machine::from_words(vec![0xF000_0000]);
    assert_eq!(machine.step(), Err(MachineError::InvalidOpcode(15)));
    assert_eq!(machine.step(), Err(MachineError::InvalidOpcode(15)));
  }

  #[test]
  fn malformed_codex_is_rejected_at_construction() {
    assert_eq!(
      Machine::from_codex(&[0x70, 0x00, 0x00]).err(),
      Some(MachineError::MalformedCodex(3))
    );
  }
}
