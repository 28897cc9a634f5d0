
use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::bytecode::{Register, Word};

/**
  Opcodes of the virtual machine.

  Rust stores enum variants as bytes. As in C, enum values are represented by
  consecutive natural numbers and can be treated as numeric types, so the
  variants below are listed in opcode order: the discriminant *is* the 4 bit
  opcode field of the platter. Opcodes 0 through 12 use the standard operand
  layout; `Orthography` alone uses the immediate-load layout. Values 14 and 15
  are unassigned and fail conversion.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,            Hash
)]
#[repr(u8)]
pub enum Operation {
  // Standard layout //
  ConditionalMove,   // conditional_move( a, b, c )
  ArrayIndex,        // array_index( a, b, c )
  ArrayAmend,        // array_amend( a, b, c )
  Addition,          // addition( a, b, c )
  Multiplication,    // multiplication( a, b, c )
  Division,          // division( a, b, c )
  NotAnd,            // not_and( a, b, c )
  // Opcode 7
  Halt,              // halt
  Allocation,        // allocation( a, c )
  Abandonment,       // abandonment( c )
  Output,            // output( c )
  Input,             // input( c )
  LoadProgram,       // load_program( b, c )
  // Opcode 13, immediate layout //
  Orthography,       // orthography( a, immediate )
}

pub const MAX_OPCODE: u8 = 13u8;

/// Holds the unencoded components of an instruction, one variant per operand
/// layout.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// [OpCode:4][Unused:19][A:3][B:3][C:3]
  Standard {
    opcode :  Operation,
    a      :  Register,
    b      :  Register,
    c      :  Register
  },
  /// [OpCode:4][A:3][Value:25]
  Immediate {
    a      :  Register,
    value  :  Word
  },
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Instruction::Standard { opcode, a, b, c } => {
        match opcode.arity() {
          0 => write!(f, "{}", opcode),
          1 => write!(f, "{}({})", opcode, c),
          2 if *opcode == Operation::Allocation => write!(f, "{}({}, {})", opcode, a, c),
          2 => write!(f, "{}({}, {})", opcode, b, c),
          _ => write!(f, "{}({}, {}, {})", opcode, a, b, c)
        }
      }

      Instruction::Immediate { a, value } => {
        write!(f, "{}({}, {})", Operation::Orthography, a, value)
      }

    }
  }
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Returns the number of arguments the operation takes in its textual
  /// assembly form. The encoded word always carries all three register
  /// fields; unused fields are zero.
  pub fn arity(&self) -> usize {
    match self {
      | Operation::ConditionalMove
      | Operation::ArrayIndex
      | Operation::ArrayAmend
      | Operation::Addition
      | Operation::Multiplication
      | Operation::Division
      | Operation::NotAnd        => 3,

      Operation::Halt            => 0,

      | Operation::Abandonment
      | Operation::Output
      | Operation::Input         => 1,

      | Operation::Allocation    // allocation( a, c )
      | Operation::LoadProgram   // load_program( b, c )
      | Operation::Orthography   => 2
    }
  }
}
