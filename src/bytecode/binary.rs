/*!
  This module is responsible for the encoding and decoding of binary
  instructions, and for assembling a raw codex image into words.

*/
use std::convert::TryFrom;

use super::{Operation, Instruction};
use crate::bytecode::{Register, Word};
use crate::error::MachineError;

pub const OPCODE_SHIFT    : u32  = 28;
pub const REGISTER_MASK   : Word = 0x7;
pub const IMMEDIATE_MASK  : Word = 0x1FF_FFFF;
pub const IMMEDIATE_SHIFT : u32  = 25;

/// Splits a platter into opcode and operand fields according to its layout.
/// Opcode field values 14 and 15 are unassigned and fail with `InvalidOpcode`.
pub fn try_decode_instruction(word: Word) -> Result<Instruction, MachineError> {
  let opcode_field = (word >> OPCODE_SHIFT) as u8;
  let opcode = Operation::try_from(opcode_field)
               .map_err(|_| MachineError::InvalidOpcode(opcode_field))?;

  let instruction =
    match opcode {

      Operation::Orthography => {
        // [OpCode:4][A:3][Value:25]
        Instruction::Immediate {
          a: ((word >> IMMEDIATE_SHIFT) & REGISTER_MASK) as Register,
          value: word & IMMEDIATE_MASK
        }
      }

      _ => {
        // [OpCode:4][Unused:19][A:3][B:3][C:3]
        Instruction::Standard {
          opcode,
          a: ((word >> 6) & REGISTER_MASK) as Register,
          b: ((word >> 3) & REGISTER_MASK) as Register,
          c: ( word       & REGISTER_MASK) as Register
        }
      }

    };

  Ok(instruction)
}

/**
  Encodes the instruction into a platter. It is the caller's responsibility to
  keep register fields below 8 and the immediate below 2^25; out-of-range bits
  are masked off.
*/
pub fn encode_instruction(instruction: Instruction) -> Word {
  match instruction {

    Instruction::Standard { opcode, a, b, c } => {
      // [OpCode:4][Unused:19][A:3][B:3][C:3]
      ((opcode.code() as Word) << OPCODE_SHIFT)
        + (((a as Word) & REGISTER_MASK) << 6)
        + (((b as Word) & REGISTER_MASK) << 3)
        +  ((c as Word) & REGISTER_MASK)
    }

    Instruction::Immediate { a, value } => {
      // [OpCode:4][A:3][Value:25]
      ((Operation::Orthography.code() as Word) << OPCODE_SHIFT)
        + (((a as Word) & REGISTER_MASK) << IMMEDIATE_SHIFT)
        +  (value & IMMEDIATE_MASK)
    }

  }
}

/**
  Assembles a codex image into platters. Platters are transmitted big-endian;
  in memory they are held host-endian. The image must be a whole number of
  platters or loading fails with `MalformedCodex`.
*/
pub fn words_from_codex(bytes: &[u8]) -> Result<Vec<Word>, MachineError> {
  if bytes.len() % 4 != 0 {
    return Err(MachineError::MalformedCodex(bytes.len()));
  }

  let words =
    bytes.chunks_exact(4)
         .map(|chunk| Word::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
         .collect();
  Ok(words)
}

/// The inverse of `words_from_codex`, used to write codex images.
pub fn words_to_codex(words: &[Word]) -> Vec<u8> {
  let mut bytes = Vec::with_capacity(words.len() * 4);
  for word in words {
    bytes.extend_from_slice(&word.to_be_bytes());
  }
  bytes
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn standard_layout_register_fields() {
    // Every valid standard-form word decodes its register fields from the low
    // nine bits.
    for word in &[0x0000_01F3u32, 0x3000_0000, 0x6000_01FF, 0xC555_5539] {
      match try_decode_instruction(*word).unwrap() {
        Instruction::Standard { a, b, c, .. } => {
          assert_eq!(a as Word, (word >> 6) & 7);
          assert_eq!(b as Word, (word >> 3) & 7);
          assert_eq!(c as Word,  word       & 7);
        }
        _ => panic!("expected the standard layout")
      }
    }
  }

  #[test]
  fn immediate_layout_fields() {
    let word = 0xD000_0000u32 | (3 << 25) | 0x001F_4241;
    match try_decode_instruction(word).unwrap() {
      Instruction::Immediate { a, value } => {
        assert_eq!(a as Word, (word >> 25) & 7);
        assert_eq!(value, word & 0x1FF_FFFF);
      }
      _ => panic!("expected the immediate layout")
    }
  }

  #[test]
  fn unassigned_opcodes_are_invalid() {
    assert_eq!(
      try_decode_instruction(0xE000_0000),
      Err(MachineError::InvalidOpcode(14))
    );
    assert_eq!(
      try_decode_instruction(0xF000_0000),
      Err(MachineError::InvalidOpcode(15))
    );
  }

  #[test]
  fn encode_decode_round_trip() {
    let instruction = Instruction::Standard {
      opcode: Operation::Addition, a: 1, b: 2, c: 3
    };
    let decoded = try_decode_instruction(encode_instruction(instruction.clone())).unwrap();
    assert_eq!(decoded, instruction);

    let instruction = Instruction::Immediate { a: 7, value: 0x155_5555 };
    let decoded = try_decode_instruction(encode_instruction(instruction.clone())).unwrap();
    assert_eq!(decoded, instruction);
  }

  #[test]
  fn codex_is_big_endian() {
    let words = words_from_codex(&[0xD0, 0x00, 0x00, 0x41]).unwrap();
    assert_eq!(words, vec![0xD000_0041]);
    assert_eq!(words_to_codex(&words), vec![0xD0, 0x00, 0x00, 0x41]);
  }

  #[test]
  fn ragged_codex_is_malformed() {
    assert_eq!(
      words_from_codex(&[0xD0, 0x00, 0x00]),
      Err(MachineError::MalformedCodex(3))
    );
  }
}
