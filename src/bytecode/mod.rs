/*!

  The machine uses a 32 bit word ("platter") for both data and instructions.
  Platters are stored big-endian in the codex file and host-endian in memory.
  Every instruction is exactly one platter with the opcode in the top four
  bits. The operand fields depend on the opcode:

    Standard (opcodes 0-12):   [OpCode:4][Unused:19][A:3][B:3][C:3]
    Immediate (opcode 13):     [OpCode:4][A:3][Value:25]

  Register fields are 3 bits, so register indices run 0 through 7. The
  immediate value is an unsigned 25 bit quantity.

  An instruction is only used in decoded form (`Instruction`) inside the
  machine; the encoded form exists in the program cell and in codex files.
  The textual form of instructions is called assembly and lives in the
  `assembly` submodule.

*/

mod assembly;
mod binary;
mod instruction;

pub use assembly::{assemble, parse_assembly, ParsedAssemblySyntax};
pub use binary::{encode_instruction, try_decode_instruction, words_from_codex, words_to_codex};
pub use instruction::{Instruction, Operation, MAX_OPCODE};

// If you change these you must also change `encode_instruction` and
// `try_decode_instruction`.
pub type Word = u32;
/// A register index, always below `machine::REGISTER_COUNT`.
pub type Register = u8;
