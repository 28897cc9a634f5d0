/*!
  The human readable textual form of instructions is called assembly. This
  module leverages the `strum` derives of `Operation` to serialize and
  deserialize instructions to assembly.

  One instruction per line, written `Mnemonic(arg, arg, ...)`, or a bare
  `Mnemonic` for nullary operations. A `#` starts a comment that runs to the
  end of the line. Arguments are register indices except for `Orthography`,
  whose second argument is the 25 bit immediate; `0x` prefixes a hexadecimal
  argument.
*/

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nom::{
  branch::alt,
  bytes::complete::tag,
  character::complete::{
    alpha1,
    char as one_char,
    digit1,
    hex_digit1,
    space0
  },
  combinator::{all_consuming, map, map_res, opt},
  multi::separated_list,
  sequence::{delimited, pair, preceded},
  IResult
};

use crate::bytecode::{encode_instruction, Instruction, Operation, Register, Word};
use crate::bytecode::binary::IMMEDIATE_MASK;
use crate::machine::REGISTER_COUNT;

pub enum ParsedAssemblySyntax {
  Instruction(Instruction),
  NotAnOperation {
    line: u32,
    name: String
  },
  WrongArity {
    line: u32,
    operation: Operation,
    args: Vec<Word>
  },
  OperandOutOfRange {
    line: u32,
    operation: Operation,
    value: Word
  },
  Malformed {
    line: u32,
    text: String
  }
}
// Abbreviated name internally
use ParsedAssemblySyntax as Syntax;

impl Display for ParsedAssemblySyntax {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Syntax::Instruction(i) => {
        write!(f, "{}", i)
      }
      Syntax::NotAnOperation { line, name } => {
        write!(f, "Error on line {}: {} is not an operation.", line, name)
      }
      Syntax::WrongArity { line, operation, args } => {
        write!(f,
          "Error on line {}: {} requires {} arguments but was given {}: ({})",
          line, operation, operation.arity(), args.len(),
          args.iter()
              .map(Word::to_string)
              .collect::<Vec<String>>()
              .join(", ")
        )
      }
      Syntax::OperandOutOfRange { line, operation, value } => {
        write!(f,
          "Error on line {}: {} does not fit in an operand field of {}.",
          line, value, operation
        )
      }
      Syntax::Malformed { line, text } => {
        write!(f, "Error on line {}: could not parse `{}`.", line, text)
      }
    }
  }
}

fn argument(input: &str) -> IResult<&str, Word> {
  alt((
    map_res(
      preceded(tag("0x"), hex_digit1),
      |out: &str| Word::from_str_radix(out, 16)
    ),
    map_res(digit1, |out: &str| out.parse::<Word>())
  ))(input)
}

fn argument_list(input: &str) -> IResult<&str, Vec<Word>> {
  delimited(
    delimited(space0, one_char('('), space0),
    separated_list(delimited(space0, one_char(','), space0), argument),
    preceded(space0, one_char(')'))
  )(input)
}

fn instruction_line(input: &str) -> IResult<&str, (&str, Vec<Word>)> {
  all_consuming(
    delimited(
      space0,
      pair(
        alpha1,
        map(opt(argument_list), |args| args.unwrap_or_default())
      ),
      space0
    )
  )(input)
}

/// Places the parsed arguments into the operand fields the operation reads.
fn build_syntax(operation: Operation, args: Vec<Word>, line: u32) -> Syntax {
  if args.len() != operation.arity() {
    return Syntax::WrongArity { line, operation, args };
  }

  // All arguments except Orthography's immediate are register indices.
  let register_args =
    match operation {
      Operation::Orthography => &args[..1],
      _ => &args[..]
    };
  for value in register_args {
    if *value >= REGISTER_COUNT as Word {
      return Syntax::OperandOutOfRange { line, operation, value: *value };
    }
  }

  let instruction =
    match operation {

      Operation::Orthography => {
        if args[1] > IMMEDIATE_MASK {
          return Syntax::OperandOutOfRange { line, operation, value: args[1] };
        }
        Instruction::Immediate { a: args[0] as Register, value: args[1] }
      }

      Operation::Halt => {
        Instruction::Standard { opcode: operation, a: 0, b: 0, c: 0 }
      }

      | Operation::Abandonment
      | Operation::Output
      | Operation::Input => {
        Instruction::Standard { opcode: operation, a: 0, b: 0, c: args[0] as Register }
      }

      Operation::Allocation => {
        Instruction::Standard {
          opcode: operation, a: args[0] as Register, b: 0, c: args[1] as Register
        }
      }

      Operation::LoadProgram => {
        Instruction::Standard {
          opcode: operation, a: 0, b: args[0] as Register, c: args[1] as Register
        }
      }

      _ => {
        Instruction::Standard {
          opcode: operation,
          a: args[0] as Register,
          b: args[1] as Register,
          c: args[2] as Register
        }
      }

    };

  Syntax::Instruction(instruction)
}

pub fn parse_assembly(text: &str) -> Vec<Syntax> {
  let mut parsed = Vec::new();

  for (index, raw_line) in text.lines().enumerate() {
    let line = (index + 1) as u32;
    // Strip comments before parsing.
    let code =
      match raw_line.find('#') {
        Some(position) => &raw_line[..position],
        None => raw_line
      };
    if code.trim().is_empty() {
      continue;
    }

    match instruction_line(code) {

      Ok((_rest, (name, args))) => {
        match Operation::from_str(name) {
          Ok(operation) => {
            parsed.push(build_syntax(operation, args, line));
          }
          Err(_) => {
            parsed.push(Syntax::NotAnOperation { line, name: name.to_string() });
          }
        }
      }

      Err(_e) => {
        parsed.push(Syntax::Malformed { line, text: code.trim().to_string() });
      }

    }
  }

  parsed
}

/**
  Assembles source text into platters, failing with the first diagnostic
  rendered as a string. Used to build codices by hand, chiefly in tests.
*/
pub fn assemble(text: &str) -> Result<Vec<Word>, String> {
  let mut words = Vec::new();
  for syntax in parse_assembly(text) {
    match syntax {
      Syntax::Instruction(instruction) => {
        words.push(encode_instruction(instruction));
      }
      diagnostic => {
        return Err(diagnostic.to_string());
      }
    }
  }
  Ok(words)
}
