/*!
  The human readable textual form of bytecode is called assembly. This module leverages the
  `strum` derives of `Operation` to read mnemonics, and `nom` to split lines into tokens.

  One instruction per line:
  ```text
  <designator> <operand>   ; optional comment
  ```
  The designator is either a mnemonic (`LOAD_CONST`, `LOAD`, `min_op`, ...; case doesn't matter)
  or the opcode as a decimal number. The operand is an unsigned decimal integer. Lines that are
  empty once the comment is removed are skipped.
*/

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nom::{
  IResult,
  branch::alt,
  bytes::complete::{take_till1, take_while, take_while1},
  character::complete::digit1,
  combinator::{all_consuming, map, map_res},
  multi::separated_list,
  sequence::delimited,
};

use crate::bytecode::{Instruction, Operation};
use crate::error::{Malformed, UvmError, UvmResult};

/// How the first token of a line names the operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Designator<'a> {
  Mnemonic(&'a str),
  Opcode(u32),
}

impl<'a> Designator<'a> {
  fn resolve(&self, line: usize) -> UvmResult<Operation> {
    match self {
      Designator::Opcode(code) => {
        Operation::from_code(*code).map_err(|kind| UvmError::at_line(line, kind))
      }
      Designator::Mnemonic(name) => {
        Operation::from_str(&name.to_ascii_uppercase())
          .map_err(|_| UvmError::malformed(line, Malformed::UnknownOperation(name.to_string())))
      }
    }
  }
}

/// An instruction along with the (1-based) source line it came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SourceInstruction {
  pub line        : usize,
  pub instruction : Instruction,
}

impl Display for SourceInstruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:>4}: {}", self.line, self.instruction)
  }
}

// region Token parsers

/// Splits on any run of Unicode whitespace.
fn tokens(text: &str) -> IResult<&str, Vec<&str>> {
  all_consuming(
    delimited(
      take_while(char::is_whitespace),
      separated_list(take_while1(char::is_whitespace), take_till1(char::is_whitespace)),
      take_while(char::is_whitespace)
    )
  )(text)
}

fn designator(token: &str) -> IResult<&str, Designator> {
  all_consuming(
    alt((
      map_res(digit1, |digits: &str| digits.parse::<u32>().map(Designator::Opcode)),
      map(
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        Designator::Mnemonic
      ),
    ))
  )(token)
}

fn operand(token: &str) -> IResult<&str, u64> {
  all_consuming(map_res(digit1, |digits: &str| digits.parse::<u64>()))(token)
}

// endregion

/// Everything on the line before the comment character.
fn strip_comment(line: &str, comment: char) -> &str {
  match line.find(comment) {
    Some(idx) => &line[..idx],
    None      => line
  }
}

/**
  Parses one line. Returns `Ok(None)` for lines with nothing but whitespace or a comment.

  A numeric designator that isn't an opcode is an `InvalidOpcode` and an operand too wide for
  its operation is `OperandOutOfRange`; everything else wrong with a line is a
  `MalformedInstruction`. In all cases the error carries `line`.
*/
pub fn parse_line(text: &str, line: usize, comment: char) -> UvmResult<Option<Instruction>> {
  let code = strip_comment(text, comment).trim();
  if code.is_empty() {
    return Ok(None);
  }

  let words = match tokens(code) {
    Ok((_, words)) => words,
    // `tokens` accepts any run of non-blank text, so this is unreachable in practice.
    Err(_) => return Err(UvmError::malformed(line, Malformed::WrongTokenCount(0)))
  };

  if words.len() != 2 {
    return Err(UvmError::malformed(line, Malformed::WrongTokenCount(words.len())));
  }

  let operation = match designator(words[0]) {
    Ok((_, d)) => d.resolve(line)?,
    Err(_)     => {
      return Err(UvmError::malformed(line, Malformed::UnknownOperation(words[0].to_string())));
    }
  };

  let value = match operand(words[1]) {
    Ok((_, value)) => value,
    Err(_)         => {
      return Err(UvmError::malformed(line, Malformed::BadOperand(words[1].to_string())));
    }
  };

  Instruction::new(operation, value)
    .map(Some)
    .map_err(|kind| UvmError::at_line(line, kind))
}

/// Parses a whole program, stopping at the first bad line.
pub fn parse_assembly(text: &str, comment: char) -> UvmResult<Vec<SourceInstruction>> {
  let mut program = vec![];

  for (idx, source_line) in text.lines().enumerate() {
    let line = idx + 1;
    if let Some(instruction) = parse_line(source_line, line, comment)? {
      program.push(SourceInstruction { line, instruction });
    }
  }

  Ok(program)
}
