//! Diagnostics shared by the assembler and the interpreter.
//!
//! Every error aborts the run that raised it. An `ErrorKind` says what went wrong; a `UvmError`
//! additionally says where: a source line for the assembler, a byte offset into the image for the
//! interpreter, or the offending range for a rejected dump request.

use std::error::Error;

use parse_display::Display;

// ------------------------------------------------------------------------------------------------
// Malformed
// ------------------------------------------------------------------------------------------------

/// Why a source line could not be read as an instruction.
#[derive(Debug, Display, PartialEq, Eq, Clone)]
pub enum Malformed {
  /// A line must hold exactly a designator and an operand.
  #[display("expected 2 tokens but found {0}")]
  WrongTokenCount(usize),

  /// The designator is neither a known mnemonic nor a number.
  #[display("unknown operation '{0}'")]
  UnknownOperation(String),

  /// The operand is not an unsigned decimal integer.
  #[display("operand '{0}' is not a decimal integer")]
  BadOperand(String),
}

// ------------------------------------------------------------------------------------------------
// ErrorKind
// ------------------------------------------------------------------------------------------------

/// The kinds of errors.
#[derive(Debug, Display, PartialEq, Eq, Clone)]
pub enum ErrorKind {
  /// Not one of the four opcodes.
  #[display("invalid opcode {0}")]
  InvalidOpcode(u32),

  /// The operand does not fit in the operation's operand field.
  #[display("operand {operand} does not fit in {width} bits")]
  OperandOutOfRange { operand: u64, width: u32 },

  /// A source line that does not parse.
  #[display("malformed instruction: {0}")]
  MalformedInstruction(Malformed),

  /// The codec ran out of bytes in the middle of an instruction.
  #[display("truncated instruction at offset {position} (expected {needed} bytes, got {available})")]
  TruncatedInstruction { position: usize, needed: usize, available: usize },

  /// A memory address outside of the machine's memory.
  #[display("invalid address {0}")]
  InvalidAddress(usize),

  /// The image ends in the middle of an instruction.
  #[display("corrupt image (expected {needed} bytes, got {available})")]
  CorruptImage { needed: usize, available: usize },
}

impl Error for ErrorKind {}

// ------------------------------------------------------------------------------------------------
// Position
// ------------------------------------------------------------------------------------------------

/// Where an error happened.
#[derive(Debug, Display, PartialEq, Eq, Copy, Clone)]
pub enum Position {
  /// 1-based line of assembler source.
  #[display("line {0}")]
  Line(usize),

  /// Byte offset of an instruction in a binary image.
  #[display("offset 0x{0:04X}")]
  Offset(usize),

  /// An inclusive memory range requested for a dump.
  #[display("dump range [{start}, {end}]")]
  Range { start: usize, end: usize },
}

// ------------------------------------------------------------------------------------------------
// UvmError
// ------------------------------------------------------------------------------------------------

/// An error, along with where it happened.
#[derive(Debug, Display, PartialEq, Eq, Clone)]
#[display("error at {position}: {kind}")]
pub struct UvmError {
  pub position: Position,
  pub kind:     ErrorKind,
}

impl Error for UvmError {}

impl UvmError {
  pub fn at_line(line: usize, kind: ErrorKind) -> UvmError {
    UvmError { position: Position::Line(line), kind }
  }

  pub fn at_offset(pc: usize, kind: ErrorKind) -> UvmError {
    UvmError { position: Position::Offset(pc), kind }
  }

  pub fn in_range(start: usize, end: usize, kind: ErrorKind) -> UvmError {
    UvmError { position: Position::Range { start, end }, kind }
  }

  /// Shorthand for a malformed line.
  pub fn malformed(line: usize, why: Malformed) -> UvmError {
    UvmError::at_line(line, ErrorKind::MalformedInstruction(why))
  }

  /// The source line this error refers to, if it came from the assembler.
  pub fn line(&self) -> Option<usize> {
    match self.position {
      Position::Line(line) => Some(line),
      _ => None
    }
  }
}

// ------------------------------------------------------------------------------------------------
// Results
// ------------------------------------------------------------------------------------------------

/// Results of the codec, which knows nothing about lines or program counters.
pub type CodecResult<T> = Result<T, ErrorKind>;

/// Alias for a `Result` with a `UvmError` as its error type.
pub type UvmResult<T> = Result<T, UvmError>;
