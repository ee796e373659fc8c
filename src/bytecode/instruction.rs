use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::bytecode::Word;
use crate::error::{CodecResult, ErrorKind};

/**
  Opcodes of the virtual machine.

  The discriminants are the opcode values that appear in the binary image, so they must not be
  renumbered. Each operation's properties are given by the methods below, which all match on
  the operation, so a new operation would have to be added to each of:
  ```text
  Operation::operand_width()
  Operation::encoded_length()
  Machine::execute_instruction()
  ```
  The `to_string` name is the canonical mnemonic used in logs and listings; the `serialize`
  name is a short alias accepted by the assembler.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,            Hash
)]
#[repr(u8)]
pub enum Operation {
  #[strum(to_string = "LOAD_CONST", serialize = "LOAD")]
  LoadConst   = 14, // accumulator := operand
  #[strum(to_string = "MEMORY_WRITE", serialize = "WRITE")]
  MemoryWrite = 15, // memory[operand] := accumulator
  #[strum(to_string = "MIN_OP", serialize = "MIN")]
  MinOp       = 20, // accumulator := min(accumulator, memory[operand])
  #[strum(to_string = "MEMORY_READ", serialize = "READ")]
  MemoryRead  = 25, // accumulator := memory[operand]
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Looks up an opcode value. Anything that isn't one of the four opcodes is an `InvalidOpcode`.
  pub fn from_code(code: u32) -> CodecResult<Operation> {
    u8::try_from(code)
      .ok()
      .and_then(|byte| Operation::try_from(byte).ok())
      .ok_or(ErrorKind::InvalidOpcode(code))
  }

  /// The canonical mnemonic.
  pub fn mnemonic(&self) -> &'static str {
    Into::<&'static str>::into(*self)
  }

  /// Number of bits in the operand field.
  pub fn operand_width(&self) -> u32 {
    match self {
      Operation::LoadConst => 29,
      Operation::MemoryWrite | Operation::MinOp | Operation::MemoryRead => 17,
    }
  }

  /// Size in bytes of an encoded instruction with this opcode.
  pub fn encoded_length(&self) -> usize {
    match self {
      Operation::LoadConst => 5,
      Operation::MemoryWrite | Operation::MinOp | Operation::MemoryRead => 3,
    }
  }

  /// A mask of the low `operand_width()` bits.
  pub fn operand_mask(&self) -> u64 {
    (1u64 << self.operand_width()) - 1
  }

  /// Is the operand interpreted as a memory address?
  pub fn addresses_memory(&self) -> bool {
    *self != Operation::LoadConst
  }
}

/// An operation along with its operand. The operand always fits in the operation's operand
/// field; the only way to build an `Instruction` is through the range-checking constructors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  operation : Operation,
  operand   : Word,
}

impl Instruction {
  pub fn new(operation: Operation, operand: u64) -> CodecResult<Instruction> {
    if operand > operation.operand_mask() {
      return Err(ErrorKind::OperandOutOfRange { operand, width: operation.operand_width() });
    }

    Ok(Instruction { operation, operand: operand as Word })
  }

  /// Builds an instruction from a raw opcode value and operand.
  pub fn from_raw(opcode: u32, operand: u64) -> CodecResult<Instruction> {
    Instruction::new(Operation::from_code(opcode)?, operand)
  }

  pub fn operation(&self) -> Operation {
    self.operation
  }

  pub fn opcode(&self) -> u8 {
    self.operation.code()
  }

  pub fn operand(&self) -> Word {
    self.operand
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}", self.operation, self.operand)
  }
}
