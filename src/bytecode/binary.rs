/*!
  This module is responsible for the encoding and decoding of binary instructions. Nothing in
  here does I/O; the functions work on byte slices.

*/

use super::{Operation, Instruction};
use crate::error::{CodecResult, ErrorKind, UvmError, UvmResult};

// If you change this you must also change `encode_instruction` and `decode_instruction`.
pub type Word = u32;

/// Number of low bits of the first byte holding the opcode.
pub const OPCODE_BITS: u32 = 5;
pub const OPCODE_MASK: u8 = 0x1F;
pub const MAX_INSTRUCTION_LENGTH: usize = 5;

/// An `Either` type for an encoded instruction, which is either 3 bytes or 5.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EncodedInstruction {
  Short([u8; 3]),
  Long([u8; 5]),
}

impl EncodedInstruction {
  pub fn as_bytes(&self) -> &[u8] {
    match self {
      EncodedInstruction::Short(bytes) => &bytes[..],
      EncodedInstruction::Long(bytes)  => &bytes[..],
    }
  }

  pub fn len(&self) -> usize {
    self.as_bytes().len()
  }

  /// The bytes as space-separated hex, e.g. `0x2E 0x10 0x00 0x00 0x00`.
  pub fn to_hex(&self) -> String {
    self.as_bytes()
        .iter()
        .map(|b| format!("0x{:02X}", b))
        .collect::<Vec<String>>()
        .join(" ")
  }
}

/**
  Encodes the instruction into bytecode. The instruction's operand was range-checked when it was
  constructed, so this can't fail.
*/
pub fn encode_instruction(instruction: &Instruction) -> EncodedInstruction {
  // [Opcode:5][Operand:width], little-endian
  let packed =
    (instruction.opcode() as u64) |
    ((instruction.operand() as u64) << OPCODE_BITS);
  let le = packed.to_le_bytes();

  match instruction.operation().encoded_length() {
    5 => EncodedInstruction::Long([le[0], le[1], le[2], le[3], le[4]]),
    _ => EncodedInstruction::Short([le[0], le[1], le[2]]),
  }
}

/// Encodes a raw opcode value and operand, checking both.
pub fn encode(opcode: u32, operand: u64) -> CodecResult<EncodedInstruction> {
  Ok(encode_instruction(&Instruction::from_raw(opcode, operand)?))
}

/**
  Decodes the instruction starting at `position` in `image`, returning it along with the number
  of bytes it took up.

  The opcode alone determines the length. If fewer bytes than that remain, this fails with
  `TruncatedInstruction`; if the opcode isn't one of ours, `InvalidOpcode`.
*/
pub fn decode_instruction(image: &[u8], position: usize) -> CodecResult<(Instruction, usize)> {
  let rest = image.get(position..).unwrap_or(&[]);
  let first = match rest.first() {
    Some(b) => *b,
    None => {
      return Err(ErrorKind::TruncatedInstruction { position, needed: 1, available: 0 });
    }
  };

  let operation = Operation::from_code((first & OPCODE_MASK) as u32)?;
  let length = operation.encoded_length();

  if rest.len() < length {
    return Err(
      ErrorKind::TruncatedInstruction { position, needed: length, available: rest.len() }
    );
  }

  // Shift each byte into place; byte 0 contributes only its top 3 bits.
  let packed = rest[..length]
    .iter()
    .enumerate()
    .fold(0u64, |acc, (i, b)| acc | ((*b as u64) << (8 * i)));
  let operand = (packed >> OPCODE_BITS) & operation.operand_mask();

  Ok((Instruction::new(operation, operand)?, length))
}

/// Decodes a whole image into `(offset, instruction)` pairs without executing anything.
pub fn disassemble(image: &[u8]) -> UvmResult<Vec<(usize, Instruction)>> {
  let mut pc = 0;
  let mut listing = vec![];

  while pc < image.len() {
    let (instruction, length) = decode_instruction(image, pc)
      .map_err(|kind| UvmError::at_offset(pc, kind))?;
    listing.push((pc, instruction));
    pc += length;
  }

  Ok(listing)
}
