/*!

  Instructions are variable length and bit-packed. The opcode occupies the low 5 bits of the
  first byte. The operand follows immediately, least significant bit first, starting at bit 5 of
  the first byte and running on into as many following bytes as the instruction has:
  ```text
  LOAD_CONST:                         [Opcode:5][Operand:29][Reserved:6]  (5 bytes)
  MEMORY_READ, MEMORY_WRITE, MIN_OP:  [Opcode:5][Operand:17][Reserved:2]  (3 bytes)
  ```

  Equivalently, an instruction is the integer `opcode | operand << 5` written out little-endian
  over its encoded length. There is no header, no instruction count, and no padding between
  instructions, so the length of each instruction is determined by its opcode alone. Reserved
  bits are written as zero and ignored when decoding.

  An instruction holds its `Operation` and its operand rather than one enum variant per opcode.
  All four operations take exactly one operand, and what varies between them (operand width,
  encoded length, behavior) is a property of the operation, so it is looked up through
  `Operation` in one place.

*/

mod assembly;
mod binary;
mod instruction;

pub use assembly::{parse_assembly, Designator, SourceInstruction};
pub use binary::{
  decode_instruction,
  disassemble,
  encode,
  encode_instruction,
  EncodedInstruction,
  Word,
  MAX_INSTRUCTION_LENGTH,
  OPCODE_BITS,
  OPCODE_MASK,
};
pub use instruction::{Instruction, Operation};
