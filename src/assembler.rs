//! Translates assembly text into a binary image, along with a log describing every instruction it
//! emitted.

use serde::Serialize;

use crate::bytecode::{encode_instruction, parse_assembly, SourceInstruction, Word, MAX_INSTRUCTION_LENGTH};
use crate::config::AssemblerConfig;
use crate::error::UvmResult;

/// One record per assembled instruction.
#[derive(Serialize, Clone, Debug, Eq, PartialEq)]
pub struct LogEntry {
  /// 1-based source line.
  pub line     : usize,
  pub opcode   : u8,
  pub mnemonic : &'static str,
  pub operand  : Word,
  /// Encoded bytes as space-separated hex.
  pub bytes    : String,
}

/// The output of a successful assembly: the image and one log entry per instruction in it, both
/// in program order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assembly {
  pub image : Vec<u8>,
  pub log   : Vec<LogEntry>,
}

pub struct Assembler {
  config: AssemblerConfig,
}

impl Assembler {

  pub fn new(config: AssemblerConfig) -> Assembler {
    Assembler { config }
  }

  /**
    Assembles `text` in a single forward pass. Fails on the first bad line, in which case there is
    no image and no log at all.

    Assembling the same text twice gives identical results; nothing is remembered between calls.
  */
  pub fn assemble(&self, text: &str) -> UvmResult<Assembly> {
    let program = parse_assembly(text, self.config.comment)?;

    let mut image = Vec::with_capacity(program.len() * MAX_INSTRUCTION_LENGTH);
    let mut log   = Vec::with_capacity(program.len());

    for SourceInstruction { line, instruction } in program {
      let encoded = encode_instruction(&instruction);

      log::info!(
        "line {}: assembled {} (opcode={}, operand={}) -> {}",
        line, instruction.operation(), instruction.opcode(), instruction.operand(), encoded.to_hex()
      );

      image.extend_from_slice(encoded.as_bytes());
      log.push(LogEntry {
        line,
        opcode   : instruction.opcode(),
        mnemonic : instruction.operation().mnemonic(),
        operand  : instruction.operand(),
        bytes    : encoded.to_hex(),
      });
    }

    log::debug!("assembled {} instructions into {} bytes", log.len(), image.len());

    Ok(Assembly { image, log })
  }
}

impl Default for Assembler {
  fn default() -> Assembler {
    Assembler::new(AssemblerConfig::default())
  }
}

/// Assembles `text` with the default settings.
pub fn assemble(text: &str) -> UvmResult<Assembly> {
  Assembler::default().assemble(text)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::disassemble;
  use crate::error::{ErrorKind, Malformed, UvmError};

  const PROGRAM: &str = "LOAD 129\nREAD 10\nWRITE 761\nMIN 935\n";

  #[test]
  fn end_to_end() {
    let assembly = assemble(PROGRAM).unwrap();

    let decoded: Vec<(u8, Word)> = disassemble(&assembly.image)
      .unwrap()
      .into_iter()
      .map(|(_, i)| (i.opcode(), i.operand()))
      .collect();
    assert_eq!(decoded, vec![(14, 129), (25, 10), (15, 761), (20, 935)]);

    let lines: Vec<usize> = assembly.log.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![1, 2, 3, 4]);
  }

  #[test]
  fn image_layout() {
    let assembly = assemble(PROGRAM).unwrap();
    assert_eq!(
      assembly.image,
      vec![0x2E, 0x10, 0x00, 0x00, 0x00, 0x59, 0x01, 0x00, 0x2F, 0x5F, 0x00, 0xF4, 0x74, 0x00]
    );
  }

  #[test]
  fn log_entries() {
    let assembly = assemble(PROGRAM).unwrap();
    assert_eq!(
      assembly.log[0],
      LogEntry {
        line: 1,
        opcode: 14,
        mnemonic: "LOAD_CONST",
        operand: 129,
        bytes: "0x2E 0x10 0x00 0x00 0x00".to_string()
      }
    );
    assert_eq!(assembly.log[3].mnemonic, "MIN_OP");
    assert_eq!(assembly.log[3].bytes, "0xF4 0x74 0x00");
  }

  #[test]
  fn log_serializes_in_field_order() {
    let assembly = assemble("WRITE 761").unwrap();
    let json = serde_json::to_string(&assembly.log).unwrap();
    assert_eq!(
      json,
      r#"[{"line":1,"opcode":15,"mnemonic":"MEMORY_WRITE","operand":761,"bytes":"0x2F 0x5F 0x00"}]"#
    );
  }

  #[test]
  fn idempotent() {
    let text = "; prog\n14 42\n15 0\n\n14 17\n20 0\n";
    let first  = assemble(text).unwrap();
    let second = assemble(text).unwrap();
    assert_eq!(first, second);

    let assembler = Assembler::default();
    assert_eq!(assembler.assemble(text).unwrap(), assembler.assemble(text).unwrap());
  }

  #[test]
  fn empty_source() {
    let assembly = assemble("\n   \n; only comments\n").unwrap();
    assert!(assembly.image.is_empty());
    assert!(assembly.log.is_empty());
  }

  #[test]
  fn errors_name_the_line() {
    assert_eq!(assemble("LOAD 1\n99 0\n"), Err(UvmError::at_line(2, ErrorKind::InvalidOpcode(99))));
    assert_eq!(
      assemble("LOAD 1\nREAD 2\nFROB 3"),
      Err(UvmError::malformed(3, Malformed::UnknownOperation("FROB".into())))
    );
    assert_eq!(
      assemble("WRITE 200000"),
      Err(UvmError::at_line(1, ErrorKind::OperandOutOfRange { operand: 200000, width: 17 }))
    );
  }

  #[test]
  fn custom_comment_character() {
    let assembler = Assembler::new(AssemblerConfig { comment: '#' });
    let assembly = assembler.assemble("# header\nLOAD 7 # seven").unwrap();
    assert_eq!(assembly.log.len(), 1);
    assert_eq!(assembly.log[0].line, 2);
  }
}
