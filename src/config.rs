//! Per-instance settings. Each `Machine` and `Assembler` owns its own copy, so independent runs
//! never share anything.

/// Number of memory cells in a machine unless configured otherwise.
pub const MEMORY_SIZE: usize = 1024;

/// Character starting a comment in assembly source unless configured otherwise.
pub const COMMENT_CHAR: char = ';';

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MachineConfig {
  /// Number of memory cells; valid addresses are `0..memory_size`.
  pub memory_size: usize,
}

impl Default for MachineConfig {
  fn default() -> MachineConfig {
    MachineConfig { memory_size: MEMORY_SIZE }
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AssemblerConfig {
  /// Everything from this character to the end of the line is ignored.
  pub comment: char,
}

impl Default for AssemblerConfig {
  fn default() -> AssemblerConfig {
    AssemblerConfig { comment: COMMENT_CHAR }
  }
}
