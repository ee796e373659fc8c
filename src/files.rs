//! File-level entry points. These read their input, call into the pure assembler or machine, and
//! write their output only once everything has succeeded, so a failed run never leaves a partial
//! image, log or dump behind.

use std::error::Error;
use std::fs;
use std::io;
use std::path::Path;

use parse_display::Display;

use crate::assembler::{Assembler, Assembly};
use crate::config::AssemblerConfig;
use crate::dump::MemoryDump;
use crate::error::UvmError;
use crate::machine::Machine;

// ------------------------------------------------------------------------------------------------
// FileError
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Display)]
pub enum FileError {
  #[display("I/O error: {0}")]
  Io(io::Error),

  #[display("could not serialize output: {0}")]
  Json(serde_json::Error),

  #[display("{0}")]
  Vm(UvmError),
}

impl Error for FileError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      FileError::Io(e)   => Some(e),
      FileError::Json(e) => Some(e),
      FileError::Vm(e)   => Some(e),
    }
  }
}

impl From<io::Error> for FileError {
  fn from(e: io::Error) -> FileError { FileError::Io(e) }
}

impl From<serde_json::Error> for FileError {
  fn from(e: serde_json::Error) -> FileError { FileError::Json(e) }
}

impl From<UvmError> for FileError {
  fn from(e: UvmError) -> FileError { FileError::Vm(e) }
}

pub type FileResult<T> = Result<T, FileError>;

// ------------------------------------------------------------------------------------------------
// Entry points
// ------------------------------------------------------------------------------------------------

/// Assembles the file at `source`, writing the image to `output` and a JSON log to `log`.
pub fn assemble_file(
  source : &Path,
  output : &Path,
  log    : &Path,
  config : &AssemblerConfig,
) -> FileResult<Assembly> {
  let text = fs::read_to_string(source)?;
  let assembly = Assembler::new(*config).assemble(&text)?;
  let log_text = serde_json::to_string_pretty(&assembly.log)?;

  fs::write(output, &assembly.image)?;
  if let Err(e) = fs::write(log, log_text) {
    // An image without its log is not a finished assembly.
    let _ = fs::remove_file(output);
    return Err(e.into());
  }

  log::info!(
    "wrote {} bytes to {} and {} log entries to {}",
    assembly.image.len(), output.display(), assembly.log.len(), log.display()
  );
  Ok(assembly)
}

/**
  Runs the image at `binary` on `machine` and writes a JSON dump of memory cells `start..=end` to
  `output`. `machine` should be fresh; after a failed run it is left in its partial state.
*/
pub fn execute_file(
  binary  : &Path,
  start   : usize,
  end     : usize,
  output  : &Path,
  machine : &mut Machine,
) -> FileResult<MemoryDump> {
  let image = fs::read(binary)?;
  let dump = machine.execute(&image, start, end)?;

  fs::write(output, serde_json::to_string_pretty(&dump)?)?;

  log::info!("wrote memory [{}, {}] to {}", start, end, output.display());
  Ok(dump)
}
