/*!
  An assembler and interpreter for a tiny accumulator machine.

  ```text
  source text -> [`Assembler::assemble`] -> binary image + log
  binary image -> [`Machine::run`] -> accumulator + memory -> [`Machine::dump`]
  ```
  The two halves only meet through the binary image. Both are pure; reading and writing files is
  done by the adapters in `files`.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

mod address;
pub mod assembler;
pub mod bytecode;
pub mod config;
pub mod dump;
pub mod error;
pub mod files;
pub mod machine;

pub use address::Address;
pub use assembler::{assemble, Assembler, Assembly, LogEntry};
pub use bytecode::{decode_instruction, disassemble, encode, Instruction, Operation, Word};
pub use config::{AssemblerConfig, MachineConfig, MEMORY_SIZE};
pub use dump::{MemoryDump, MemoryRange};
pub use error::{ErrorKind, Malformed, Position, UvmError, UvmResult};
pub use files::{assemble_file, execute_file, FileError};
pub use machine::{execute, Machine};
