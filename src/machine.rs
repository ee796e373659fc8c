//! The execution engine: an accumulator, a flat data memory, and a fetch-decode-execute loop over
//! a binary image.

use std::cmp::min;
use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::address::Address;
use crate::bytecode::{decode_instruction, Instruction, Operation, Word};
use crate::config::MachineConfig;
use crate::dump::{MemoryDump, MemoryRange};
use crate::error::{CodecResult, ErrorKind, UvmError, UvmResult};

/**
  The machine state for one run. Create a fresh `Machine` per program; nothing is shared between
  machines.

  When `run` fails, the machine is left exactly as it was when the faulting instruction was
  fetched, and `pc()` is that instruction's offset. That state is useful for diagnostics but is
  not the result of the program.
*/
pub struct Machine {
  // Registers //
  accumulator : Word,
  pc          : usize, // Byte offset of the next instruction, a cursor

  // Memory Store
  memory      : Vec<Word>,

  // Bookkeeping for display
  steps       : usize,
  last_access : Option<Address>,
}

impl Machine {

  // region Display methods

  fn make_memory_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    // Untouched cells are zero; listing all of them would bury the interesting ones.
    for (i, value) in self.memory.iter().enumerate() {
      let highlighted = self.last_access.map(|a| a.idx()) == Some(i);
      if *value == 0 && !highlighted {
        continue;
      }

      match highlighted {

        true  => {
          table.add_row(row![r->format!("* --> M[{}] =", i), format!("{}", value)]);
        }

        false => {
          table.add_row(row![r->format!("M[{}] =", i), format!("{}", value)]);
        }

      } // end match on highlight
    } // end for
    table
  }

  // endregion

  // region Low-level utility methods

  pub fn new(config: MachineConfig) -> Machine {
    Machine {
      accumulator :  0,
      pc          :  0,
      memory      :  vec![0; config.memory_size],
      steps       :  0,
      last_access :  None,
    }
  }

  pub fn accumulator(&self) -> Word {
    self.accumulator
  }

  /// Byte offset of the next instruction, or of the faulting one after a failed `run`.
  pub fn pc(&self) -> usize {
    self.pc
  }

  /// Number of instructions executed so far.
  pub fn steps(&self) -> usize {
    self.steps
  }

  pub fn memory(&self) -> &[Word] {
    &self.memory
  }

  /// Sets the accumulator directly, without running an instruction.
  pub fn load_accumulator(&mut self, value: Word) {
    self.accumulator = value;
  }

  fn address(&mut self, operand: Word) -> CodecResult<Address> {
    let address = Address::from_operand(operand, self.memory.len())?;
    self.last_access = Some(address);
    Ok(address)
  }

  // endregion

  // region Execution

  /**
    Executes a single, already decoded instruction. Address operands are bounds-checked before
    anything is changed, so a failing instruction leaves the machine untouched.
  */
  pub fn execute_instruction(&mut self, instruction: &Instruction) -> CodecResult<()> {
    let operation = instruction.operation();
    let operand   = instruction.operand();

    if !operation.addresses_memory() {
      self.accumulator = operand;
      return Ok(());
    }

    let cell = self.address(operand)?.idx();
    match operation {

      Operation::MemoryRead  => {
        self.accumulator = self.memory[cell];
      }

      Operation::MemoryWrite => {
        self.memory[cell] = self.accumulator;
      }

      Operation::MinOp       => {
        self.accumulator = min(self.accumulator, self.memory[cell]);
      }

      // Takes no address; handled above.
      Operation::LoadConst   => {}

    }

    Ok(())
  }

  /**
    Fetches, decodes and executes the instruction at `pc`. Returns `Ok(false)` once `pc` has
    reached the end of the image, which is the only way a program halts.
  */
  pub fn step(&mut self, image: &[u8]) -> UvmResult<bool> {
    // Fetch
    if self.pc >= image.len() {
      return Ok(false);
    }

    // Decode
    let pc = self.pc;
    let (instruction, length) = decode_instruction(image, pc).map_err(|kind| {
      match kind {
        ErrorKind::TruncatedInstruction { needed, available, .. } => {
          UvmError::at_offset(pc, ErrorKind::CorruptImage { needed, available })
        }
        kind => UvmError::at_offset(pc, kind)
      }
    })?;

    // Execute
    self.execute_instruction(&instruction)
        .map_err(|kind| UvmError::at_offset(pc, kind))?;

    #[cfg(feature = "trace_computation")]
    log::trace!("{:04X}: {:<18} ACC={}", pc, instruction.to_string(), self.accumulator);

    // Advance
    self.pc += length;
    self.steps += 1;
    Ok(true)
  }

  /// Runs until the end of the image or the first error.
  pub fn run(&mut self, image: &[u8]) -> UvmResult<()> {
    while self.step(image)? {}

    log::debug!(
      "halted after {} instructions ({} bytes), ACC={}",
      self.steps, image.len(), self.accumulator
    );
    Ok(())
  }

  /// Fails with `InvalidAddress` unless `[start, end]` is a non-empty range inside memory.
  pub fn check_range(&self, start: usize, end: usize) -> UvmResult<()> {
    let size = self.memory.len();
    let bad = if start >= size || start > end {
      Some(start)
    } else if end >= size {
      Some(end)
    } else {
      None
    };

    match bad {
      Some(address) => Err(UvmError::in_range(start, end, ErrorKind::InvalidAddress(address))),
      None          => Ok(())
    }
  }

  /// The memory cells `start..=end` and the accumulator.
  pub fn dump(&self, start: usize, end: usize) -> UvmResult<MemoryDump> {
    self.check_range(start, end)?;

    Ok(MemoryDump {
      memory_range: MemoryRange {
        start,
        end,
        values: self.memory[start..=end].to_vec(),
      },
      accumulator: self.accumulator,
    })
  }

  /**
    Checks `[start, end]`, runs `image` and dumps that range. A rejected range fails before
    anything runs. After a failed run the machine holds the partial state described above.
  */
  pub fn execute(&mut self, image: &[u8], start: usize, end: usize) -> UvmResult<MemoryDump> {
    self.check_range(start, end)?;
    self.run(image)?;
    self.dump(start, end)
  }

  // endregion
}

impl Default for Machine {
  fn default() -> Machine {
    Machine::new(MachineConfig::default())
  }
}

/**
  Runs `image` on a fresh machine and dumps memory cells `start..=end`.

  The range is checked before anything runs. Any failure means there is no dump.
*/
pub fn execute(image: &[u8], start: usize, end: usize, config: MachineConfig) -> UvmResult<MemoryDump> {
  Machine::new(config).execute(image, start, end)
}

lazy_static! {
  pub(crate) static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let m_table = self.make_memory_table();

    write!(
      f,
      "ACC: {}\tPC: 0x{:04X}\tSteps: {}\n{}",
      self.accumulator, self.pc, self.steps, m_table
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assembler::assemble;
  use crate::bytecode::encode;

  fn image(program: &[(u32, u64)]) -> Vec<u8> {
    let mut image = vec![];
    for (opcode, operand) in program {
      image.extend_from_slice(encode(*opcode, *operand).unwrap().as_bytes());
    }
    image
  }

  fn inst(opcode: u32, operand: u64) -> Instruction {
    Instruction::from_raw(opcode, operand).unwrap()
  }

  #[test]
  fn load_constant() {
    let mut machine = Machine::default();
    machine.execute_instruction(&inst(14, 129)).unwrap();
    assert_eq!(machine.accumulator(), 129);
  }

  #[test]
  fn memory_operations() {
    let mut machine = Machine::default();
    machine.load_accumulator(42);
    machine.execute_instruction(&inst(15, 10)).unwrap();
    assert_eq!(machine.memory()[10], 42);

    machine.load_accumulator(0);
    machine.execute_instruction(&inst(25, 10)).unwrap();
    assert_eq!(machine.accumulator(), 42);
  }

  #[test]
  fn min_operation() {
    let mut machine = Machine::default();
    machine.load_accumulator(50);
    machine.execute_instruction(&inst(15, 0)).unwrap();

    machine.load_accumulator(100);
    machine.execute_instruction(&inst(20, 0)).unwrap();
    assert_eq!(machine.accumulator(), 50);

    machine.load_accumulator(25);
    machine.execute_instruction(&inst(20, 0)).unwrap();
    assert_eq!(machine.accumulator(), 25);
  }

  #[test]
  fn full_program() {
    let program = image(&[(14, 42), (15, 0), (14, 17), (20, 0)]);
    let mut machine = Machine::default();
    machine.run(&program).unwrap();

    assert_eq!(machine.accumulator(), 17);
    assert_eq!(machine.memory()[0], 42);
    assert_eq!(machine.steps(), 4);
    assert_eq!(machine.pc(), program.len());
  }

  #[test]
  fn execute_dumps_range() {
    let program = image(&[(14, 42), (15, 0), (14, 7), (15, 2), (14, 17), (20, 0)]);
    let dump = execute(&program, 0, 2, MachineConfig::default()).unwrap();

    assert_eq!(dump.memory_range.start, 0);
    assert_eq!(dump.memory_range.end, 2);
    assert_eq!(dump.memory_range.values, vec![42, 0, 7]);
    assert_eq!(dump.accumulator, 17);
  }

  #[test]
  fn assembled_program_runs() {
    let assembly = assemble("LOAD 42\nWRITE 0\nLOAD 17\nMIN 0\n").unwrap();
    let dump = execute(&assembly.image, 0, 0, MachineConfig::default()).unwrap();
    assert_eq!(dump.memory_range.values, vec![42]);
    assert_eq!(dump.accumulator, 17);
  }

  #[test]
  fn empty_image_halts_immediately() {
    let mut machine = Machine::default();
    machine.run(&[]).unwrap();
    assert_eq!(machine.steps(), 0);
    assert_eq!(machine.accumulator(), 0);
  }

  #[test]
  fn out_of_bounds_instruction() {
    let mut machine = Machine::default();
    machine.load_accumulator(5);

    assert_eq!(machine.execute_instruction(&inst(25, 9999)), Err(ErrorKind::InvalidAddress(9999)));
    assert_eq!(machine.execute_instruction(&inst(15, 9999)), Err(ErrorKind::InvalidAddress(9999)));
    assert_eq!(machine.execute_instruction(&inst(20, 1024)), Err(ErrorKind::InvalidAddress(1024)));

    assert_eq!(machine.accumulator(), 5);
    assert!(machine.memory().iter().all(|v| *v == 0));
  }

  #[test]
  fn out_of_bounds_stops_the_run() {
    // LOAD 1; WRITE 3; READ 9999; WRITE 4
    let program = image(&[(14, 1), (15, 3), (25, 9999), (15, 4)]);
    let mut machine = Machine::default();

    assert_eq!(machine.run(&program), Err(UvmError::at_offset(8, ErrorKind::InvalidAddress(9999))));
    assert_eq!(machine.pc(), 8);
    assert_eq!(machine.steps(), 2);
    assert_eq!(machine.memory()[3], 1);
    assert_eq!(machine.memory()[4], 0);
  }

  #[test]
  fn truncated_image_is_corrupt() {
    let mut program = image(&[(14, 1), (15, 3)]);
    program.extend_from_slice(&[0x2E, 0x10]);

    let mut machine = Machine::default();
    assert_eq!(
      machine.run(&program),
      Err(UvmError::at_offset(8, ErrorKind::CorruptImage { needed: 5, available: 2 }))
    );
    assert_eq!(machine.memory()[3], 1);
  }

  #[test]
  fn unknown_opcode_in_image() {
    let mut program = image(&[(14, 1)]);
    program.extend_from_slice(&[0x03, 0x00, 0x00]);

    assert_eq!(
      execute(&program, 0, 0, MachineConfig::default()),
      Err(UvmError::at_offset(5, ErrorKind::InvalidOpcode(3)))
    );
  }

  #[test]
  fn dump_range_is_checked() {
    let machine = Machine::default();
    assert_eq!(
      machine.dump(0, 1024),
      Err(UvmError::in_range(0, 1024, ErrorKind::InvalidAddress(1024)))
    );
    assert_eq!(
      machine.dump(5, 4),
      Err(UvmError::in_range(5, 4, ErrorKind::InvalidAddress(5)))
    );
    assert_eq!(machine.dump(1023, 1023).map(|d| d.memory_range.values), Ok(vec![0]));
  }

  #[test]
  fn bad_range_fails_before_running() {
    let program = image(&[(14, 1), (25, 9999)]);
    // The range error wins even though the program would fail too.
    assert_eq!(
      execute(&program, 2000, 2001, MachineConfig::default()),
      Err(UvmError::in_range(2000, 2001, ErrorKind::InvalidAddress(2000)))
    );
  }

  #[test]
  fn load_const_touches_no_memory() {
    let mut machine = Machine::new(MachineConfig { memory_size: 4 });
    machine.execute_instruction(&inst(14, 5000)).unwrap();
    assert_eq!(machine.accumulator(), 5000);
    assert_eq!(machine.last_access, None);
  }

  #[test]
  fn failed_execute_keeps_partial_state() {
    let program = image(&[(14, 1), (15, 3), (25, 9999)]);

    let mut machine = Machine::default();
    assert!(machine.execute(&program, 0, 3).is_err());
    assert_eq!(machine.pc(), 8);
    assert_eq!(machine.steps(), 2);

    // A rejected range never starts the program.
    let mut machine = Machine::default();
    assert!(machine.execute(&program, 0, 1024).is_err());
    assert_eq!(machine.steps(), 0);
    assert_eq!(machine.pc(), 0);
  }

  #[test]
  fn configured_memory_size() {
    let config = MachineConfig { memory_size: 16 };
    let program = image(&[(14, 9), (15, 15)]);
    let dump = execute(&program, 15, 15, config).unwrap();
    assert_eq!(dump.memory_range.values, vec![9]);

    let program = image(&[(14, 9), (15, 16)]);
    assert_eq!(
      execute(&program, 0, 0, config),
      Err(UvmError::at_offset(5, ErrorKind::InvalidAddress(16)))
    );
  }

  #[test]
  fn display_highlights_last_access() {
    let mut machine = Machine::default();
    machine.run(&image(&[(14, 42), (15, 7)])).unwrap();
    let text = machine.to_string();
    assert!(text.contains("ACC: 42"));
    assert!(text.contains("* --> M[7] ="));
  }
}
