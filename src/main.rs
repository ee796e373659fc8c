use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use simplelog::{Config, TermLogger, TerminalMode};

use uvm::{
  assemble_file, disassemble, execute_file, AssemblerConfig, FileError, Machine, MachineConfig,
  Position, UvmError, MEMORY_SIZE,
};
use uvm::bytecode::encode_instruction;

#[derive(Parser, Debug)]
#[command(name = "uvm")]
#[command(about = "Assembler and interpreter for a tiny accumulator machine", long_about = None)]
struct Args {
  /// Number of memory cells in the machine
  #[arg(long, default_value_t = MEMORY_SIZE)]
  memory_size: usize,

  /// Character that starts a comment in assembly source
  #[arg(long, default_value_t = ';')]
  comment: char,

  /// More logging (-v for debug, -vv for every instruction)
  #[arg(short, long, action = ArgAction::Count)]
  verbose: u8,

  /// Only log errors
  #[arg(short, long, action = ArgAction::SetTrue)]
  quiet: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Assemble a source file into a binary image and a JSON log
  Assemble {
    source: PathBuf,
    output: PathBuf,
    log:    PathBuf,
  },

  /// Run a binary image and dump memory cells START..=END as JSON
  Execute {
    binary: PathBuf,
    start:  usize,
    end:    usize,
    output: PathBuf,
  },

  /// List the instructions in a binary image
  Disasm {
    binary: PathBuf,
  },
}

fn level(args: &Args) -> LevelFilter {
  match (args.quiet, args.verbose) {
    (true, _) => LevelFilter::Error,
    (_, 0)    => LevelFilter::Info,
    (_, 1)    => LevelFilter::Debug,
    _         => LevelFilter::Trace,
  }
}

fn disasm(binary: &Path) -> Result<(), FileError> {
  let image = fs::read(binary)?;
  let listing = disassemble(&image)?;

  for (pc, instruction) in listing {
    println!("{:04X}: {:<18} {}", pc, instruction.to_string(), encode_instruction(&instruction).to_hex());
  }
  Ok(())
}

/// Logs where a failed run stopped. This state is not a result.
fn show_partial_state(machine: &Machine) {
  log::debug!("state at failure (partial, not a valid dump):\n{}", machine);
}

fn main() {
  let args = Args::parse();

  if let Err(e) = TermLogger::init(level(&args), Config::default(), TerminalMode::Mixed) {
    eprintln!("could not initialize logging: {}", e);
  }

  let machine_config   = MachineConfig { memory_size: args.memory_size };
  let assembler_config = AssemblerConfig { comment: args.comment };

  let result = match &args.command {
    Command::Assemble { source, output, log } => {
      assemble_file(source, output, log, &assembler_config).map(|_| ())
    }

    Command::Execute { binary, start, end, output } => {
      let mut machine = Machine::new(machine_config);
      let result = execute_file(binary, *start, *end, output, &mut machine);
      match &result {
        Ok(dump) => println!("{}", dump),
        // Only a run that started has a state worth showing; a rejected range never ran.
        Err(FileError::Vm(UvmError { position: Position::Offset(_), .. })) => {
          show_partial_state(&machine)
        }
        Err(_) => {}
      }
      result.map(|_| ())
    }

    Command::Disasm { binary } => disasm(binary),
  };

  if let Err(e) = result {
    log::error!("{}", e);
    exit(1);
  }
}
