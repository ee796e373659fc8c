//! The result of a successful run: a slice of memory and the final accumulator.

use std::fmt::{Display, Formatter};

use prettytable::Table;
use serde::Serialize;

use crate::bytecode::Word;
use crate::machine::TABLE_DISPLAY_FORMAT;

/// An inclusive range of memory addresses and the values stored there.
#[derive(Serialize, Clone, Debug, Eq, PartialEq)]
pub struct MemoryRange {
  pub start  : usize,
  pub end    : usize,
  pub values : Vec<Word>,
}

#[derive(Serialize, Clone, Debug, Eq, PartialEq)]
pub struct MemoryDump {
  pub memory_range : MemoryRange,
  pub accumulator  : Word,
}

impl Display for MemoryDump {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    let range = &self.memory_range;
    for (address, value) in (range.start..=range.end).zip(range.values.iter()) {
      table.add_row(row![r->format!("M[{}] =", address), format!("{}", value)]);
    }

    write!(f, "ACC: {}\n{}", self.accumulator, table)
  }
}
