//! Addresses of memory cells, with bounds checking against the size of a particular machine's
//! memory.

use std::fmt::{Display, Formatter};

use crate::bytecode::Word;
use crate::error::{CodecResult, ErrorKind};

// `AddressNumberType` is `usize`, as it is naturally an index into a memory store.
pub type AddressNumberType = usize;

/// A cell of data memory. An `Address` is only ever constructed by checking it against a memory
/// size, so holding one means the index is in bounds for that memory.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Address(AddressNumberType);

impl Address {
  /// Checks `raw` against a memory of `memory_size` cells.
  pub fn checked(raw: AddressNumberType, memory_size: usize) -> CodecResult<Address> {
    match raw < memory_size {
      true  => Ok(Address(raw)),
      false => Err(ErrorKind::InvalidAddress(raw))
    }
  }

  /// Checks an instruction operand used as an address.
  pub fn from_operand(operand: Word, memory_size: usize) -> CodecResult<Address> {
    Address::checked(operand as AddressNumberType, memory_size)
  }

  /// Converts the address to an index into the memory vector.
  pub fn idx(&self) -> AddressNumberType {
    self.0
  }
}

impl Display for Address{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "M[{}]", self.0)
  }
}
