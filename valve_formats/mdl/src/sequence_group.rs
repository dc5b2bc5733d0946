use std::io::{Read, Result as IOResult, Write};

use crate::read_util::fixed_string_lossy;
use crate::{PrimitiveRead, PrimitiveWrite, RawDataRead};

pub struct SequenceGroup {
  pub label: [u8; 32],
  pub name: [u8; 64],
  pub cache: i32,
  /// Offset of the group's animation data. Only meaningful for group 0,
  /// which lives inside the main file.
  pub data: i32
}

impl SequenceGroup {
  pub const SIZE: usize = 104;
  pub const NAME_OFFSET: usize = 32;
  pub const NAME_LENGTH: usize = 64;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let label = read.read_fixed::<32>()?;
    let name = read.read_fixed::<64>()?;
    let cache = read.read_i32()?;
    let data = read.read_i32()?;

    Ok(Self {
      label,
      name,
      cache,
      data
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_all(&self.label)?;
    write.write_all(&self.name)?;
    write.write_i32(self.cache)?;
    write.write_i32(self.data)
  }

  pub fn label(&self) -> String {
    fixed_string_lossy(&self.label)
  }

  pub fn name(&self) -> String {
    fixed_string_lossy(&self.name)
  }
}
