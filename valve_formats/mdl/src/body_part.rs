use std::io::{Read, Result as IOResult, Write};

use crate::read_util::fixed_string_lossy;
use crate::{PrimitiveRead, PrimitiveWrite, RawDataRead};

pub struct BodyPart {
  pub name: [u8; 64],
  pub models_count: i32,
  pub base: i32,
  pub model_offset: i32
}

impl BodyPart {
  pub const SIZE: usize = 76;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let name = read.read_fixed::<64>()?;
    let models_count = read.read_i32()?;
    let base = read.read_i32()?;
    let model_offset = read.read_i32()?;

    Ok(Self {
      name,
      models_count,
      base,
      model_offset
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_all(&self.name)?;
    write.write_i32(self.models_count)?;
    write.write_i32(self.base)?;
    write.write_i32(self.model_offset)
  }

  pub fn name(&self) -> String {
    fixed_string_lossy(&self.name)
  }
}
