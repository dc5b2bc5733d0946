use std::io::{Read, Result as IOResult, Write};

use crate::read_util::fixed_string_lossy;
use crate::{PrimitiveRead, PrimitiveWrite, RawDataRead};

pub struct Event {
  pub frame: i32,
  pub event: i32,
  pub event_type: i32,
  pub options: [u8; 64]
}

impl Event {
  pub const SIZE: usize = 76;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let frame = read.read_i32()?;
    let event = read.read_i32()?;
    let event_type = read.read_i32()?;
    let options = read.read_fixed::<64>()?;
    Ok(Self {
      frame,
      event,
      event_type,
      options
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_i32(self.frame)?;
    write.write_i32(self.event)?;
    write.write_i32(self.event_type)?;
    write.write_all(&self.options)
  }

  pub fn options(&self) -> String {
    fixed_string_lossy(&self.options)
  }
}
