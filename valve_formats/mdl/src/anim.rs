use std::io::{Read, Result as IOResult, Write};

use crate::{PrimitiveRead, PrimitiveWrite, AXIS_COUNT};

/// Per bone offsets of the animation value spans of one blend. Offsets are relative
/// to the start of this struct, zero means the axis is not animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimOffsets {
  pub offset: [u16; AXIS_COUNT]
}

impl AnimOffsets {
  pub const SIZE: usize = 12;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let mut offset = [0u16; AXIS_COUNT];
    for o in &mut offset {
      *o = read.read_u16()?;
    }
    Ok(Self { offset })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    for o in self.offset {
      write.write_u16(o)?;
    }
    Ok(())
  }
}

/// One 16 bit word of an animation value span. A span starts with a header word
/// holding `valid` in the low byte and `total` in the high byte, followed by `valid`
/// value words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AnimValue(pub u16);

impl AnimValue {
  pub const SIZE: usize = 2;

  pub fn header(valid: u8, total: u8) -> Self {
    Self(u16::from_le_bytes([valid, total]))
  }

  pub fn from_value(value: i16) -> Self {
    Self(value as u16)
  }

  pub fn valid(self) -> u8 {
    self.0.to_le_bytes()[0]
  }

  pub fn total(self) -> u8 {
    self.0.to_le_bytes()[1]
  }

  pub fn value(self) -> i16 {
    self.0 as i16
  }

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    Ok(Self(read.read_u16()?))
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_u16(self.0)
  }
}
