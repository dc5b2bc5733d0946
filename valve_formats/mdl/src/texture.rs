use std::io::{Read, Result as IOResult, Write};

use crate::read_util::fixed_string_lossy;
use crate::{PrimitiveRead, PrimitiveWrite, RawDataRead};

pub const PALETTE_SIZE: usize = 256 * 3;

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
  pub struct TextureFlags: i32 {
    const FLATSHADE = 1;
    const CHROME = 1 << 1;
    const FULLBRIGHT = 1 << 2;
    const NOMIPS = 1 << 3;
    const ALPHA = 1 << 4;
    const ADDITIVE = 1 << 5;
    const MASKED = 1 << 6;
  }
}

pub struct Texture {
  pub name: [u8; 64],
  pub flags: i32,
  pub width: i32,
  pub height: i32,
  /// Offset of `width * height` palette indices, directly followed by the palette.
  pub index: i32
}

impl Texture {
  pub const SIZE: usize = 80;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let name = read.read_fixed::<64>()?;
    let flags = read.read_i32()?;
    let width = read.read_i32()?;
    let height = read.read_i32()?;
    let index = read.read_i32()?;

    Ok(Self {
      name,
      flags,
      width,
      height,
      index
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_all(&self.name)?;
    write.write_i32(self.flags)?;
    write.write_i32(self.width)?;
    write.write_i32(self.height)?;
    write.write_i32(self.index)
  }

  pub fn name(&self) -> String {
    fixed_string_lossy(&self.name)
  }

  pub fn texture_flags(&self) -> TextureFlags {
    TextureFlags::from_bits_retain(self.flags)
  }
}
