use std::io::{Read, Result as IOResult, Write};

use crate::{PrimitiveRead, PrimitiveWrite};

bitflags! {
  /// Motion and controller axis flags. The same bits describe bone controller
  /// types and the root motion of a sequence.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct MotionFlags: i32 {
    const X = 0x0001;
    const Y = 0x0002;
    const Z = 0x0004;
    const XR = 0x0008;
    const YR = 0x0010;
    const ZR = 0x0020;
    const LX = 0x0040;
    const LY = 0x0080;
    const LZ = 0x0100;
    const AX = 0x0200;
    const AY = 0x0400;
    const AZ = 0x0800;
    const AXR = 0x1000;
    const AYR = 0x2000;
    const AZR = 0x4000;
    const TYPES = 0x7FFF;
    /// Controller wraps around at 360 degrees.
    const RLOOP = 0x8000;
  }
}

pub struct BoneController {
  pub bone: i32,
  pub bone_controller_type: i32,
  pub start: f32,
  pub end: f32,
  pub rest: i32,
  pub index: i32
}

impl BoneController {
  pub const SIZE: usize = 24;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let bone = read.read_i32()?;
    let bone_controller_type = read.read_i32()?;
    let start = read.read_f32()?;
    let end = read.read_f32()?;
    let rest = read.read_i32()?;
    let index = read.read_i32()?;

    Ok(Self {
      bone,
      bone_controller_type,
      start,
      end,
      rest,
      index
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_i32(self.bone)?;
    write.write_i32(self.bone_controller_type)?;
    write.write_f32(self.start)?;
    write.write_f32(self.end)?;
    write.write_i32(self.rest)?;
    write.write_i32(self.index)
  }

  pub fn motion_flags(&self) -> MotionFlags {
    MotionFlags::from_bits_retain(self.bone_controller_type)
  }
}
