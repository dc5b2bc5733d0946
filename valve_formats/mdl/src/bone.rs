use std::io::{Read, Result as IOResult, Write};

use crate::read_util::fixed_string_lossy;
use crate::{PrimitiveRead, PrimitiveWrite, RawDataRead};

/// Number of animated channels per bone: X, Y, Z position followed by X, Y, Z rotation.
pub const AXIS_COUNT: usize = 6;

pub struct Bone {
  pub name: [u8; 32],
  pub parent: i32,
  pub flags: i32,
  pub bone_controller: [i32; AXIS_COUNT],
  pub value: [f32; AXIS_COUNT],
  pub scale: [f32; AXIS_COUNT]
}

impl Bone {
  pub const SIZE: usize = 112;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let name = read.read_fixed::<32>()?;
    let parent = read.read_i32()?;
    let flags = read.read_i32()?;
    let mut bone_controller = [0i32; AXIS_COUNT];
    for controller in &mut bone_controller {
      *controller = read.read_i32()?;
    }
    let mut value = [0f32; AXIS_COUNT];
    for v in &mut value {
      *v = read.read_f32()?;
    }
    let mut scale = [0f32; AXIS_COUNT];
    for s in &mut scale {
      *s = read.read_f32()?;
    }

    Ok(Self {
      name,
      parent,
      flags,
      bone_controller,
      value,
      scale
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_all(&self.name)?;
    write.write_i32(self.parent)?;
    write.write_i32(self.flags)?;
    for controller in self.bone_controller {
      write.write_i32(controller)?;
    }
    for v in self.value.iter().chain(self.scale.iter()) {
      write.write_f32(*v)?;
    }
    Ok(())
  }

  pub fn name(&self) -> String {
    fixed_string_lossy(&self.name)
  }
}
