use std::io::{Read, Result as IOResult, Write};

use bevy_math::Vec3;

use crate::read_util::{fixed_string_lossy, read_vec3, write_vec3};
use crate::{PrimitiveRead, PrimitiveWrite, RawDataRead};

pub struct Attachment {
  pub name: [u8; 32],
  pub attachment_type: i32,
  pub bone: i32,
  pub origin: Vec3,
  pub vectors: [Vec3; 3]
}

impl Attachment {
  pub const SIZE: usize = 88;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let name = read.read_fixed::<32>()?;
    let attachment_type = read.read_i32()?;
    let bone = read.read_i32()?;
    let origin = read_vec3(read)?;
    let vectors = [read_vec3(read)?, read_vec3(read)?, read_vec3(read)?];
    Ok(Self {
      name,
      attachment_type,
      bone,
      origin,
      vectors
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_all(&self.name)?;
    write.write_i32(self.attachment_type)?;
    write.write_i32(self.bone)?;
    write_vec3(write, self.origin)?;
    for v in self.vectors {
      write_vec3(write, v)?;
    }
    Ok(())
  }

  pub fn name(&self) -> String {
    fixed_string_lossy(&self.name)
  }
}
