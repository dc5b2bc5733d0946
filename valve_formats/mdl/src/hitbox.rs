use std::io::{Read, Result as IOResult, Write};

use bevy_math::Vec3;

use crate::read_util::{read_vec3, write_vec3};
use crate::{PrimitiveRead, PrimitiveWrite};

pub struct Hitbox {
  pub bone: i32,
  pub group: i32,
  pub bb_min: Vec3,
  pub bb_max: Vec3
}

impl Hitbox {
  pub const SIZE: usize = 32;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let bone = read.read_i32()?;
    let group = read.read_i32()?;
    let bb_min = read_vec3(read)?;
    let bb_max = read_vec3(read)?;

    Ok(Self {
      bone,
      group,
      bb_min,
      bb_max
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_i32(self.bone)?;
    write.write_i32(self.group)?;
    write_vec3(write, self.bb_min)?;
    write_vec3(write, self.bb_max)
  }
}
