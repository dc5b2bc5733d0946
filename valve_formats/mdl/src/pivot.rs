use std::io::{Read, Result as IOResult, Write};

use bevy_math::Vec3;

use crate::read_util::{read_vec3, write_vec3};
use crate::{PrimitiveRead, PrimitiveWrite};

pub struct Pivot {
  pub origin: Vec3,
  pub start: i32,
  pub end: i32
}

impl Pivot {
  pub const SIZE: usize = 20;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let origin = read_vec3(read)?;
    let start = read.read_i32()?;
    let end = read.read_i32()?;
    Ok(Self {
      origin,
      start,
      end
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write_vec3(write, self.origin)?;
    write.write_i32(self.start)?;
    write.write_i32(self.end)
  }
}
