use std::io::{Read, Result as IOResult, Write};

use bevy_math::Vec3;

pub use io_util::{
  fixed_string_lossy, to_fixed_string, PrimitiveRead, PrimitiveWrite, RawDataRead, ReadEntireSeekableFile
};

pub(crate) fn read_vec3(read: &mut dyn Read) -> IOResult<Vec3> {
  Ok(Vec3::new(read.read_f32()?, read.read_f32()?, read.read_f32()?))
}

pub(crate) fn write_vec3(write: &mut dyn Write, value: Vec3) -> IOResult<()> {
  write.write_f32(value.x)?;
  write.write_f32(value.y)?;
  write.write_f32(value.z)
}
