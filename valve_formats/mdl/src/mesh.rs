use std::io::{Read, Result as IOResult, Write};

use crate::{PrimitiveRead, PrimitiveWrite};

pub struct Mesh {
  pub triangles_count: i32,
  /// Offset of the triangle command stream: runs of `i16` count (positive for strips,
  /// negative for fans) each followed by `|count|` vertex, normal, s, t quadruples,
  /// terminated by a zero count.
  pub triangle_offset: i32,
  pub skin_ref: i32,
  pub normals_count: i32,
  pub normal_offset: i32
}

impl Mesh {
  pub const SIZE: usize = 20;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let triangles_count = read.read_i32()?;
    let triangle_offset = read.read_i32()?;
    let skin_ref = read.read_i32()?;
    let normals_count = read.read_i32()?;
    let normal_offset = read.read_i32()?;
    Ok(Self {
      triangles_count,
      triangle_offset,
      skin_ref,
      normals_count,
      normal_offset
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_i32(self.triangles_count)?;
    write.write_i32(self.triangle_offset)?;
    write.write_i32(self.skin_ref)?;
    write.write_i32(self.normals_count)?;
    write.write_i32(self.normal_offset)
  }
}
