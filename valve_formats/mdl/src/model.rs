use std::io::{Read, Result as IOResult, Write};

use crate::read_util::fixed_string_lossy;
use crate::{PrimitiveRead, PrimitiveWrite, RawDataRead};

pub struct Model {
  pub name: [u8; 64],
  pub model_type: i32,
  pub bounding_radius: f32,

  pub meshes_count: i32,
  pub mesh_offset: i32,

  pub vertices_count: i32,
  /// One bone index byte per vertex.
  pub vertex_info_offset: i32,
  pub vertex_offset: i32,

  pub normals_count: i32,
  /// One bone index byte per normal.
  pub normal_info_offset: i32,
  pub normal_offset: i32,

  pub groups_count: i32,
  pub group_offset: i32
}

impl Model {
  pub const SIZE: usize = 112;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let name = read.read_fixed::<64>()?;
    let model_type = read.read_i32()?;
    let bounding_radius = read.read_f32()?;

    let meshes_count = read.read_i32()?;
    let mesh_offset = read.read_i32()?;

    let vertices_count = read.read_i32()?;
    let vertex_info_offset = read.read_i32()?;
    let vertex_offset = read.read_i32()?;

    let normals_count = read.read_i32()?;
    let normal_info_offset = read.read_i32()?;
    let normal_offset = read.read_i32()?;

    let groups_count = read.read_i32()?;
    let group_offset = read.read_i32()?;

    Ok(Self {
      name,
      model_type,
      bounding_radius,
      meshes_count,
      mesh_offset,
      vertices_count,
      vertex_info_offset,
      vertex_offset,
      normals_count,
      normal_info_offset,
      normal_offset,
      groups_count,
      group_offset
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_all(&self.name)?;
    write.write_i32(self.model_type)?;
    write.write_f32(self.bounding_radius)?;
    for v in [
      self.meshes_count, self.mesh_offset,
      self.vertices_count, self.vertex_info_offset, self.vertex_offset,
      self.normals_count, self.normal_info_offset, self.normal_offset,
      self.groups_count, self.group_offset
    ] {
      write.write_i32(v)?;
    }
    Ok(())
  }

  pub fn name(&self) -> String {
    fixed_string_lossy(&self.name)
  }
}
