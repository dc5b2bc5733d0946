use std::io::{Read, Result as IOResult, Write};

use bevy_math::Vec3;

use crate::read_util::{fixed_string_lossy, read_vec3, write_vec3};
use crate::{PrimitiveRead, PrimitiveWrite, RawDataRead};

/// "IDST" in little endian.
pub const STUDIO_HEADER_ID: i32 = 0x54534449;
/// "IDSQ" in little endian.
pub const SEQUENCE_HEADER_ID: i32 = 0x51534449;
pub const STUDIO_VERSION: i32 = 10;

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
  pub struct ModelFlags: i32 {
    const ROCKET = 1;
    const GRENADE = 1 << 1;
    const GIB = 1 << 2;
    const ROTATE = 1 << 3;
    const TRACER = 1 << 4;
    const ZOMGIB = 1 << 5;
    const TRACER2 = 1 << 6;
    const TRACER3 = 1 << 7;
    const NOSHADELIGHT = 1 << 8;
    const HITBOXCOLLISIONS = 1 << 9;
    const FORCESKYLIGHT = 1 << 10;
  }
}

pub struct Header {
  pub id: i32,
  pub version: i32,
  pub name: [u8; 64],
  pub length: i32,

  pub eye_position: Vec3,
  pub min: Vec3,
  pub max: Vec3,
  pub bb_min: Vec3,
  pub bb_max: Vec3,

  pub flags: i32,

  pub bone_count: i32,
  pub bone_offset: i32,

  pub bone_controller_count: i32,
  pub bone_controller_offset: i32,

  pub hitbox_count: i32,
  pub hitbox_offset: i32,

  pub sequence_count: i32,
  pub sequence_offset: i32,

  pub sequence_group_count: i32,
  pub sequence_group_offset: i32,

  pub texture_count: i32,
  pub texture_offset: i32,
  pub texture_data_offset: i32,

  pub skin_reference_count: i32,
  pub skin_family_count: i32,
  pub skin_offset: i32,

  pub body_part_count: i32,
  pub body_part_offset: i32,

  pub attachment_count: i32,
  pub attachment_offset: i32,

  pub sound_table: i32,
  pub sound_offset: i32,
  pub sound_groups: i32,
  pub sound_group_offset: i32,

  pub transition_count: i32,
  pub transition_offset: i32
}

impl Header {
  pub const SIZE: usize = 244;
  pub const NAME_OFFSET: usize = 8;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let id = read.read_i32()?;
    let version = read.read_i32()?;
    let name = read.read_fixed::<64>()?;
    let length = read.read_i32()?;

    let eye_position = read_vec3(read)?;
    let min = read_vec3(read)?;
    let max = read_vec3(read)?;
    let bb_min = read_vec3(read)?;
    let bb_max = read_vec3(read)?;

    let flags = read.read_i32()?;

    let bone_count = read.read_i32()?;
    let bone_offset = read.read_i32()?;

    let bone_controller_count = read.read_i32()?;
    let bone_controller_offset = read.read_i32()?;

    let hitbox_count = read.read_i32()?;
    let hitbox_offset = read.read_i32()?;

    let sequence_count = read.read_i32()?;
    let sequence_offset = read.read_i32()?;

    let sequence_group_count = read.read_i32()?;
    let sequence_group_offset = read.read_i32()?;

    let texture_count = read.read_i32()?;
    let texture_offset = read.read_i32()?;
    let texture_data_offset = read.read_i32()?;

    let skin_reference_count = read.read_i32()?;
    let skin_family_count = read.read_i32()?;
    let skin_offset = read.read_i32()?;

    let body_part_count = read.read_i32()?;
    let body_part_offset = read.read_i32()?;

    let attachment_count = read.read_i32()?;
    let attachment_offset = read.read_i32()?;

    let sound_table = read.read_i32()?;
    let sound_offset = read.read_i32()?;
    let sound_groups = read.read_i32()?;
    let sound_group_offset = read.read_i32()?;

    let transition_count = read.read_i32()?;
    let transition_offset = read.read_i32()?;

    Ok(Self {
      id,
      version,
      name,
      length,
      eye_position,
      min,
      max,
      bb_min,
      bb_max,
      flags,
      bone_count,
      bone_offset,
      bone_controller_count,
      bone_controller_offset,
      hitbox_count,
      hitbox_offset,
      sequence_count,
      sequence_offset,
      sequence_group_count,
      sequence_group_offset,
      texture_count,
      texture_offset,
      texture_data_offset,
      skin_reference_count,
      skin_family_count,
      skin_offset,
      body_part_count,
      body_part_offset,
      attachment_count,
      attachment_offset,
      sound_table,
      sound_offset,
      sound_groups,
      sound_group_offset,
      transition_count,
      transition_offset
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_i32(self.id)?;
    write.write_i32(self.version)?;
    write.write_all(&self.name)?;
    write.write_i32(self.length)?;
    for v in [self.eye_position, self.min, self.max, self.bb_min, self.bb_max] {
      write_vec3(write, v)?;
    }
    for v in [
      self.flags,
      self.bone_count, self.bone_offset,
      self.bone_controller_count, self.bone_controller_offset,
      self.hitbox_count, self.hitbox_offset,
      self.sequence_count, self.sequence_offset,
      self.sequence_group_count, self.sequence_group_offset,
      self.texture_count, self.texture_offset, self.texture_data_offset,
      self.skin_reference_count, self.skin_family_count, self.skin_offset,
      self.body_part_count, self.body_part_offset,
      self.attachment_count, self.attachment_offset,
      self.sound_table, self.sound_offset, self.sound_groups, self.sound_group_offset,
      self.transition_count, self.transition_offset
    ] {
      write.write_i32(v)?;
    }
    Ok(())
  }

  pub fn name(&self) -> String {
    fixed_string_lossy(&self.name)
  }

  pub fn model_flags(&self) -> ModelFlags {
    ModelFlags::from_bits_retain(self.flags)
  }
}

/// Header of a `NN` sequence group file. Shares the layout of the first four
/// fields of [`Header`].
pub struct SequenceHeader {
  pub id: i32,
  pub version: i32,
  pub name: [u8; 64],
  pub length: i32
}

impl SequenceHeader {
  pub const SIZE: usize = 76;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let id = read.read_i32()?;
    let version = read.read_i32()?;
    let name = read.read_fixed::<64>()?;
    let length = read.read_i32()?;
    Ok(Self {
      id,
      version,
      name,
      length
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_i32(self.id)?;
    write.write_i32(self.version)?;
    write.write_all(&self.name)?;
    write.write_i32(self.length)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;
  use crate::to_fixed_string;

  #[test]
  fn header_is_244_bytes() {
    let header = Header {
      id: STUDIO_HEADER_ID,
      version: STUDIO_VERSION,
      name: to_fixed_string("barney.mdl"),
      length: 1234,
      eye_position: Vec3::new(0.0, 0.0, 64.0),
      min: Vec3::ZERO,
      max: Vec3::ZERO,
      bb_min: Vec3::splat(-16.0),
      bb_max: Vec3::splat(16.0),
      flags: ModelFlags::NOSHADELIGHT.bits(),
      bone_count: 3,
      bone_offset: 244,
      bone_controller_count: 0,
      bone_controller_offset: 0,
      hitbox_count: 0,
      hitbox_offset: 0,
      sequence_count: 0,
      sequence_offset: 0,
      sequence_group_count: 1,
      sequence_group_offset: 0,
      texture_count: 0,
      texture_offset: 0,
      texture_data_offset: 0,
      skin_reference_count: 0,
      skin_family_count: 0,
      skin_offset: 0,
      body_part_count: 0,
      body_part_offset: 0,
      attachment_count: 0,
      attachment_offset: 0,
      sound_table: 0,
      sound_offset: 0,
      sound_groups: 0,
      sound_group_offset: 0,
      transition_count: 0,
      transition_offset: 0
    };
    let mut data = Vec::new();
    header.write(&mut data).unwrap();
    assert_eq!(data.len(), Header::SIZE);
    assert_eq!(&data[0..4], b"IDST");

    let read = Header::read(&mut Cursor::new(&data)).unwrap();
    assert_eq!(read.name(), "barney.mdl");
    assert_eq!(read.bone_offset, 244);
    assert_eq!(read.model_flags(), ModelFlags::NOSHADELIGHT);
    assert_eq!(read.eye_position.z, 64.0);
  }
}
