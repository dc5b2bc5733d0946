use std::io::{Read, Result as IOResult, Write};

use bevy_math::Vec3;

use crate::read_util::{fixed_string_lossy, read_vec3, write_vec3};
use crate::{PrimitiveRead, PrimitiveWrite, RawDataRead};

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
  pub struct SequenceFlags: i32 {
    const LOOPING = 1;
  }
}

pub struct SequenceDesc {
  pub label: [u8; 32],

  pub fps: f32,
  pub flags: i32,

  pub activity: i32,
  pub activity_weight: i32,

  pub events_count: i32,
  pub event_offset: i32,

  pub frames_count: i32,

  pub pivots_count: i32,
  pub pivot_offset: i32,

  pub motion_type: i32,
  pub motion_bone: i32,
  pub linear_movement: Vec3,
  pub auto_move_pos_index: i32,
  pub auto_move_angle_index: i32,

  pub bb_min: Vec3,
  pub bb_max: Vec3,

  pub blends_count: i32,
  /// Offset of the first blend's per-bone animation offsets, relative to the
  /// start of the sequence group's data.
  pub anim_offset: i32,

  pub blend_type: [i32; 2],
  pub blend_start: [f32; 2],
  pub blend_end: [f32; 2],
  pub blend_parent: i32,

  pub sequence_group: i32,

  pub entry_node: i32,
  pub exit_node: i32,
  pub node_flags: i32,

  pub next_sequence: i32
}

impl SequenceDesc {
  pub const SIZE: usize = 176;

  pub fn read(read: &mut dyn Read) -> IOResult<Self> {
    let label = read.read_fixed::<32>()?;

    let fps = read.read_f32()?;
    let flags = read.read_i32()?;

    let activity = read.read_i32()?;
    let activity_weight = read.read_i32()?;

    let events_count = read.read_i32()?;
    let event_offset = read.read_i32()?;

    let frames_count = read.read_i32()?;

    let pivots_count = read.read_i32()?;
    let pivot_offset = read.read_i32()?;

    let motion_type = read.read_i32()?;
    let motion_bone = read.read_i32()?;
    let linear_movement = read_vec3(read)?;
    let auto_move_pos_index = read.read_i32()?;
    let auto_move_angle_index = read.read_i32()?;

    let bb_min = read_vec3(read)?;
    let bb_max = read_vec3(read)?;

    let blends_count = read.read_i32()?;
    let anim_offset = read.read_i32()?;

    let blend_type = [read.read_i32()?, read.read_i32()?];
    let blend_start = [read.read_f32()?, read.read_f32()?];
    let blend_end = [read.read_f32()?, read.read_f32()?];
    let blend_parent = read.read_i32()?;

    let sequence_group = read.read_i32()?;

    let entry_node = read.read_i32()?;
    let exit_node = read.read_i32()?;
    let node_flags = read.read_i32()?;

    let next_sequence = read.read_i32()?;

    Ok(Self {
      label,
      fps,
      flags,
      activity,
      activity_weight,
      events_count,
      event_offset,
      frames_count,
      pivots_count,
      pivot_offset,
      motion_type,
      motion_bone,
      linear_movement,
      auto_move_pos_index,
      auto_move_angle_index,
      bb_min,
      bb_max,
      blends_count,
      anim_offset,
      blend_type,
      blend_start,
      blend_end,
      blend_parent,
      sequence_group,
      entry_node,
      exit_node,
      node_flags,
      next_sequence
    })
  }

  pub fn write(&self, write: &mut dyn Write) -> IOResult<()> {
    write.write_all(&self.label)?;
    write.write_f32(self.fps)?;
    for v in [
      self.flags,
      self.activity, self.activity_weight,
      self.events_count, self.event_offset,
      self.frames_count,
      self.pivots_count, self.pivot_offset,
      self.motion_type, self.motion_bone
    ] {
      write.write_i32(v)?;
    }
    write_vec3(write, self.linear_movement)?;
    write.write_i32(self.auto_move_pos_index)?;
    write.write_i32(self.auto_move_angle_index)?;
    write_vec3(write, self.bb_min)?;
    write_vec3(write, self.bb_max)?;
    write.write_i32(self.blends_count)?;
    write.write_i32(self.anim_offset)?;
    for v in self.blend_type {
      write.write_i32(v)?;
    }
    for v in self.blend_start.iter().chain(self.blend_end.iter()) {
      write.write_f32(*v)?;
    }
    for v in [
      self.blend_parent,
      self.sequence_group,
      self.entry_node, self.exit_node, self.node_flags,
      self.next_sequence
    ] {
      write.write_i32(v)?;
    }
    Ok(())
  }

  pub fn label(&self) -> String {
    fixed_string_lossy(&self.label)
  }

  pub fn sequence_flags(&self) -> SequenceFlags {
    SequenceFlags::from_bits_retain(self.flags)
  }
}
