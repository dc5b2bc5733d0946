use bevy_math::Vec3;

use crate::model::EditableModel;

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub struct ScaleFlags: u32 {
    const MESHES = 1;
    const HITBOXES = 1 << 1;
    const SEQUENCE_BBOXES = 1 << 2;
    const BONES = 1 << 3;
    const EYE_POSITION = 1 << 4;
    const ATTACHMENTS = 1 << 5;
  }
}

impl Default for ScaleFlags {
  fn default() -> Self {
    Self::all()
  }
}

/// Position value and scale of the three translation axes of a bone.
type BonePosition = ([f32; 3], [f32; 3]);

pub struct ScaleSnapshot {
  flags: ScaleFlags,
  vertices: Vec<Vec3>,
  hitboxes: Vec<(Vec3, Vec3)>,
  sequence_bounds: Vec<(Vec3, Vec3)>,
  bones: Vec<BonePosition>,
  eye_position: Vec3,
  attachments: Vec<Vec3>
}

impl ScaleSnapshot {
  pub fn capture(model: &EditableModel, flags: ScaleFlags) -> Self {
    let vertices = if flags.contains(ScaleFlags::MESHES) {
      model
        .body_parts
        .iter()
        .flat_map(|part| &part.models)
        .flat_map(|sub_model| &sub_model.vertices)
        .map(|vertex| vertex.position)
        .collect()
    } else {
      Vec::new()
    };

    let hitboxes = if flags.contains(ScaleFlags::HITBOXES) {
      model.hitboxes.iter().map(|h| (h.bb_min, h.bb_max)).collect()
    } else {
      Vec::new()
    };

    let sequence_bounds = if flags.contains(ScaleFlags::SEQUENCE_BBOXES) {
      model.sequences.iter().map(|s| (s.bb_min, s.bb_max)).collect()
    } else {
      Vec::new()
    };

    let bones = if flags.contains(ScaleFlags::BONES) {
      model
        .bones
        .iter()
        .map(|bone| {
          let axes = &bone.axes[..3];
          (
            [axes[0].value, axes[1].value, axes[2].value],
            [axes[0].scale, axes[1].scale, axes[2].scale]
          )
        })
        .collect()
    } else {
      Vec::new()
    };

    let attachments = if flags.contains(ScaleFlags::ATTACHMENTS) {
      model.attachments.iter().map(|a| a.origin).collect()
    } else {
      Vec::new()
    };

    Self {
      flags,
      vertices,
      hitboxes,
      sequence_bounds,
      bones,
      eye_position: model.eye_position,
      attachments
    }
  }

  /// Scales every captured quantity by `scale`, or restores it for `None`.
  pub fn apply(&self, model: &mut EditableModel, scale: Option<f32>) {
    let scaled = |value: Vec3| scale.map_or(value, |s| value * s);
    let scaled_f32 = |value: f32| scale.map_or(value, |s| value * s);

    let vertices = model
      .body_parts
      .iter_mut()
      .flat_map(|part| &mut part.models)
      .flat_map(|sub_model| &mut sub_model.vertices);
    for (vertex, position) in vertices.zip(&self.vertices) {
      vertex.position = scaled(*position);
    }

    for (hitbox, (min, max)) in model.hitboxes.iter_mut().zip(&self.hitboxes) {
      hitbox.bb_min = scaled(*min);
      hitbox.bb_max = scaled(*max);
    }

    for (sequence, (min, max)) in model.sequences.iter_mut().zip(&self.sequence_bounds) {
      sequence.bb_min = scaled(*min);
      sequence.bb_max = scaled(*max);
    }

    for (bone, (values, scales)) in model.bones.iter_mut().zip(&self.bones) {
      for (j, axis) in bone.axes[..3].iter_mut().enumerate() {
        axis.value = scaled_f32(values[j]);
        axis.scale = scaled_f32(scales[j]);
      }
    }

    if self.flags.contains(ScaleFlags::EYE_POSITION) {
      model.eye_position = scaled(self.eye_position);
    }

    for (attachment, origin) in model.attachments.iter_mut().zip(&self.attachments) {
      attachment.origin = scaled(*origin);
    }
  }
}
