use std::f32::consts::PI;

use bevy_math::Vec3;

use crate::math::{angle_quaternion, quaternion_angles, BoundingBox};
use crate::model::{EditableModel, ROTATION_AXIS};

#[derive(Debug, Clone, Copy)]
struct RootPose {
  bone: usize,
  position: Vec3,
  rotation: Vec3
}

/// Root bone poses and the point the whole model turns around.
pub struct RotateSnapshot {
  pivot: Vec3,
  roots: Vec<RootPose>
}

impl RotateSnapshot {
  pub fn capture(model: &EditableModel) -> Self {
    let roots: Vec<RootPose> = model
      .root_bones()
      .map(|bone| RootPose {
        bone,
        position: Vec3::from_array(model.bones[bone].default_position()),
        rotation: Vec3::from_array(model.bones[bone].default_rotation())
      })
      .collect();

    // The root closest to the middle of all roots, so a single root turns in place.
    let pivot = BoundingBox::from_points(roots.iter().map(|root| root.position))
      .and_then(|bounds| {
        let center = bounds.center();
        roots
          .iter()
          .map(|root| root.position)
          .min_by(|a, b| a.distance_squared(center).total_cmp(&b.distance_squared(center)))
      })
      .unwrap_or(Vec3::ZERO);

    Self { pivot, roots }
  }

  pub fn pivot(&self) -> Vec3 {
    self.pivot
  }

  /// Rotates the root bones by `angles` in degrees (roll, pitch, yaw), or restores them
  /// for `None`.
  pub fn apply(&self, model: &mut EditableModel, angles: Option<Vec3>) {
    let rotation = angles.map(|angles| angle_quaternion(angles * (PI / 180.0)));

    for root in &self.roots {
      let Some(bone) = model.bones.get_mut(root.bone) else {
        continue;
      };
      let (position, angles) = match rotation {
        Some(q) => (
          self.pivot + q * (root.position - self.pivot),
          quaternion_angles(q * angle_quaternion(root.rotation))
        ),
        None => (root.position, root.rotation)
      };
      for j in 0..3 {
        bone.axes[j].value = position[j];
        bone.axes[ROTATION_AXIS + j].value = angles[j];
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::f32::consts::FRAC_PI_2;

  use super::*;
  use crate::model::{Bone, BoneAxis};

  fn bone(parent: Option<usize>, position: Vec3) -> Bone {
    let mut axes = [BoneAxis::default(); 6];
    for j in 0..3 {
      axes[j].value = position[j];
    }
    Bone {
      name: String::new(),
      parent,
      flags: 0,
      axes
    }
  }

  fn model() -> EditableModel {
    EditableModel {
      bones: vec![
        bone(None, Vec3::ZERO),
        bone(None, Vec3::new(4.0, 0.0, 0.0)),
        bone(None, Vec3::new(10.0, 0.0, 0.0)),
        bone(Some(2), Vec3::new(1.0, 2.0, 3.0)),
      ],
      ..EditableModel::default()
    }
  }

  #[test]
  fn pivot_is_root_nearest_to_center() {
    assert_eq!(RotateSnapshot::capture(&model()).pivot(), Vec3::new(4.0, 0.0, 0.0));
    assert_eq!(RotateSnapshot::capture(&EditableModel::default()).pivot(), Vec3::ZERO);
  }

  #[test]
  fn rotates_roots_about_pivot() {
    let original = model();
    let mut model = original.clone();
    let snapshot = RotateSnapshot::capture(&model);
    snapshot.apply(&mut model, Some(Vec3::new(0.0, 0.0, 90.0)));

    let moved = Vec3::from_array(model.bones[2].default_position());
    assert!(moved.abs_diff_eq(Vec3::new(4.0, 6.0, 0.0), 1e-4));
    let turned = Vec3::from_array(model.bones[2].default_rotation());
    assert!(turned.abs_diff_eq(Vec3::new(0.0, 0.0, FRAC_PI_2), 1e-4));
    assert_eq!(model.bones[1].default_position(), [4.0, 0.0, 0.0]);
    assert_eq!(model.bones[3], original.bones[3]);

    snapshot.apply(&mut model, None);
    assert_eq!(model, original);
  }
}
