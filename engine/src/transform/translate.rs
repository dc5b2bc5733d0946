use bevy_math::Vec3;

use crate::model::EditableModel;

/// Root bone positions before a move.
pub struct TranslateSnapshot {
  roots: Vec<(usize, Vec3)>
}

impl TranslateSnapshot {
  pub fn capture(model: &EditableModel) -> Self {
    let roots = model
      .root_bones()
      .map(|bone| (bone, Vec3::from_array(model.bones[bone].default_position())))
      .collect();
    Self { roots }
  }

  /// Moves every root bone by `offset`, or restores the captured positions for `None`.
  pub fn apply(&self, model: &mut EditableModel, offset: Option<Vec3>) {
    for (index, position) in &self.roots {
      let Some(bone) = model.bones.get_mut(*index) else {
        continue;
      };
      let position = offset.map_or(*position, |offset| *position + offset);
      for (axis, value) in bone.axes[..3].iter_mut().zip(position.to_array()) {
        axis.value = value;
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{Bone, BoneAxis};

  #[test]
  fn moves_only_roots() {
    let bone = |parent| {
      let mut axes = [BoneAxis::default(); 6];
      axes[0].value = 0.5;
      axes[2].value = 36.0;
      Bone {
        name: String::new(),
        parent,
        flags: 0,
        axes
      }
    };
    let original = EditableModel {
      bones: vec![bone(None), bone(Some(0))],
      ..EditableModel::default()
    };
    let mut model = original.clone();
    let snapshot = TranslateSnapshot::capture(&model);

    snapshot.apply(&mut model, Some(Vec3::new(1.0, 2.0, -6.0)));
    assert_eq!(model.bones[0].default_position(), [1.5, 2.0, 30.0]);
    assert_eq!(model.bones[1], original.bones[1]);

    snapshot.apply(&mut model, Some(Vec3::new(0.0, 0.0, 4.0)));
    assert_eq!(model.bones[0].default_position(), [0.5, 0.0, 40.0]);

    snapshot.apply(&mut model, None);
    assert_eq!(model, original);
  }
}
