use bevy_math::Vec3;
use hlstudio_mdl::ModelFlags;

use super::{Bone, BoneController, BodyPart, Sequence, SubModel, Texture};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
  pub bone: usize,
  pub group: i32,
  pub bb_min: Vec3,
  pub bb_max: Vec3
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
  pub name: String,
  pub attachment_type: i32,
  pub bone: usize,
  pub origin: Vec3,
  pub vectors: [Vec3; 3]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceGroup {
  pub label: String,
  pub name: String
}

/// Addresses one mesh of one sub-model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshLocation {
  pub body_part: usize,
  pub model: usize,
  pub mesh: usize
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditableModel {
  pub name: String,
  pub eye_position: Vec3,
  pub min: Vec3,
  pub max: Vec3,
  pub bb_min: Vec3,
  pub bb_max: Vec3,
  pub flags: ModelFlags,
  pub bones: Vec<Bone>,
  pub bone_controllers: Vec<BoneController>,
  pub hitboxes: Vec<Hitbox>,
  pub sequences: Vec<Sequence>,
  pub sequence_groups: Vec<SequenceGroup>,
  pub attachments: Vec<Attachment>,
  pub body_parts: Vec<BodyPart>,
  pub textures: Vec<Texture>,
  /// `skin_families[family][skin_ref]` is an index into `textures`.
  pub skin_families: Vec<Vec<usize>>,
  /// `transitions[from][to]`, node indices are 1 based in the stored values.
  pub transitions: Vec<Vec<u8>>
}

impl EditableModel {
  pub fn root_bones(&self) -> impl Iterator<Item = usize> + '_ {
    self.bones.iter().enumerate().filter(|(_, b)| b.is_root()).map(|(i, _)| i)
  }

  pub fn find_bone_by_name(&self, name: &str) -> Option<usize> {
    self.bones.iter().position(|b| b.name == name)
  }

  /// Number of distinct composite body values, `None` when they do not fit a body value.
  pub fn bodygroup_count(&self) -> Option<i32> {
    self.body_parts.iter().try_fold(1i32, |count, part| {
      let models = i32::try_from(part.models.len().max(1)).ok()?;
      count.checked_mul(models)
    })
  }

  /// The sub-model of `body_part` selected by the composite body value `body`.
  pub fn model_by_body_part(&self, body: i32, body_part: usize) -> Option<&SubModel> {
    let index = self.body_value_for_group(body, body_part)?;
    self.body_parts[body_part].models.get(index as usize)
  }

  /// Extracts the sub-model index of `body_part` from `body`.
  pub fn body_value_for_group(&self, body: i32, body_part: usize) -> Option<i32> {
    let part = self.body_parts.get(body_part)?;
    if part.models.is_empty() || part.base == 0 {
      return None;
    }
    let index = (body / part.base) % part.models.len() as i32;
    (index >= 0).then_some(index)
  }

  /// Replaces the sub-model index of `body_part` in `body` with `value`. Returns `None`
  /// without touching anything when the part or the value is out of range.
  pub fn calculate_bodygroup(&self, body_part: usize, value: i32, body: i32) -> Option<i32> {
    let part = self.body_parts.get(body_part)?;
    if value < 0 || value >= part.models.len() as i32 {
      return None;
    }
    let current = self.body_value_for_group(body, body_part)?;
    body
      .checked_sub(current.checked_mul(part.base)?)?
      .checked_add(value.checked_mul(part.base)?)
  }

  /// Every mesh that renders with `texture` under at least one skin family. Each mesh is
  /// listed once.
  pub fn compute_mesh_list(&self, texture: usize) -> Vec<MeshLocation> {
    let mut meshes = Vec::new();
    for (body_part, part) in self.body_parts.iter().enumerate() {
      for (model, sub_model) in part.models.iter().enumerate() {
        for (mesh, data) in sub_model.meshes.iter().enumerate() {
          let uses_texture = self
            .skin_families
            .iter()
            .any(|family| family.get(data.skin_ref) == Some(&texture));
          if uses_texture {
            meshes.push(MeshLocation { body_part, model, mesh });
          }
        }
      }
    }
    meshes
  }

  pub fn mesh(&self, location: MeshLocation) -> Option<&super::Mesh> {
    self
      .body_parts
      .get(location.body_part)?
      .models
      .get(location.model)?
      .meshes
      .get(location.mesh)
  }

  pub fn mesh_mut(&mut self, location: MeshLocation) -> Option<&mut super::Mesh> {
    self
      .body_parts
      .get_mut(location.body_part)?
      .models
      .get_mut(location.model)?
      .meshes
      .get_mut(location.mesh)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::Mesh;

  fn sub_model(name: &str, skin_refs: &[usize]) -> SubModel {
    SubModel {
      name: name.to_string(),
      model_type: 0,
      bounding_radius: 0.0,
      meshes: skin_refs
        .iter()
        .map(|skin_ref| Mesh {
          commands: vec![0],
          stored_triangle_count: 0,
          skin_ref: *skin_ref,
          normals_count: 0
        })
        .collect(),
      vertices: Vec::new(),
      normals: Vec::new()
    }
  }

  fn body_part(name: &str, base: i32, models: Vec<SubModel>) -> BodyPart {
    BodyPart {
      name: name.to_string(),
      base,
      models
    }
  }

  fn soldier() -> EditableModel {
    EditableModel {
      body_parts: vec![
        body_part("body", 1, vec![sub_model("body", &[0, 1])]),
        body_part("head", 1, vec![sub_model("helmet", &[2]), sub_model("cap", &[3])]),
        body_part(
          "weapon",
          2,
          vec![sub_model("mp5", &[4]), sub_model("shotgun", &[4, 1]), sub_model("blank", &[])]
        ),
      ],
      skin_families: vec![vec![0, 1, 2, 3, 4], vec![0, 1, 2, 2, 5]],
      ..EditableModel::default()
    }
  }

  #[test]
  fn body_value_selects_models() {
    let model = soldier();
    assert_eq!(model.bodygroup_count(), Some(6));
    assert_eq!(model.model_by_body_part(0, 1).unwrap().name, "helmet");
    assert_eq!(model.model_by_body_part(1, 1).unwrap().name, "cap");
    assert_eq!(model.model_by_body_part(3, 2).unwrap().name, "shotgun");
    assert_eq!(model.model_by_body_part(5, 2).unwrap().name, "blank");
    assert!(model.model_by_body_part(0, 3).is_none());
  }

  #[test]
  fn bodygroup_packing_round_trips() {
    let model = soldier();
    for body in 0..model.bodygroup_count().unwrap() {
      for part in 0..model.body_parts.len() {
        let value = model.body_value_for_group(body, part).unwrap();
        assert_eq!(model.calculate_bodygroup(part, value, body), Some(body));
      }
    }
  }

  #[test]
  fn calculate_bodygroup_replaces_one_part() {
    let model = soldier();
    let body = model.calculate_bodygroup(2, 2, 1).unwrap();
    assert_eq!(body, 5);
    assert_eq!(model.body_value_for_group(body, 1), Some(1));
    assert_eq!(model.body_value_for_group(body, 2), Some(2));

    assert_eq!(model.calculate_bodygroup(2, 3, 1), None);
    assert_eq!(model.calculate_bodygroup(2, -1, 1), None);
    assert_eq!(model.calculate_bodygroup(7, 0, 1), None);
  }

  #[test]
  fn body_values_out_of_range_do_not_overflow() {
    let model = soldier();
    assert_eq!(model.calculate_bodygroup(2, 2, i32::MAX), None);
    assert_eq!(model.calculate_bodygroup(2, 0, i32::MAX), Some(i32::MAX));

    let mut bases = 1;
    let mut parts = Vec::new();
    for i in 0..10 {
      let models = (0..10).map(|m| sub_model(&format!("part{}_{}", i, m), &[])).collect();
      parts.push(body_part("part", bases, models));
      bases = bases.saturating_mul(10);
    }
    let many = EditableModel {
      body_parts: parts,
      ..EditableModel::default()
    };
    assert_eq!(many.bodygroup_count(), None);

    let few = EditableModel {
      body_parts: many.body_parts[..9].to_vec(),
      ..EditableModel::default()
    };
    assert_eq!(few.bodygroup_count(), Some(1_000_000_000));
  }

  #[test]
  fn mesh_list_has_no_duplicates() {
    let model = soldier();
    let helmet_and_cap = model.compute_mesh_list(2);
    assert_eq!(
      helmet_and_cap,
      [
        MeshLocation { body_part: 1, model: 0, mesh: 0 },
        MeshLocation { body_part: 1, model: 1, mesh: 0 }
      ]
    );

    let shared = model.compute_mesh_list(1);
    assert_eq!(shared.len(), 2);
    assert_eq!(shared[1], MeshLocation { body_part: 2, model: 1, mesh: 1 });

    let alternate_only = model.compute_mesh_list(5);
    assert_eq!(alternate_only.len(), 2);
    assert!(model.compute_mesh_list(9).is_empty());
  }
}
