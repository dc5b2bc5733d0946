use crate::model::{EditableModel, MeshLocation};

/// Independent factors for the `s` and `t` coordinates. A missing or unit factor leaves
/// the coordinate untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextureCoordinateScale {
  pub width: Option<f32>,
  pub height: Option<f32>
}

impl TextureCoordinateScale {
  /// Factors that keep coordinates on the same texels after a texture is resized.
  pub fn between(old_size: (i32, i32), new_size: (i32, i32)) -> Self {
    let factor = |old: i32, new: i32| (old != new && old > 0).then(|| new as f32 / old as f32);
    Self {
      width: factor(old_size.0, new_size.0),
      height: factor(old_size.1, new_size.1)
    }
  }
}

fn scale_coordinate(value: i16, factor: Option<f32>) -> i16 {
  match factor {
    Some(factor) if factor != 1.0 => (value as f32 * factor)
      .round()
      .clamp(i16::MIN as f32, i16::MAX as f32) as i16,
    _ => value
  }
}

/// Texture coordinates of every mesh drawn with one texture.
pub struct TextureCoordinateSnapshot {
  meshes: Vec<(MeshLocation, Vec<(i16, i16)>)>
}

impl TextureCoordinateSnapshot {
  pub fn capture(model: &EditableModel, texture: usize) -> Self {
    let meshes = model
      .compute_mesh_list(texture)
      .into_iter()
      .filter_map(|location| {
        let mesh = model.mesh(location)?;
        let coordinates = mesh
          .commands()
          .flat_map(|run| run.vertices)
          .map(|vertex| (vertex.s, vertex.t))
          .collect();
        Some((location, coordinates))
      })
      .collect();
    Self { meshes }
  }

  /// Rescales the captured coordinates, or restores them for `None`.
  pub fn apply(&self, model: &mut EditableModel, scale: Option<TextureCoordinateScale>) {
    let scale = scale.unwrap_or_default();
    for (location, coordinates) in &self.meshes {
      let Some(mesh) = model.mesh_mut(*location) else {
        continue;
      };
      let mut captured = coordinates.iter();
      mesh.for_each_texture_coordinate(|s, t| {
        if let Some((old_s, old_t)) = captured.next() {
          *s = scale_coordinate(*old_s, scale.width);
          *t = scale_coordinate(*old_t, scale.height);
        }
      });
    }
  }
}
