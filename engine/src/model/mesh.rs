use bevy_math::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
  pub bone: usize,
  pub position: Vec3
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
  Strip,
  Fan
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleVertex {
  pub vertex: i16,
  pub normal: i16,
  pub s: i16,
  pub t: i16
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriangleRun {
  pub kind: RunKind,
  pub vertices: Vec<TriangleVertex>
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
  /// Triangle command stream including the terminating zero.
  pub commands: Vec<i16>,
  pub stored_triangle_count: i32,
  pub skin_ref: usize,
  pub normals_count: i32
}

impl Mesh {
  pub fn commands(&self) -> TriangleCommands<'_> {
    TriangleCommands {
      commands: &self.commands,
      position: 0
    }
  }

  pub fn triangle_count(&self) -> usize {
    self.commands().map(|run| run.vertices.len().saturating_sub(2)).sum()
  }

  /// Calls `f` with the `s` and `t` values of every vertex in the command stream.
  pub fn for_each_texture_coordinate(&mut self, mut f: impl FnMut(&mut i16, &mut i16)) {
    let mut i = 0;
    while let Some(count) = self.commands.get(i).copied() {
      if count == 0 {
        break;
      }
      i += 1;
      for _ in 0..count.unsigned_abs() {
        match self.commands.get_mut(i..i + 4) {
          Some([_, _, s, t]) => f(s, t),
          _ => return
        }
        i += 4;
      }
    }
  }
}

/// Iterator over the strips and fans of a mesh.
pub struct TriangleCommands<'a> {
  commands: &'a [i16],
  position: usize
}

impl Iterator for TriangleCommands<'_> {
  type Item = TriangleRun;

  fn next(&mut self) -> Option<Self::Item> {
    let count = *self.commands.get(self.position)?;
    if count == 0 {
      return None;
    }
    let kind = if count < 0 { RunKind::Fan } else { RunKind::Strip };
    let start = self.position + 1;
    let end = start + count.unsigned_abs() as usize * 4;
    let data = self.commands.get(start..end)?;
    self.position = end;
    let vertices = data
      .chunks_exact(4)
      .map(|v| TriangleVertex {
        vertex: v[0],
        normal: v[1],
        s: v[2],
        t: v[3]
      })
      .collect();
    Some(TriangleRun { kind, vertices })
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubModel {
  pub name: String,
  pub model_type: i32,
  pub bounding_radius: f32,
  pub meshes: Vec<Mesh>,
  pub vertices: Vec<Vertex>,
  pub normals: Vec<Vertex>
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyPart {
  pub name: String,
  /// Divisor that extracts this part's model index from a composite body value.
  pub base: i32,
  pub models: Vec<SubModel>
}
