use std::io::{Read, Result as IOResult};

use crate::PrimitiveRead;

/// Maps a mesh's skin reference to a texture index, one row per skin family.
pub struct SkinTable {
  pub families: Vec<Vec<i16>>
}

impl SkinTable {
  pub fn read(read: &mut dyn Read, skin_families_count: i32, skin_references_count: i32) -> IOResult<Self> {
    let families_count = skin_families_count.max(0) as usize;
    let references_count = skin_references_count.max(0) as usize;
    let mut families = Vec::with_capacity(families_count);
    for _ in 0..families_count {
      let mut family = Vec::with_capacity(references_count);
      for _ in 0..references_count {
        family.push(read.read_i16()?);
      }
      families.push(family);
    }
    Ok(Self { families })
  }

  pub fn texture_index(&self, family: usize, skin_ref: usize) -> Option<i16> {
    self.families.get(family)?.get(skin_ref).copied()
  }
}
