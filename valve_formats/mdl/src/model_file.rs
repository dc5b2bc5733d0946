use std::io::{Cursor, Read, Result as IOResult};
use std::path::Path;

use bevy_math::Vec3;

use crate::read_util::read_vec3;
use crate::{
  AnimOffsets, AnimValue, AssetError, Attachment, BodyPart, Bone, BoneController, Event, Header, Hitbox, Mesh, Model,
  Pivot, PrimitiveRead, SequenceDesc, SequenceGroup, SkinTable, Texture, PALETTE_SIZE
};

/// Bounds checked view of one loaded file. Every read validates the offset against the
/// buffer and fails with [`AssetError::Truncated`] instead of trusting the declared offsets.
#[derive(Clone, Copy)]
pub struct StudioBuffer<'a> {
  path: &'a Path,
  data: &'a [u8]
}

impl<'a> StudioBuffer<'a> {
  pub fn new(path: &'a Path, data: &'a [u8]) -> Self {
    Self { path, data }
  }

  pub fn path(&self) -> &'a Path {
    self.path
  }

  pub fn data(&self) -> &'a [u8] {
    self.data
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  fn cursor(&self, offset: i64, what: &'static str) -> Result<Cursor<&'a [u8]>, AssetError> {
    if offset < 0 || offset as u64 > self.data.len() as u64 {
      return Err(AssetError::truncated(self.path, what, offset));
    }
    let mut cursor = Cursor::new(self.data);
    cursor.set_position(offset as u64);
    Ok(cursor)
  }

  /// Reads `count` consecutive structs starting at `offset`.
  pub fn table<T>(
    &self,
    offset: i32,
    count: i32,
    what: &'static str,
    read: fn(&mut dyn Read) -> IOResult<T>
  ) -> Result<Vec<T>, AssetError> {
    if count < 0 {
      return Err(AssetError::invalid_data(self.path, format!("negative {} count {}", what, count)));
    }
    if count == 0 {
      return Ok(Vec::new());
    }
    let mut cursor = self.cursor(offset as i64, what)?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
      let item = read(&mut cursor).map_err(|_| AssetError::truncated(self.path, what, offset as i64))?;
      items.push(item);
    }
    Ok(items)
  }

  pub fn bytes(&self, offset: i32, len: usize, what: &'static str) -> Result<&'a [u8], AssetError> {
    if offset < 0 {
      return Err(AssetError::truncated(self.path, what, offset as i64));
    }
    let start = offset as usize;
    start
      .checked_add(len)
      .and_then(|end| self.data.get(start..end))
      .ok_or_else(|| AssetError::truncated(self.path, what, offset as i64))
  }

  pub fn vectors(&self, offset: i32, count: i32, what: &'static str) -> Result<Vec<Vec3>, AssetError> {
    self.table(offset, count, what, read_vec3)
  }

  /// Reads a zero terminated triangle command stream. The terminator is included.
  pub fn triangle_commands(&self, mesh: &Mesh) -> Result<Vec<i16>, AssetError> {
    const WHAT: &str = "triangle commands";
    let mut cursor = self.cursor(mesh.triangle_offset as i64, WHAT)?;
    let truncated = |_| AssetError::truncated(self.path, WHAT, mesh.triangle_offset as i64);
    let mut commands = Vec::new();
    loop {
      let count = cursor.read_i16().map_err(truncated)?;
      commands.push(count);
      if count == 0 {
        break;
      }
      for _ in 0..(count.unsigned_abs() as usize * 4) {
        commands.push(cursor.read_i16().map_err(truncated)?);
      }
    }
    Ok(commands)
  }

  /// Per bone animation offsets of one blend. `anim_offset` points at the first blend.
  pub fn anim_offsets(&self, anim_offset: i32, blend: usize, bone_count: usize) -> Result<Vec<AnimOffsets>, AssetError> {
    let offset = anim_offset as i64 + (blend * bone_count * AnimOffsets::SIZE) as i64;
    if offset > i32::MAX as i64 {
      return Err(AssetError::truncated(self.path, "animation offsets", offset));
    }
    self.table(offset as i32, bone_count as i32, "animation offsets", AnimOffsets::read)
  }

  /// Reads the spans of one axis starting at `offset`, until `frames_count` frames are covered.
  pub fn anim_values(&self, offset: i64, frames_count: i32) -> Result<Vec<AnimValue>, AssetError> {
    const WHAT: &str = "animation values";
    let mut cursor = self.cursor(offset, WHAT)?;
    let truncated = |_| AssetError::truncated(self.path, WHAT, offset);
    let mut values = Vec::new();
    let mut frames = 0i32;
    while frames < frames_count {
      let header = AnimValue::read(&mut cursor).map_err(truncated)?;
      if header.total() == 0 {
        return Err(AssetError::invalid_data(
          self.path,
          format!("animation span at offset {} covers zero frames", offset)
        ));
      }
      values.push(header);
      for _ in 0..header.valid() {
        values.push(AnimValue::read(&mut cursor).map_err(truncated)?);
      }
      frames += header.total() as i32;
    }
    Ok(values)
  }
}

/// A main (or texture) header file with its tables.
pub struct StudioFile<'a> {
  header: Header,
  buffer: StudioBuffer<'a>
}

impl<'a> StudioFile<'a> {
  pub fn read(path: &'a Path, data: &'a [u8]) -> Result<Self, AssetError> {
    let buffer = StudioBuffer::new(path, data);
    let mut cursor = buffer.cursor(0, "header")?;
    let header = Header::read(&mut cursor).map_err(|_| AssetError::truncated(path, "header", 0))?;
    Ok(Self { header, buffer })
  }

  pub fn header(&self) -> &Header {
    &self.header
  }

  pub fn buffer(&self) -> StudioBuffer<'a> {
    self.buffer
  }

  pub fn path(&self) -> &'a Path {
    self.buffer.path
  }

  pub fn bones(&self) -> Result<Vec<Bone>, AssetError> {
    self.buffer.table(self.header.bone_offset, self.header.bone_count, "bones", Bone::read)
  }

  pub fn bone_controllers(&self) -> Result<Vec<BoneController>, AssetError> {
    self.buffer.table(
      self.header.bone_controller_offset,
      self.header.bone_controller_count,
      "bone controllers",
      BoneController::read
    )
  }

  pub fn hitboxes(&self) -> Result<Vec<Hitbox>, AssetError> {
    self.buffer.table(self.header.hitbox_offset, self.header.hitbox_count, "hitboxes", Hitbox::read)
  }

  pub fn sequences(&self) -> Result<Vec<SequenceDesc>, AssetError> {
    self.buffer.table(self.header.sequence_offset, self.header.sequence_count, "sequences", SequenceDesc::read)
  }

  pub fn sequence_groups(&self) -> Result<Vec<SequenceGroup>, AssetError> {
    self.buffer.table(
      self.header.sequence_group_offset,
      self.header.sequence_group_count,
      "sequence groups",
      SequenceGroup::read
    )
  }

  pub fn events(&self, sequence: &SequenceDesc) -> Result<Vec<Event>, AssetError> {
    self.buffer.table(sequence.event_offset, sequence.events_count, "events", Event::read)
  }

  pub fn pivots(&self, sequence: &SequenceDesc) -> Result<Vec<Pivot>, AssetError> {
    self.buffer.table(sequence.pivot_offset, sequence.pivots_count, "pivots", Pivot::read)
  }

  pub fn attachments(&self) -> Result<Vec<Attachment>, AssetError> {
    self.buffer.table(
      self.header.attachment_offset,
      self.header.attachment_count,
      "attachments",
      Attachment::read
    )
  }

  pub fn body_parts(&self) -> Result<Vec<BodyPart>, AssetError> {
    self.buffer.table(self.header.body_part_offset, self.header.body_part_count, "body parts", BodyPart::read)
  }

  pub fn models(&self, body_part: &BodyPart) -> Result<Vec<Model>, AssetError> {
    self.buffer.table(body_part.model_offset, body_part.models_count, "models", Model::read)
  }

  pub fn meshes(&self, model: &Model) -> Result<Vec<Mesh>, AssetError> {
    self.buffer.table(model.mesh_offset, model.meshes_count, "meshes", Mesh::read)
  }

  pub fn textures(&self) -> Result<Vec<Texture>, AssetError> {
    self.buffer.table(self.header.texture_offset, self.header.texture_count, "textures", Texture::read)
  }

  /// Palette indices and the 256 entry RGB palette that follows them.
  pub fn texture_data(&self, texture: &Texture) -> Result<(&'a [u8], &'a [u8]), AssetError> {
    if texture.width < 0 || texture.height < 0 {
      return Err(AssetError::invalid_data(
        self.path(),
        format!("texture \"{}\" has negative dimensions", texture.name())
      ));
    }
    let pixel_count = (texture.width as usize)
      .checked_mul(texture.height as usize)
      .ok_or_else(|| AssetError::truncated(self.path(), "texture data", texture.index as i64))?;
    let data = self.buffer.bytes(texture.index, pixel_count.saturating_add(PALETTE_SIZE), "texture data")?;
    Ok(data.split_at(pixel_count))
  }

  pub fn skin_table(&self) -> Result<SkinTable, AssetError> {
    if self.header.skin_family_count <= 0 || self.header.skin_reference_count <= 0 {
      return Ok(SkinTable { families: Vec::new() });
    }
    let mut cursor = self.buffer.cursor(self.header.skin_offset as i64, "skin families")?;
    SkinTable::read(&mut cursor, self.header.skin_family_count, self.header.skin_reference_count)
      .map_err(|_| AssetError::truncated(self.path(), "skin families", self.header.skin_offset as i64))
  }

  /// Square node transition table, row `i` holds the transitions out of node `i`.
  pub fn transitions(&self) -> Result<Vec<Vec<u8>>, AssetError> {
    let count = self.header.transition_count.max(0) as usize;
    let len = count
      .checked_mul(count)
      .ok_or_else(|| AssetError::truncated(self.path(), "transitions", self.header.transition_offset as i64))?;
    let data = self.buffer.bytes(self.header.transition_offset, len, "transitions")?;
    Ok(data.chunks(count.max(1)).take(count).map(|row| row.to_vec()).collect())
  }
}
