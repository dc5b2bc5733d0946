use hlstudio_mdl::TextureFlags;

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
  pub name: String,
  pub flags: TextureFlags,
  pub width: i32,
  pub height: i32,
  /// One palette index per pixel, row major.
  pub pixels: Vec<u8>,
  /// 256 RGB entries.
  pub palette: Vec<u8>,
  /// Position of the texture in [`EditableModel::textures`](super::EditableModel::textures).
  pub array_index: usize
}

impl Texture {
  /// RGB color of the pixel at `x`, `y`.
  pub fn color(&self, x: i32, y: i32) -> Option<[u8; 3]> {
    if x < 0 || y < 0 || x >= self.width || y >= self.height {
      return None;
    }
    let index = *self.pixels.get(y as usize * self.width as usize + x as usize)? as usize * 3;
    let rgb = self.palette.get(index..index + 3)?;
    Some([rgb[0], rgb[1], rgb[2]])
  }

  pub fn is_masked(&self) -> bool {
    self.flags.contains(TextureFlags::MASKED)
  }
}
