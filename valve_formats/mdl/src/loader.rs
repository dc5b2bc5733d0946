use std::ffi::OsString;
use std::fs::File;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::model_file::{StudioBuffer, StudioFile};
use crate::read_util::ReadEntireSeekableFile;
use crate::{AssetError, PrimitiveRead, RawDataRead, SEQUENCE_HEADER_ID, STUDIO_HEADER_ID, STUDIO_VERSION};

/// Suffix appended to the file stem of a model's separate texture file.
pub const TEXTURE_FILE_SUFFIX: char = 'T';

/// Offset of the `length` field shared by main and sequence group headers.
const LENGTH_OFFSET: u64 = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerKind {
  #[default]
  Mdl,
  Dol
}

impl ContainerKind {
  pub fn from_path(path: &Path) -> Self {
    match path.extension() {
      Some(ext) if ext.eq_ignore_ascii_case("dol") => ContainerKind::Dol,
      _ => ContainerKind::Mdl
    }
  }

  pub fn extension(self) -> &'static str {
    match self {
      ContainerKind::Mdl => "mdl",
      ContainerKind::Dol => "dol"
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderKind {
  Main,
  Texture,
  SequenceGroup
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
  /// Load the companion texture file of models without embedded textures.
  pub external_textures: bool,
  /// Load the `NN` sequence group files of models with more than one group.
  pub sequence_groups: bool
}

impl Default for LoadOptions {
  fn default() -> Self {
    Self {
      external_textures: true,
      sequence_groups: true
    }
  }
}

pub struct LoadedFile {
  pub path: PathBuf,
  pub data: Box<[u8]>
}

impl LoadedFile {
  pub fn buffer(&self) -> StudioBuffer<'_> {
    StudioBuffer::new(&self.path, &self.data)
  }
}

/// The undecoded contents of a model and its companion files.
pub struct RawModel {
  pub main: LoadedFile,
  pub texture: Option<LoadedFile>,
  /// Sequence groups 1 and up. Group 0 is stored inside the main file.
  pub sequence_groups: Vec<LoadedFile>,
  pub container: ContainerKind
}

impl RawModel {
  pub fn main_file(&self) -> Result<StudioFile<'_>, AssetError> {
    StudioFile::read(&self.main.path, &self.main.data)
  }

  /// The header that holds the textures and skin families: the separate
  /// texture file if there is one, otherwise the main file.
  pub fn texture_file(&self) -> Result<StudioFile<'_>, AssetError> {
    let file = self.texture.as_ref().unwrap_or(&self.main);
    StudioFile::read(&file.path, &file.data)
  }

  /// The buffer holding the animation data of `group`.
  pub fn sequence_group_buffer(&self, group: usize) -> Option<StudioBuffer<'_>> {
    if group == 0 {
      Some(self.main.buffer())
    } else {
      self.sequence_groups.get(group - 1).map(LoadedFile::buffer)
    }
  }
}

pub fn load_model(path: &Path, options: &LoadOptions) -> Result<RawModel, AssetError> {
  let container = ContainerKind::from_path(path);
  let main = load_header_file(path, HeaderKind::Main, false)?;
  let (texture_offset, sequence_group_count) = {
    let file = StudioFile::read(&main.path, &main.data)?;
    (file.header().texture_offset, file.header().sequence_group_count)
  };

  let texture = if texture_offset == 0 {
    if options.external_textures {
      let texture_path = texture_file_path(path, container);
      debug!("Loading external textures of {} from {}", path.display(), texture_path.display());
      let file = load_header_file(&texture_path, HeaderKind::Texture, true).map_err(|e| {
        AssetError::MissingCompanionFile {
          path: path.to_path_buf(),
          companion: texture_path.clone(),
          source: Box::new(e)
        }
      })?;
      Some(file)
    } else {
      None
    }
  } else {
    None
  };

  let mut sequence_groups = Vec::new();
  if sequence_group_count > 1 && options.sequence_groups {
    for group in 1..sequence_group_count as u32 {
      let group_path = sequence_group_file_path(path, container, group);
      debug!("Loading sequence group {} of {} from {}", group, path.display(), group_path.display());
      let file = load_header_file(&group_path, HeaderKind::SequenceGroup, false).map_err(|e| {
        AssetError::MissingCompanionFile {
          path: path.to_path_buf(),
          companion: group_path.clone(),
          source: Box::new(e)
        }
      })?;
      sequence_groups.push(file);
    }
  }

  Ok(RawModel {
    main,
    texture,
    sequence_groups,
    container
  })
}

/// `<stem>T.<ext>` next to the main file.
pub fn texture_file_path(path: &Path, container: ContainerKind) -> PathBuf {
  companion_path(path, container, &TEXTURE_FILE_SUFFIX.to_string())
}

/// `<stem><NN>.<ext>` next to the main file.
pub fn sequence_group_file_path(path: &Path, container: ContainerKind, group: u32) -> PathBuf {
  companion_path(path, container, &format!("{:02}", group))
}

fn companion_path(path: &Path, container: ContainerKind, suffix: &str) -> PathBuf {
  let mut file_name = path.file_stem().map(OsString::from).unwrap_or_default();
  file_name.push(suffix);
  file_name.push(".");
  file_name.push(container.extension());
  path.with_file_name(file_name)
}

/// Some tools write the texture file with a lower case suffix.
fn alternate_texture_path(path: &Path) -> Option<PathBuf> {
  let stem = path.file_stem()?.to_str()?;
  let stem = stem.strip_suffix(TEXTURE_FILE_SUFFIX)?;
  let mut file_name = format!("{}{}", stem, TEXTURE_FILE_SUFFIX.to_ascii_lowercase());
  if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
    file_name.push('.');
    file_name.push_str(ext);
  }
  Some(path.with_file_name(file_name))
}

fn read_file(path: &Path) -> Result<LoadedFile, AssetError> {
  match File::open(path).and_then(|mut file| file.read_seekable_to_end()) {
    Ok(data) => Ok(LoadedFile {
      path: path.to_path_buf(),
      data
    }),
    Err(e) if e.kind() == ErrorKind::NotFound => Err(AssetError::FileNotFound {
      path: path.to_path_buf(),
      source: e
    }),
    Err(e) => Err(AssetError::Io {
      path: path.to_path_buf(),
      source: e
    })
  }
}

fn load_header_file(path: &Path, kind: HeaderKind, external_textures: bool) -> Result<LoadedFile, AssetError> {
  let file = match read_file(path) {
    Err(AssetError::FileNotFound { path: missing, source }) if external_textures => {
      match alternate_texture_path(&missing) {
        Some(alternate) => {
          let file = read_file(&alternate).map_err(|_| AssetError::FileNotFound { path: missing, source })?;
          warn!("Using texture file {} with a lower case suffix", alternate.display());
          file
        }
        None => return Err(AssetError::FileNotFound { path: missing, source })
      }
    }
    result => result?
  };

  validate_header(&file, kind)?;
  Ok(file)
}

fn validate_header(file: &LoadedFile, kind: HeaderKind) -> Result<(), AssetError> {
  let path = file.path.as_path();
  let mut cursor = Cursor::new(&file.data[..]);

  let id = cursor.read_i32().map_err(|_| AssetError::InvalidFormat { path: path.to_path_buf() })?;
  match id {
    SEQUENCE_HEADER_ID if kind != HeaderKind::SequenceGroup => {
      return Err(AssetError::WrongHeaderKind {
        path: path.to_path_buf(),
        expected: "main"
      });
    }
    STUDIO_HEADER_ID if kind == HeaderKind::SequenceGroup => {
      return Err(AssetError::WrongHeaderKind {
        path: path.to_path_buf(),
        expected: "sequence group"
      });
    }
    SEQUENCE_HEADER_ID | STUDIO_HEADER_ID => {}
    _ => return Err(AssetError::InvalidFormat { path: path.to_path_buf() })
  }

  let version = cursor.read_i32().map_err(|_| AssetError::truncated(path, "header", 4))?;
  if version != STUDIO_VERSION {
    return Err(AssetError::VersionMismatch {
      path: path.to_path_buf(),
      expected: STUDIO_VERSION,
      found: version
    });
  }

  let name = cursor.read_fixed::<64>().map_err(|_| AssetError::truncated(path, "header", 8))?;
  cursor.set_position(LENGTH_OFFSET);
  let length = cursor.read_i32().map_err(|_| AssetError::truncated(path, "header", LENGTH_OFFSET as i64))?;
  if length < 0 || length as usize != file.data.len() {
    return Err(AssetError::SizeMismatch {
      path: path.to_path_buf(),
      declared: length,
      actual: file.data.len()
    });
  }

  if kind == HeaderKind::Main && name[0] == 0 {
    return Err(AssetError::NotMainHeader {
      path: path.to_path_buf(),
      hint: not_main_header_hint(path)
    });
  }

  Ok(())
}

fn not_main_header_hint(path: &Path) -> &'static str {
  let looks_like_texture_file = path
    .file_stem()
    .and_then(|s| s.to_str())
    .and_then(|s| s.chars().last())
    .map_or(false, |c| c.eq_ignore_ascii_case(&TEXTURE_FILE_SUFFIX));
  if looks_like_texture_file {
    " (the file name ends with 'T', did you load a texture file by mistake?)"
  } else {
    ""
  }
}
