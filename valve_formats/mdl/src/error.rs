use std::io::Error as IOError;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
  #[error("could not open file \"{}\"", .path.display())]
  FileNotFound {
    path: PathBuf,
    #[source]
    source: IOError
  },

  #[error("error accessing file \"{}\"", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: IOError
  },

  #[error("file \"{}\" is not a studio model file", .path.display())]
  InvalidFormat { path: PathBuf },

  #[error("file \"{}\" has the wrong header kind: expected a {expected} header", .path.display())]
  WrongHeaderKind { path: PathBuf, expected: &'static str },

  #[error("file \"{}\" has version {found}, expected version {expected}", .path.display())]
  VersionMismatch { path: PathBuf, expected: i32, found: i32 },

  #[error("file \"{}\" declares a length of {declared} bytes but is {actual} bytes long", .path.display())]
  SizeMismatch { path: PathBuf, declared: i32, actual: usize },

  #[error("file \"{}\" is not a main header file{hint}", .path.display())]
  NotMainHeader { path: PathBuf, hint: &'static str },

  #[error("companion file \"{}\" of \"{}\" could not be loaded", .companion.display(), .path.display())]
  MissingCompanionFile {
    path: PathBuf,
    companion: PathBuf,
    #[source]
    source: Box<AssetError>
  },

  #[error("could not find a \"models\" directory above \"{}\"", .path.display())]
  PathResolutionFailure { path: PathBuf },

  #[error("file \"{}\" is truncated: {what} at offset {offset} runs past the end of the data", .path.display())]
  Truncated { path: PathBuf, what: &'static str, offset: i64 },

  #[error("file \"{}\" contains invalid data: {reason}", .path.display())]
  InvalidData { path: PathBuf, reason: String }
}

impl AssetError {
  /// The file the error is about. For missing companions this is the main file.
  pub fn path(&self) -> &Path {
    match self {
      AssetError::FileNotFound { path, .. }
      | AssetError::Io { path, .. }
      | AssetError::InvalidFormat { path }
      | AssetError::WrongHeaderKind { path, .. }
      | AssetError::VersionMismatch { path, .. }
      | AssetError::SizeMismatch { path, .. }
      | AssetError::NotMainHeader { path, .. }
      | AssetError::MissingCompanionFile { path, .. }
      | AssetError::PathResolutionFailure { path }
      | AssetError::Truncated { path, .. }
      | AssetError::InvalidData { path, .. } => path
    }
  }

  pub(crate) fn truncated(path: &Path, what: &'static str, offset: i64) -> Self {
    AssetError::Truncated {
      path: path.to_path_buf(),
      what,
      offset
    }
  }

  pub fn invalid_data(path: &Path, reason: impl Into<String>) -> Self {
    AssetError::InvalidData {
      path: path.to_path_buf(),
      reason: reason.into()
    }
  }
}
