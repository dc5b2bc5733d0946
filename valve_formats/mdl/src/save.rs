use std::fs;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::loader::{sequence_group_file_path, texture_file_path, ContainerKind};
use crate::model_file::StudioFile;
use crate::{to_fixed_string, AssetError, RawModel, SequenceGroup};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
  /// Rewrite the file names embedded in the sequence group table so they point at the
  /// saved `NN` files, relative to the enclosing `models` directory.
  pub correct_sequence_group_file_names: bool
}

/// Writes the main file and its companions next to `path`. Buffers are written verbatim,
/// only the sequence group names change when requested.
pub fn save_model(model: &RawModel, path: &Path, options: &SaveOptions) -> Result<(), AssetError> {
  let container = ContainerKind::from_path(path);
  let mut main = model.main.data.to_vec();

  if options.correct_sequence_group_file_names {
    correct_sequence_group_names(model, path, container, &mut main)?;
  }

  write_file(path, &main)?;

  if let Some(texture) = &model.texture {
    write_file(&texture_file_path(path, container), &texture.data)?;
  }

  for (i, group) in model.sequence_groups.iter().enumerate() {
    write_file(&sequence_group_file_path(path, container, i as u32 + 1), &group.data)?;
  }

  Ok(())
}

fn correct_sequence_group_names(
  model: &RawModel,
  path: &Path,
  container: ContainerKind,
  main: &mut [u8]
) -> Result<(), AssetError> {
  let file = model.main_file()?;
  let header = file.header();
  if header.sequence_group_count <= 1 {
    return Ok(());
  }

  let root = find_models_root(path).ok_or_else(|| AssetError::PathResolutionFailure { path: path.to_path_buf() })?;

  for group in 1..header.sequence_group_count as u32 {
    let group_path = sequence_group_file_path(path, container, group);
    let relative = relative_name(&root, &group_path).ok_or_else(|| AssetError::PathResolutionFailure {
      path: group_path.clone()
    })?;
    debug!("Setting sequence group {} file name to {}", group, relative);

    let offset = header.sequence_group_offset as i64
      + group as i64 * SequenceGroup::SIZE as i64
      + SequenceGroup::NAME_OFFSET as i64;
    let field = name_field(&file, main, offset)?;
    field.copy_from_slice(&to_fixed_string::<{ SequenceGroup::NAME_LENGTH }>(&relative));
  }
  Ok(())
}

fn name_field<'a>(file: &StudioFile<'_>, main: &'a mut [u8], offset: i64) -> Result<&'a mut [u8], AssetError> {
  let start = usize::try_from(offset).ok();
  match start.and_then(|start| main.get_mut(start..start + SequenceGroup::NAME_LENGTH)) {
    Some(field) => Ok(field),
    None => Err(AssetError::Truncated {
      path: file.path().to_path_buf(),
      what: "sequence groups",
      offset
    })
  }
}

/// The parent of the closest ancestor directory called `models`.
fn find_models_root(path: &Path) -> Option<PathBuf> {
  let absolute = if path.is_absolute() {
    path.to_path_buf()
  } else {
    std::env::current_dir().ok()?.join(path)
  };
  absolute
    .ancestors()
    .skip(1)
    .find(|dir| dir.file_name().map_or(false, |name| name.eq_ignore_ascii_case("models")))
    .and_then(Path::parent)
    .map(Path::to_path_buf)
}

/// `models/...` with forward slashes, the way the engine expects it.
fn relative_name(root: &Path, file: &Path) -> Option<String> {
  let absolute = if file.is_absolute() {
    file.to_path_buf()
  } else {
    std::env::current_dir().ok()?.join(file)
  };
  let relative = absolute.strip_prefix(root).ok()?;
  let parts: Option<Vec<&str>> = relative
    .components()
    .map(|c| match c {
      Component::Normal(part) => part.to_str(),
      _ => None
    })
    .collect();
  Some(parts?.join("/"))
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), AssetError> {
  fs::write(path, data).map_err(|e| AssetError::Io {
    path: path.to_path_buf(),
    source: e
  })
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;

  use super::*;
  use crate::test_util::{sequence_group_file, ModelBuilder};
  use crate::{load_model, LoadOptions};

  #[test]
  fn single_group_model_saves_byte_identical() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("tree.mdl");
    let data = ModelBuilder::new("tree.mdl").with_texture().with_skeleton().build();
    fs::write(&source, &data).unwrap();

    let model = load_model(&source, &LoadOptions::default()).unwrap();
    let target = dir.path().join("tree_copy.mdl");
    save_model(&model, &target, &SaveOptions::default()).unwrap();
    assert_eq!(fs::read(&target).unwrap(), data);
  }

  #[test]
  fn saves_companion_files() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("ally.mdl");
    fs::write(&source, ModelBuilder::new("ally.mdl").sequence_groups(2).build()).unwrap();
    fs::write(dir.path().join("allyT.mdl"), ModelBuilder::new("allyT.mdl").with_texture().build()).unwrap();
    fs::write(dir.path().join("ally01.mdl"), sequence_group_file("ally01.mdl", &[7; 6])).unwrap();

    let model = load_model(&source, &LoadOptions::default()).unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    save_model(&model, &out.join("friend.mdl"), &SaveOptions::default()).unwrap();

    assert_eq!(fs::read(out.join("friendT.mdl")).unwrap(), fs::read(dir.path().join("allyT.mdl")).unwrap());
    assert_eq!(fs::read(out.join("friend01.mdl")).unwrap(), fs::read(dir.path().join("ally01.mdl")).unwrap());
  }

  #[test]
  fn corrects_sequence_group_names_relative_to_models() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("hgrunt.mdl");
    fs::write(&source, ModelBuilder::new("hgrunt.mdl").with_texture().sequence_groups(3).build()).unwrap();
    fs::write(dir.path().join("hgrunt01.mdl"), sequence_group_file("hgrunt01.mdl", &[])).unwrap();
    fs::write(dir.path().join("hgrunt02.mdl"), sequence_group_file("hgrunt02.mdl", &[])).unwrap();
    let model = load_model(&source, &LoadOptions::default()).unwrap();

    let target_dir = dir.path().join("valve").join("models").join("soldiers");
    fs::create_dir_all(&target_dir).unwrap();
    let target = target_dir.join("grunt.mdl");
    let options = SaveOptions {
      correct_sequence_group_file_names: true
    };
    save_model(&model, &target, &options).unwrap();

    let saved = load_model(&target, &LoadOptions::default()).unwrap();
    let groups = saved.main_file().unwrap().sequence_groups().unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].name(), model.main_file().unwrap().sequence_groups().unwrap()[0].name());
    assert_eq!(groups[1].name(), "models/soldiers/grunt01.mdl");
    assert_eq!(groups[2].name(), "models/soldiers/grunt02.mdl");
  }

  #[test]
  fn missing_models_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("hgrunt.mdl");
    fs::write(&source, ModelBuilder::new("hgrunt.mdl").with_texture().sequence_groups(2).build()).unwrap();
    fs::write(dir.path().join("hgrunt01.mdl"), sequence_group_file("hgrunt01.mdl", &[])).unwrap();
    let model = load_model(&source, &LoadOptions::default()).unwrap();

    let options = SaveOptions {
      correct_sequence_group_file_names: true
    };
    let result = save_model(&model, &dir.path().join("elsewhere.mdl"), &options);
    assert!(matches!(result, Err(AssetError::PathResolutionFailure { .. })));
  }
}
