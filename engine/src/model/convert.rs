use log::{debug, warn};

use hlstudio_mdl::{
  AnimOffsets, AssetError, MotionFlags, RawModel, SequenceFlags, StudioBuffer, StudioFile, TextureFlags, AXIS_COUNT
};

use super::{
  Animation, Attachment, BlendAxis, BodyPart, Bone, BoneAxis, BoneController, EditableModel, Event, Hitbox, Mesh,
  Pivot, Sequence, SequenceGroup, SubModel, Texture, Vertex
};

impl EditableModel {
  /// Decodes every table of a loaded model into owned collections. Cross references are
  /// validated and turned into indices.
  pub fn from_raw(raw: &RawModel) -> Result<Self, AssetError> {
    let main = raw.main_file()?;
    let header = main.header();
    debug!("Converting model {}", main.path().display());

    let bones = convert_bones(&main)?;
    let bone_controllers = convert_bone_controllers(&main, bones.len())?;
    for (i, bone) in bones.iter().enumerate() {
      for axis in &bone.axes {
        if let Some(controller) = axis.controller {
          if controller >= bone_controllers.len() {
            return Err(AssetError::invalid_data(
              main.path(),
              format!("bone {} references missing bone controller {}", i, controller)
            ));
          }
        }
      }
    }

    let hitboxes = main
      .hitboxes()?
      .into_iter()
      .map(|h| -> Result<Hitbox, AssetError> {
        Ok(Hitbox {
          bone: bone_index(&main, h.bone, bones.len(), "hitbox")?,
          group: h.group,
          bb_min: h.bb_min,
          bb_max: h.bb_max
        })
      })
      .collect::<Result<Vec<_>, AssetError>>()?;

    let raw_groups = main.sequence_groups()?;
    let group_zero_data = raw_groups.first().map_or(0, |g| g.data);
    let sequence_groups = raw_groups
      .iter()
      .map(|g| SequenceGroup {
        label: g.label(),
        name: g.name()
      })
      .collect();

    let sequences = main
      .sequences()?
      .into_iter()
      .map(|desc| -> Result<Sequence, AssetError> {
        let events = main
          .events(&desc)?
          .into_iter()
          .map(|e| Event {
            frame: e.frame,
            event: e.event,
            event_type: e.event_type,
            options: e.options()
          })
          .collect();
        let pivots = main
          .pivots(&desc)?
          .into_iter()
          .map(|p| Pivot {
            origin: p.origin,
            start: p.start,
            end: p.end
          })
          .collect();
        let animations = convert_animations(raw, &desc, group_zero_data, bones.len())?;
        let mut sequence = Sequence {
          label: desc.label(),
          fps: desc.fps,
          flags: SequenceFlags::from_bits_retain(desc.flags),
          activity: desc.activity,
          activity_weight: desc.activity_weight,
          events,
          frame_count: desc.frames_count,
          pivots,
          motion_type: MotionFlags::from_bits_retain(desc.motion_type),
          motion_bone: desc.motion_bone,
          linear_movement: desc.linear_movement,
          bb_min: desc.bb_min,
          bb_max: desc.bb_max,
          blend: [0, 1].map(|i| BlendAxis {
            blend_type: MotionFlags::from_bits_retain(desc.blend_type[i]),
            start: desc.blend_start[i],
            end: desc.blend_end[i]
          }),
          blend_parent: desc.blend_parent,
          sequence_group: desc.sequence_group.max(0) as usize,
          entry_node: desc.entry_node,
          exit_node: desc.exit_node,
          node_flags: desc.node_flags,
          next_sequence: desc.next_sequence,
          animations
        };
        sequence.sort_events();
        Ok(sequence)
      })
      .collect::<Result<Vec<_>, AssetError>>()?;

    let attachments = main
      .attachments()?
      .into_iter()
      .map(|a| -> Result<Attachment, AssetError> {
        Ok(Attachment {
          name: a.name(),
          attachment_type: a.attachment_type,
          bone: bone_index(&main, a.bone, bones.len(), "attachment")?,
          origin: a.origin,
          vectors: a.vectors
        })
      })
      .collect::<Result<Vec<_>, AssetError>>()?;

    let body_parts = convert_body_parts(&main, bones.len())?;

    let texture_file = raw.texture_file()?;
    let textures = texture_file
      .textures()?
      .into_iter()
      .enumerate()
      .map(|(array_index, t)| -> Result<Texture, AssetError> {
        let (pixels, palette) = texture_file.texture_data(&t)?;
        Ok(Texture {
          name: t.name(),
          flags: TextureFlags::from_bits_retain(t.flags),
          width: t.width,
          height: t.height,
          pixels: pixels.to_vec(),
          palette: palette.to_vec(),
          array_index
        })
      })
      .collect::<Result<Vec<_>, AssetError>>()?;

    let skin_families = texture_file
      .skin_table()?
      .families
      .into_iter()
      .map(|family| {
        family
          .into_iter()
          .map(|index| {
            usize::try_from(index)
              .ok()
              .filter(|i| *i < textures.len())
              .ok_or_else(|| {
                AssetError::invalid_data(texture_file.path(), format!("skin family references missing texture {}", index))
              })
          })
          .collect::<Result<Vec<_>, AssetError>>()
      })
      .collect::<Result<Vec<_>, AssetError>>()?;

    if let Some(references) = skin_families.first().map(Vec::len) {
      for part in &body_parts {
        for model in &part.models {
          if let Some(mesh) = model.meshes.iter().find(|m| m.skin_ref >= references) {
            return Err(AssetError::invalid_data(
              main.path(),
              format!("mesh of \"{}\" uses skin reference {} of {}", model.name, mesh.skin_ref, references)
            ));
          }
        }
      }
    }

    Ok(EditableModel {
      name: header.name(),
      eye_position: header.eye_position,
      min: header.min,
      max: header.max,
      bb_min: header.bb_min,
      bb_max: header.bb_max,
      flags: header.model_flags(),
      bones,
      bone_controllers,
      hitboxes,
      sequences,
      sequence_groups,
      attachments,
      body_parts,
      textures,
      skin_families,
      transitions: main.transitions()?
    })
  }
}

fn bone_index(file: &StudioFile<'_>, bone: i32, bone_count: usize, what: &str) -> Result<usize, AssetError> {
  usize::try_from(bone)
    .ok()
    .filter(|b| *b < bone_count)
    .ok_or_else(|| AssetError::invalid_data(file.path(), format!("{} references missing bone {}", what, bone)))
}

fn convert_bones(file: &StudioFile<'_>) -> Result<Vec<Bone>, AssetError> {
  file
    .bones()?
    .into_iter()
    .enumerate()
    .map(|(i, b)| {
      let parent = match b.parent {
        -1 => None,
        parent if parent >= 0 && (parent as usize) < i => Some(parent as usize),
        parent => {
          return Err(AssetError::invalid_data(
            file.path(),
            format!("bone \"{}\" has parent {} which does not precede it", b.name(), parent)
          ));
        }
      };
      let mut axes = [BoneAxis::default(); AXIS_COUNT];
      for (axis, out) in axes.iter_mut().enumerate() {
        *out = BoneAxis {
          value: b.value[axis],
          scale: b.scale[axis],
          controller: usize::try_from(b.bone_controller[axis]).ok()
        };
      }
      Ok(Bone {
        name: b.name(),
        parent,
        flags: b.flags,
        axes
      })
    })
    .collect()
}

fn convert_bone_controllers(file: &StudioFile<'_>, bone_count: usize) -> Result<Vec<BoneController>, AssetError> {
  file
    .bone_controllers()?
    .into_iter()
    .enumerate()
    .map(|(array_index, c)| -> Result<BoneController, AssetError> {
      Ok(BoneController {
        bone: bone_index(file, c.bone, bone_count, "bone controller")?,
        controller_type: c.motion_flags(),
        start: c.start,
        end: c.end,
        rest: c.rest,
        index: c.index,
        array_index
      })
    })
    .collect()
}

fn convert_animations(
  raw: &RawModel,
  desc: &hlstudio_mdl::SequenceDesc,
  group_zero_data: i32,
  bone_count: usize
) -> Result<Vec<Vec<Animation>>, AssetError> {
  let blend_count = desc.blends_count.max(1) as usize;
  let group = desc.sequence_group.max(0) as usize;
  let Some(buffer) = raw.sequence_group_buffer(group) else {
    warn!(
      "Sequence \"{}\" uses sequence group {} which is not loaded, it will not be animated",
      desc.label(),
      group
    );
    return Ok(vec![vec![Animation::default(); bone_count]; blend_count]);
  };

  let base = if group == 0 {
    group_zero_data as i64 + desc.anim_offset as i64
  } else {
    desc.anim_offset as i64
  };
  let base = i32::try_from(base).map_err(|_| AssetError::invalid_data(buffer.path(), "animation offset overflows"))?;

  (0..blend_count)
    .map(|blend| -> Result<Vec<Animation>, AssetError> {
      buffer
        .anim_offsets(base, blend, bone_count)?
        .into_iter()
        .enumerate()
        .map(|(bone, offsets)| {
          let position = base as i64 + ((blend * bone_count + bone) * AnimOffsets::SIZE) as i64;
          read_animation(buffer, position, &offsets, desc.frames_count)
        })
        .collect()
    })
    .collect()
}

fn read_animation(
  buffer: StudioBuffer<'_>,
  position: i64,
  offsets: &AnimOffsets,
  frames_count: i32
) -> Result<Animation, AssetError> {
  let mut animation = Animation::default();
  for (axis, offset) in offsets.offset.iter().enumerate() {
    if *offset != 0 {
      animation.values[axis] = buffer.anim_values(position + *offset as i64, frames_count)?;
    }
  }
  Ok(animation)
}

fn convert_body_parts(file: &StudioFile<'_>, bone_count: usize) -> Result<Vec<BodyPart>, AssetError> {
  let buffer = file.buffer();
  file
    .body_parts()?
    .into_iter()
    .map(|part| -> Result<BodyPart, AssetError> {
      let models = file
        .models(&part)?
        .into_iter()
        .map(|model| -> Result<SubModel, AssetError> {
          let meshes = file
            .meshes(&model)?
            .into_iter()
            .map(|mesh| -> Result<Mesh, AssetError> {
              Ok(Mesh {
                commands: buffer.triangle_commands(&mesh)?,
                stored_triangle_count: mesh.triangles_count,
                skin_ref: usize::try_from(mesh.skin_ref).map_err(|_| {
                  AssetError::invalid_data(file.path(), format!("mesh has negative skin reference {}", mesh.skin_ref))
                })?,
                normals_count: mesh.normals_count
              })
            })
            .collect::<Result<Vec<_>, AssetError>>()?;
          let vertices = skinned_points(
            file,
            model.vertex_info_offset,
            model.vertex_offset,
            model.vertices_count,
            bone_count,
            "vertices"
          )?;
          let normals = skinned_points(
            file,
            model.normal_info_offset,
            model.normal_offset,
            model.normals_count,
            bone_count,
            "normals"
          )?;
          Ok(SubModel {
            name: model.name(),
            model_type: model.model_type,
            bounding_radius: model.bounding_radius,
            meshes,
            vertices,
            normals
          })
        })
        .collect::<Result<Vec<_>, AssetError>>()?;
      Ok(BodyPart {
        name: part.name(),
        base: part.base,
        models
      })
    })
    .collect()
}

/// Positions paired with the per point bone index bytes stored in a separate array.
fn skinned_points(
  file: &StudioFile<'_>,
  info_offset: i32,
  offset: i32,
  count: i32,
  bone_count: usize,
  what: &'static str
) -> Result<Vec<Vertex>, AssetError> {
  let buffer = file.buffer();
  let positions = buffer.vectors(offset, count, what)?;
  let bones = buffer.bytes(info_offset, positions.len(), what)?;
  positions
    .into_iter()
    .zip(bones)
    .map(|(position, bone)| {
      let bone = *bone as usize;
      if bone >= bone_count {
        return Err(AssetError::invalid_data(file.path(), format!("{} reference missing bone {}", what, bone)));
      }
      Ok(Vertex { bone, position })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use std::fs;

  use bevy_math::Vec3;
  use hlstudio_mdl::test_util::{edit_header, single_run, ModelBuilder, ModelBuilderEntry, SequenceBuilder};
  use hlstudio_mdl::{load_model, AnimValue, Header, LoadOptions, ModelFlags};
  use tempfile::TempDir;

  use super::*;

  fn load(dir: &TempDir, name: &str, builder: ModelBuilder) -> Result<EditableModel, AssetError> {
    let (main, groups) = builder.build_with_groups();
    let path = dir.path().join(name);
    fs::write(&path, main).unwrap();
    let stem = name.trim_end_matches(".mdl");
    for (i, group) in groups.iter().enumerate() {
      fs::write(dir.path().join(format!("{}{:02}.mdl", stem, i + 1)), group).unwrap();
    }
    EditableModel::from_raw(&load_model(&path, &LoadOptions::default()).unwrap())
  }

  fn load_bytes(dir: &TempDir, name: &str, data: &[u8]) -> Result<EditableModel, AssetError> {
    let path = dir.path().join(name);
    fs::write(&path, data).unwrap();
    EditableModel::from_raw(&load_model(&path, &LoadOptions::default())?)
  }

  fn barney() -> ModelBuilder {
    ModelBuilder::new("barney.mdl")
      .eye_position(Vec3::new(0.0, 0.0, 68.0))
      .hull(Vec3::new(-16.0, -16.0, 0.0), Vec3::new(16.0, 16.0, 72.0))
      .clip_bounds(Vec3::splat(-20.0), Vec3::splat(80.0))
      .flags(ModelFlags::ROTATE.bits() | ModelFlags::NOSHADELIGHT.bits())
      .transitions(vec![vec![0, 2], vec![1, 0]])
      .bone("Bip01", -1, [0.0, 0.0, 38.0, 0.0, 0.0, 1.5], [0.1; AXIS_COUNT])
      .bone("Bip01 Spine", 0, [3.0, 0.0, 0.0, 0.0, 0.0, 0.0], [0.1; AXIS_COUNT])
      .bone("Bip01 Head", 1, [9.5, 0.0, 0.0, 0.0, 0.0, 0.0], [0.1; AXIS_COUNT])
      .bone_controller(2, MotionFlags::ZR, -60.0, 60.0, 0)
      .bone_controller(2, MotionFlags::XR, 0.0, 30.0, 4)
      .hitbox(2, 1, Vec3::splat(-4.0), Vec3::splat(4.0))
      .attachment("gun", 1, Vec3::new(10.0, 0.0, 2.0))
      .sequence(
        SequenceBuilder::new("walk", 3)
          .looping()
          .fps(24.0)
          .activity(4, 1)
          .bounds(Vec3::new(-12.0, -12.0, 0.0), Vec3::new(12.0, 12.0, 70.0))
          .blend_axis(0, MotionFlags::XR, -45.0, 45.0)
          .event(2, 1004, "step2")
          .event(0, 1004, "step1")
          .pivot(Vec3::ZERO, 0, 2)
          .motion(MotionFlags::X, 0, Vec3::new(20.0, 0.0, 0.0))
          .blend(vec![[
            vec![],
            vec![],
            single_run(&[0, 10, 20]),
            vec![],
            vec![],
            single_run(&[5, 5, 5])
          ]])
      )
      .body_part(
        "body",
        vec![ModelBuilderEntry::new("barney_body")
          .vertex(0, Vec3::new(1.0, 2.0, 3.0))
          .vertex(2, Vec3::new(0.0, 0.0, 70.0))
          .vertex(1, Vec3::new(0.0, 1.0, 50.0))
          .normal(0, Vec3::Z)
          .mesh(0, vec![3, 0, 0, 0, 0, 1, 0, 32, 0, 2, 0, 0, 32])]
      )
      .with_texture()
  }

  #[test]
  fn converts_all_tables() {
    let dir = TempDir::new().unwrap();
    let model = load(&dir, "barney.mdl", barney()).unwrap();

    assert_eq!(model.name, "barney.mdl");
    assert_eq!(model.eye_position.z, 68.0);
    assert_eq!(model.min, Vec3::new(-16.0, -16.0, 0.0));
    assert_eq!(model.max, Vec3::new(16.0, 16.0, 72.0));
    assert_eq!(model.bb_min, Vec3::splat(-20.0));
    assert_eq!(model.bb_max, Vec3::splat(80.0));
    assert_eq!(model.flags, ModelFlags::ROTATE | ModelFlags::NOSHADELIGHT);
    assert_eq!(model.transitions, [vec![0, 2], vec![1, 0]]);
    assert_eq!(model.bones.len(), 3);
    assert_eq!(model.bones[2].parent, Some(1));
    assert_eq!(model.find_bone_by_name("Bip01 Head"), Some(2));
    assert_eq!(model.root_bones().collect::<Vec<_>>(), [0]);
    assert_eq!(model.bones[2].axes[5].controller, Some(0));
    assert_eq!(model.bones[2].axes[3].controller, Some(1));
    assert_eq!(model.bone_controllers[1].array_index, 1);
    assert!(model.bone_controllers[1].is_mouth());
    assert_eq!(model.hitboxes[0].bone, 2);
    assert_eq!(model.attachments[0].name, "gun");

    let walk = &model.sequences[0];
    assert_eq!(walk.label, "walk");
    assert!(walk.is_looping());
    assert_eq!(walk.frame_count, 3);
    assert_eq!((walk.activity, walk.activity_weight), (4, 1));
    assert_eq!(walk.bb_max, Vec3::new(12.0, 12.0, 70.0));
    assert_eq!(walk.blend[0].blend_type, MotionFlags::XR);
    assert_eq!((walk.blend[0].start, walk.blend[0].end), (-45.0, 45.0));
    assert_eq!(walk.blend_value_to_byte(0, 0.0), 127);
    assert_eq!(walk.events.iter().map(|e| e.frame).collect::<Vec<_>>(), [0, 2]);
    assert_eq!(walk.pivots.len(), 1);
    assert_eq!(walk.blend_count(), 1);
    let root = walk.animation(0, 0).unwrap();
    assert_eq!(root.values[2], single_run(&[0, 10, 20]));
    assert_eq!(root.values[5], [AnimValue::header(3, 3), AnimValue::from_value(5), AnimValue::from_value(5), AnimValue::from_value(5)]);
    assert!(!walk.animation(0, 1).unwrap().is_animated(0));

    let body = &model.body_parts[0].models[0];
    assert_eq!(body.vertices[1], Vertex { bone: 2, position: Vec3::new(0.0, 0.0, 70.0) });
    assert_eq!(body.normals.len(), 1);
    assert_eq!(body.meshes[0].commands.last(), Some(&0));
    assert_eq!(body.meshes[0].triangle_count(), 1);

    assert_eq!(model.textures.len(), 1);
    assert_eq!(model.textures[0].pixels, [0, 1, 2, 3]);
    assert_eq!(model.textures[0].palette.len(), 768);
    assert_eq!(model.skin_families, [vec![0]]);
    assert_eq!(model.sequence_groups[0].label, "default");
  }

  #[test]
  fn animation_from_sequence_group_file() {
    let dir = TempDir::new().unwrap();
    let channels = || [single_run(&[7, 8]), vec![], vec![], vec![], vec![], vec![]];
    let builder = ModelBuilder::new("gman.mdl")
      .with_texture()
      .bone("root", -1, [0.0; AXIS_COUNT], [1.0; AXIS_COUNT])
      .sequence_groups(2)
      .sequence(SequenceBuilder::new("idle", 2).blend(vec![channels()]))
      .sequence(SequenceBuilder::new("talk", 2).group(1).blend(vec![channels()]));
    let model = load(&dir, "gman.mdl", builder).unwrap();
    assert_eq!(model.sequences[1].sequence_group, 1);
    assert_eq!(model.sequences[1].animation(0, 0).unwrap().values[0], single_run(&[7, 8]));
    assert_eq!(model.sequence_groups[1].name, "models/gman01.mdl");
  }

  #[test]
  fn bone_parent_must_precede_child() {
    let dir = TempDir::new().unwrap();
    let builder = ModelBuilder::new("bad.mdl")
      .with_texture()
      .bone("a", 1, [0.0; AXIS_COUNT], [1.0; AXIS_COUNT])
      .bone("b", -1, [0.0; AXIS_COUNT], [1.0; AXIS_COUNT]);
    assert!(matches!(load(&dir, "bad.mdl", builder), Err(AssetError::InvalidData { .. })));
  }

  #[test]
  fn skin_references_are_validated() {
    let dir = TempDir::new().unwrap();
    let builder = ModelBuilder::new("bad.mdl")
      .with_texture()
      .body_part("body", vec![ModelBuilderEntry::new("body").mesh(1, vec![])]);
    assert!(matches!(load(&dir, "bad.mdl", builder), Err(AssetError::InvalidData { .. })));

    let builder = ModelBuilder::new("bad2.mdl").with_texture().skin_families(vec![vec![3]]);
    assert!(matches!(load(&dir, "bad2.mdl", builder), Err(AssetError::InvalidData { .. })));
  }

  #[test]
  fn truncated_bone_table_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut data = barney().build();
    edit_header(&mut data, |header| header.bone_count = 100000);
    assert!(matches!(
      load_bytes(&dir, "barney.mdl", &data),
      Err(AssetError::Truncated { what: "bones", .. })
    ));
  }

  #[test]
  fn animation_run_covering_no_frames_is_rejected() {
    let dir = TempDir::new().unwrap();
    let channel = vec![AnimValue::header(1, 0), AnimValue::from_value(3)];
    let builder = ModelBuilder::new("frozen.mdl")
      .with_texture()
      .bone("root", -1, [0.0; AXIS_COUNT], [1.0; AXIS_COUNT])
      .sequence(SequenceBuilder::new("idle", 2).blend(vec![[channel, vec![], vec![], vec![], vec![], vec![]]]));
    assert!(matches!(load(&dir, "frozen.mdl", builder), Err(AssetError::InvalidData { .. })));
  }

  #[test]
  fn oversized_texture_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut data = barney().build();
    let offset = Header::read(&mut &data[..]).unwrap().texture_offset as usize;
    let mut texture = hlstudio_mdl::Texture::read(&mut &data[offset..]).unwrap();
    texture.width = 4096;
    texture.height = 4096;
    let mut record = Vec::new();
    texture.write(&mut record).unwrap();
    data[offset..offset + record.len()].copy_from_slice(&record);
    assert!(matches!(
      load_bytes(&dir, "barney.mdl", &data),
      Err(AssetError::Truncated { what: "texture data", .. })
    ));
  }
}
