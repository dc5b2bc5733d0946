//! Builds small but complete version 10 model files for tests. Offsets are laid out
//! the same way the compiler lays them out: payloads first, then the tables that
//! point at them. The builder panics on inputs that cannot be encoded.

use bevy_math::Vec3;

use crate::{
  to_fixed_string, AnimOffsets, AnimValue, Attachment, BodyPart, Bone, BoneController, Event, Header, Hitbox, Mesh,
  Model, MotionFlags, Pivot, PrimitiveWrite, SequenceDesc, SequenceGroup, SequenceHeader, Texture, AXIS_COUNT,
  PALETTE_SIZE, SEQUENCE_HEADER_ID, STUDIO_HEADER_ID, STUDIO_VERSION
};

/// Value spans of the six channels of one bone. An empty list leaves the channel unanimated.
pub type BoneChannels = [Vec<AnimValue>; AXIS_COUNT];

/// One run holding every value explicitly.
pub fn single_run(values: &[i16]) -> Vec<AnimValue> {
  let count = u8::try_from(values.len()).expect("a single run holds at most 255 values");
  let mut run = vec![AnimValue::header(count, count)];
  run.extend(values.iter().map(|v| AnimValue::from_value(*v)));
  run
}

/// A sequence group file with the given animation payload after its header.
pub fn sequence_group_file(name: &str, payload: &[u8]) -> Vec<u8> {
  let header = SequenceHeader {
    id: SEQUENCE_HEADER_ID,
    version: STUDIO_VERSION,
    name: to_fixed_string(name),
    length: (SequenceHeader::SIZE + payload.len()) as i32
  };
  let mut data = Vec::with_capacity(header.length as usize);
  header.write(&mut data).expect("writing to a Vec");
  data.extend_from_slice(payload);
  data
}

pub struct SequenceBuilder {
  label: String,
  fps: f32,
  flags: i32,
  activity: i32,
  activity_weight: i32,
  frames: i32,
  motion_type: i32,
  motion_bone: i32,
  linear_movement: Vec3,
  bb_min: Vec3,
  bb_max: Vec3,
  blend_type: [i32; 2],
  blend_start: [f32; 2],
  blend_end: [f32; 2],
  group: i32,
  events: Vec<Event>,
  pivots: Vec<Pivot>,
  blends: Vec<Vec<BoneChannels>>
}

impl SequenceBuilder {
  pub fn new(label: &str, frames: i32) -> Self {
    Self {
      label: label.to_string(),
      fps: 30.0,
      flags: 0,
      activity: 0,
      activity_weight: 0,
      frames,
      motion_type: 0,
      motion_bone: 0,
      linear_movement: Vec3::ZERO,
      bb_min: Vec3::ZERO,
      bb_max: Vec3::ZERO,
      blend_type: [0; 2],
      blend_start: [0.0; 2],
      blend_end: [1.0; 2],
      group: 0,
      events: Vec::new(),
      pivots: Vec::new(),
      blends: Vec::new()
    }
  }

  pub fn fps(mut self, fps: f32) -> Self {
    self.fps = fps;
    self
  }

  pub fn looping(mut self) -> Self {
    self.flags |= 1;
    self
  }

  pub fn activity(mut self, activity: i32, weight: i32) -> Self {
    self.activity = activity;
    self.activity_weight = weight;
    self
  }

  pub fn motion(mut self, motion_type: MotionFlags, motion_bone: i32, linear_movement: Vec3) -> Self {
    self.motion_type = motion_type.bits();
    self.motion_bone = motion_bone;
    self.linear_movement = linear_movement;
    self
  }

  pub fn bounds(mut self, min: Vec3, max: Vec3) -> Self {
    self.bb_min = min;
    self.bb_max = max;
    self
  }

  pub fn blend_axis(mut self, axis: usize, blend_type: MotionFlags, start: f32, end: f32) -> Self {
    self.blend_type[axis] = blend_type.bits();
    self.blend_start[axis] = start;
    self.blend_end[axis] = end;
    self
  }

  pub fn group(mut self, group: i32) -> Self {
    self.group = group;
    self
  }

  pub fn event(mut self, frame: i32, event: i32, options: &str) -> Self {
    self.events.push(Event {
      frame,
      event,
      event_type: 0,
      options: to_fixed_string(options)
    });
    self
  }

  pub fn pivot(mut self, origin: Vec3, start: i32, end: i32) -> Self {
    self.pivots.push(Pivot { origin, start, end });
    self
  }

  /// Adds one blend source. Bones missing from `bones` are not animated.
  pub fn blend(mut self, bones: Vec<BoneChannels>) -> Self {
    self.blends.push(bones);
    self
  }
}

pub struct MeshBuilder {
  pub skin_ref: i32,
  pub normals_count: i32,
  /// Triangle commands without the terminating zero.
  pub commands: Vec<i16>
}

pub struct ModelBuilderEntry {
  pub name: String,
  pub bounding_radius: f32,
  /// Owning bone and position of each vertex.
  pub vertices: Vec<(u8, Vec3)>,
  pub normals: Vec<(u8, Vec3)>,
  pub meshes: Vec<MeshBuilder>
}

impl ModelBuilderEntry {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      bounding_radius: 0.0,
      vertices: Vec::new(),
      normals: Vec::new(),
      meshes: Vec::new()
    }
  }

  pub fn vertex(mut self, bone: u8, position: Vec3) -> Self {
    self.vertices.push((bone, position));
    self
  }

  pub fn normal(mut self, bone: u8, normal: Vec3) -> Self {
    self.normals.push((bone, normal));
    self
  }

  pub fn mesh(mut self, skin_ref: i32, commands: Vec<i16>) -> Self {
    self.meshes.push(MeshBuilder {
      skin_ref,
      normals_count: 0,
      commands
    });
    self
  }
}

struct TextureEntry {
  name: String,
  flags: i32,
  width: i32,
  height: i32,
  pixels: Vec<u8>,
  palette: Vec<u8>
}

pub struct ModelBuilder {
  name: String,
  eye_position: Vec3,
  min: Vec3,
  max: Vec3,
  bb_min: Vec3,
  bb_max: Vec3,
  flags: i32,
  bones: Vec<Bone>,
  controllers: Vec<BoneController>,
  hitboxes: Vec<Hitbox>,
  sequences: Vec<SequenceBuilder>,
  sequence_group_count: usize,
  attachments: Vec<Attachment>,
  body_parts: Vec<(String, Vec<ModelBuilderEntry>)>,
  textures: Vec<TextureEntry>,
  skin_families: Vec<Vec<i16>>,
  transitions: Vec<Vec<u8>>
}

impl ModelBuilder {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      eye_position: Vec3::ZERO,
      min: Vec3::ZERO,
      max: Vec3::ZERO,
      bb_min: Vec3::ZERO,
      bb_max: Vec3::ZERO,
      flags: 0,
      bones: Vec::new(),
      controllers: Vec::new(),
      hitboxes: Vec::new(),
      sequences: Vec::new(),
      sequence_group_count: 1,
      attachments: Vec::new(),
      body_parts: Vec::new(),
      textures: Vec::new(),
      skin_families: Vec::new(),
      transitions: Vec::new()
    }
  }

  /// Embeds one 2x2 texture.
  pub fn with_texture(self) -> Self {
    let index = self.textures.len() as u8;
    self.texture(&format!("skin{}.bmp", index), 0, 2, 2, vec![index, 1, 2, 3])
  }

  /// A two bone skeleton with one single frame sequence.
  pub fn with_skeleton(self) -> Self {
    self
      .bone("Bip01", -1, [0.0, 0.0, 36.0, 0.0, 0.0, 0.0], [1.0 / 32.0; AXIS_COUNT])
      .bone("Bip01 Spine", 0, [4.0, 0.0, 0.0, 0.0, 0.0, 0.0], [1.0 / 32.0; AXIS_COUNT])
      .sequence(SequenceBuilder::new("idle", 1).looping())
  }

  pub fn eye_position(mut self, eye_position: Vec3) -> Self {
    self.eye_position = eye_position;
    self
  }

  pub fn hull(mut self, min: Vec3, max: Vec3) -> Self {
    self.min = min;
    self.max = max;
    self
  }

  pub fn clip_bounds(mut self, min: Vec3, max: Vec3) -> Self {
    self.bb_min = min;
    self.bb_max = max;
    self
  }

  pub fn flags(mut self, flags: i32) -> Self {
    self.flags = flags;
    self
  }

  pub fn bone(mut self, name: &str, parent: i32, value: [f32; AXIS_COUNT], scale: [f32; AXIS_COUNT]) -> Self {
    self.bones.push(Bone {
      name: to_fixed_string(name),
      parent,
      flags: 0,
      bone_controller: [-1; AXIS_COUNT],
      value,
      scale
    });
    self
  }

  /// Adds a controller and links it to the matching channel of `bone`.
  pub fn bone_controller(mut self, bone: i32, controller_type: MotionFlags, start: f32, end: f32, index: i32) -> Self {
    let axis = [
      MotionFlags::X,
      MotionFlags::Y,
      MotionFlags::Z,
      MotionFlags::XR,
      MotionFlags::YR,
      MotionFlags::ZR
    ]
    .iter()
    .position(|flag| controller_type.contains(*flag))
    .expect("controller type names an axis");
    self.bones[bone as usize].bone_controller[axis] = self.controllers.len() as i32;
    self.controllers.push(BoneController {
      bone,
      bone_controller_type: controller_type.bits(),
      start,
      end,
      rest: 0,
      index
    });
    self
  }

  pub fn hitbox(mut self, bone: i32, group: i32, bb_min: Vec3, bb_max: Vec3) -> Self {
    self.hitboxes.push(Hitbox {
      bone,
      group,
      bb_min,
      bb_max
    });
    self
  }

  pub fn attachment(mut self, name: &str, bone: i32, origin: Vec3) -> Self {
    self.attachments.push(Attachment {
      name: to_fixed_string(name),
      attachment_type: 0,
      bone,
      origin,
      vectors: [Vec3::X, Vec3::Y, Vec3::Z]
    });
    self
  }

  pub fn sequence(mut self, sequence: SequenceBuilder) -> Self {
    self.sequences.push(sequence);
    self
  }

  /// Declares `count` sequence groups. Groups other than 0 live in `NN` files.
  pub fn sequence_groups(mut self, count: usize) -> Self {
    self.sequence_group_count = count.max(1);
    self
  }

  pub fn body_part(mut self, name: &str, models: Vec<ModelBuilderEntry>) -> Self {
    self.body_parts.push((name.to_string(), models));
    self
  }

  pub fn texture(mut self, name: &str, flags: i32, width: i32, height: i32, pixels: Vec<u8>) -> Self {
    assert_eq!(pixels.len(), (width * height) as usize);
    let palette = (0..PALETTE_SIZE).map(|i| (i % 256) as u8).collect();
    self.textures.push(TextureEntry {
      name: name.to_string(),
      flags,
      width,
      height,
      pixels,
      palette
    });
    self
  }

  /// Replaces the default single family that maps each skin reference to the texture
  /// of the same index.
  pub fn skin_families(mut self, families: Vec<Vec<i16>>) -> Self {
    self.skin_families = families;
    self
  }

  pub fn transitions(mut self, transitions: Vec<Vec<u8>>) -> Self {
    self.transitions = transitions;
    self
  }

  /// The main file only. Animation data of sequences outside group 0 is dropped.
  pub fn build(self) -> Vec<u8> {
    self.build_with_groups().0
  }

  /// The main file and the contents of sequence group files 1 and up.
  pub fn build_with_groups(self) -> (Vec<u8>, Vec<Vec<u8>>) {
    let mut data = vec![0u8; Header::SIZE];
    let mut groups: Vec<Vec<u8>> = (1..self.sequence_group_count).map(|_| vec![0u8; SequenceHeader::SIZE]).collect();
    let bone_count = self.bones.len();

    let bone_offset = table(&mut data, &self.bones, |b, w| b.write(w));
    let bone_controller_offset = table(&mut data, &self.controllers, |c, w| c.write(w));
    let hitbox_offset = table(&mut data, &self.hitboxes, |h, w| h.write(w));
    let attachment_offset = table(&mut data, &self.attachments, |a, w| a.write(w));

    let mut descs = Vec::with_capacity(self.sequences.len());
    for sequence in &self.sequences {
      let event_offset = table(&mut data, &sequence.events, |e, w| e.write(w));
      let pivot_offset = table(&mut data, &sequence.pivots, |p, w| p.write(w));
      let buffer = if sequence.group == 0 {
        &mut data
      } else {
        &mut groups[sequence.group as usize - 1]
      };
      let anim_offset = write_animation(buffer, &sequence.blends, bone_count);
      descs.push(SequenceDesc {
        label: to_fixed_string(&sequence.label),
        fps: sequence.fps,
        flags: sequence.flags,
        activity: sequence.activity,
        activity_weight: sequence.activity_weight,
        events_count: sequence.events.len() as i32,
        event_offset,
        frames_count: sequence.frames,
        pivots_count: sequence.pivots.len() as i32,
        pivot_offset,
        motion_type: sequence.motion_type,
        motion_bone: sequence.motion_bone,
        linear_movement: sequence.linear_movement,
        auto_move_pos_index: 0,
        auto_move_angle_index: 0,
        bb_min: sequence.bb_min,
        bb_max: sequence.bb_max,
        blends_count: sequence.blends.len().max(1) as i32,
        anim_offset,
        blend_type: sequence.blend_type,
        blend_start: sequence.blend_start,
        blend_end: sequence.blend_end,
        blend_parent: 0,
        sequence_group: sequence.group,
        entry_node: 0,
        exit_node: 0,
        node_flags: 0,
        next_sequence: 0
      });
    }
    let sequence_offset = table(&mut data, &descs, |s, w| s.write(w));

    let stem = self.name.strip_suffix(".mdl").unwrap_or(&self.name).to_string();
    let sequence_groups: Vec<SequenceGroup> = (0..self.sequence_group_count)
      .map(|i| SequenceGroup {
        label: to_fixed_string("default"),
        name: if i == 0 {
          [0u8; 64]
        } else {
          to_fixed_string(&format!("models/{}{:02}.mdl", stem, i))
        },
        cache: 0,
        data: 0
      })
      .collect();
    let sequence_group_offset = table(&mut data, &sequence_groups, |g, w| g.write(w));

    let mut base = 1;
    let mut body_parts = Vec::with_capacity(self.body_parts.len());
    for (name, models) in &self.body_parts {
      let mut model_descs = Vec::with_capacity(models.len());
      for model in models {
        model_descs.push(write_model(&mut data, model));
      }
      let model_offset = table(&mut data, &model_descs, |m, w| m.write(w));
      body_parts.push(BodyPart {
        name: to_fixed_string(name),
        models_count: models.len() as i32,
        base,
        model_offset
      });
      base *= models.len().max(1) as i32;
    }
    let body_part_offset = table(&mut data, &body_parts, |b, w| b.write(w));

    let texture_data_offset = data.len() as i32;
    let mut textures = Vec::with_capacity(self.textures.len());
    for texture in &self.textures {
      let index = data.len() as i32;
      data.extend_from_slice(&texture.pixels);
      data.extend_from_slice(&texture.palette);
      textures.push(Texture {
        name: to_fixed_string(&texture.name),
        flags: texture.flags,
        width: texture.width,
        height: texture.height,
        index
      });
    }
    let texture_offset = table(&mut data, &textures, |t, w| t.write(w));

    let skin_families = if self.skin_families.is_empty() && !self.textures.is_empty() {
      vec![(0..self.textures.len() as i16).collect()]
    } else {
      self.skin_families
    };
    let skin_reference_count = skin_families.first().map_or(0, |f| f.len()) as i32;
    let skin_offset = data.len() as i32;
    for family in &skin_families {
      for index in family {
        data.write_i16(*index).expect("writing to a Vec");
      }
    }

    let transition_offset = data.len() as i32;
    for row in &self.transitions {
      data.extend_from_slice(row);
    }

    let header = Header {
      id: STUDIO_HEADER_ID,
      version: STUDIO_VERSION,
      name: to_fixed_string(&self.name),
      length: data.len() as i32,
      eye_position: self.eye_position,
      min: self.min,
      max: self.max,
      bb_min: self.bb_min,
      bb_max: self.bb_max,
      flags: self.flags,
      bone_count: bone_count as i32,
      bone_offset,
      bone_controller_count: self.controllers.len() as i32,
      bone_controller_offset,
      hitbox_count: self.hitboxes.len() as i32,
      hitbox_offset,
      sequence_count: descs.len() as i32,
      sequence_offset,
      sequence_group_count: sequence_groups.len() as i32,
      sequence_group_offset,
      texture_count: textures.len() as i32,
      texture_offset: if textures.is_empty() { 0 } else { texture_offset },
      texture_data_offset: if textures.is_empty() { 0 } else { texture_data_offset },
      skin_reference_count,
      skin_family_count: skin_families.len() as i32,
      skin_offset: if skin_families.is_empty() { 0 } else { skin_offset },
      body_part_count: body_parts.len() as i32,
      body_part_offset,
      attachment_count: self.attachments.len() as i32,
      attachment_offset,
      sound_table: 0,
      sound_offset: 0,
      sound_groups: 0,
      sound_group_offset: 0,
      transition_count: self.transitions.len() as i32,
      transition_offset
    };
    let mut header_bytes = Vec::with_capacity(Header::SIZE);
    header.write(&mut header_bytes).expect("writing to a Vec");
    data[..Header::SIZE].copy_from_slice(&header_bytes);

    for (i, group) in groups.iter_mut().enumerate() {
      let header = SequenceHeader {
        id: SEQUENCE_HEADER_ID,
        version: STUDIO_VERSION,
        name: to_fixed_string(&format!("{}{:02}.mdl", stem, i + 1)),
        length: group.len() as i32
      };
      let mut header_bytes = Vec::with_capacity(SequenceHeader::SIZE);
      header.write(&mut header_bytes).expect("writing to a Vec");
      group[..SequenceHeader::SIZE].copy_from_slice(&header_bytes);
    }

    (data, groups)
  }
}

fn table<T>(data: &mut Vec<u8>, items: &[T], write: impl Fn(&T, &mut Vec<u8>) -> std::io::Result<()>) -> i32 {
  let offset = data.len() as i32;
  for item in items {
    write(item, data).expect("writing to a Vec");
  }
  offset
}

/// Writes the per bone offset block of every blend followed by the value spans.
fn write_animation(data: &mut Vec<u8>, blends: &[Vec<BoneChannels>], bone_count: usize) -> i32 {
  let start = data.len();
  let blend_count = blends.len().max(1);
  data.resize(start + blend_count * bone_count * AnimOffsets::SIZE, 0);

  for (b, bones) in blends.iter().enumerate() {
    for (j, channels) in bones.iter().enumerate().take(bone_count) {
      let anim_position = start + (b * bone_count + j) * AnimOffsets::SIZE;
      let mut offsets = AnimOffsets::default();
      for (axis, spans) in channels.iter().enumerate() {
        if spans.is_empty() {
          continue;
        }
        offsets.offset[axis] = u16::try_from(data.len() - anim_position).expect("animation data too large");
        for value in spans {
          value.write(data).expect("writing to a Vec");
        }
      }
      let mut bytes = Vec::with_capacity(AnimOffsets::SIZE);
      offsets.write(&mut bytes).expect("writing to a Vec");
      data[anim_position..anim_position + AnimOffsets::SIZE].copy_from_slice(&bytes);
    }
  }
  start as i32
}

fn write_model(data: &mut Vec<u8>, model: &ModelBuilderEntry) -> Model {
  let vertex_info_offset = data.len() as i32;
  data.extend(model.vertices.iter().map(|(bone, _)| *bone));
  let vertex_offset = data.len() as i32;
  for (_, v) in &model.vertices {
    write_vec(data, *v);
  }
  let normal_info_offset = data.len() as i32;
  data.extend(model.normals.iter().map(|(bone, _)| *bone));
  let normal_offset = data.len() as i32;
  for (_, n) in &model.normals {
    write_vec(data, *n);
  }

  let mut meshes = Vec::with_capacity(model.meshes.len());
  for mesh in &model.meshes {
    let triangle_offset = data.len() as i32;
    for command in mesh.commands.iter().chain(std::iter::once(&0)) {
      data.write_i16(*command).expect("writing to a Vec");
    }
    meshes.push(Mesh {
      triangles_count: count_triangles(&mesh.commands),
      triangle_offset,
      skin_ref: mesh.skin_ref,
      normals_count: mesh.normals_count,
      normal_offset: 0
    });
  }
  let mesh_offset = table(data, &meshes, |m, w| m.write(w));

  Model {
    name: to_fixed_string(&model.name),
    model_type: 0,
    bounding_radius: model.bounding_radius,
    meshes_count: meshes.len() as i32,
    mesh_offset,
    vertices_count: model.vertices.len() as i32,
    vertex_info_offset,
    vertex_offset,
    normals_count: model.normals.len() as i32,
    normal_info_offset,
    normal_offset,
    groups_count: 0,
    group_offset: 0
  }
}

fn count_triangles(commands: &[i16]) -> i32 {
  let mut triangles = 0;
  let mut i = 0;
  while i < commands.len() {
    let count = commands[i].unsigned_abs() as usize;
    triangles += count.saturating_sub(2) as i32;
    i += 1 + count * 4;
  }
  triangles
}

fn write_vec(data: &mut Vec<u8>, v: Vec3) {
  for c in [v.x, v.y, v.z] {
    data.write_f32(c).expect("writing to a Vec");
  }
}

/// Rewrites the main header of a built file in place.
pub fn edit_header(data: &mut [u8], edit: impl FnOnce(&mut Header)) {
  let mut header = Header::read(&mut &data[..]).expect("built files start with a header");
  edit(&mut header);
  let mut bytes = Vec::with_capacity(Header::SIZE);
  header.write(&mut bytes).expect("writing to a Vec");
  data[..Header::SIZE].copy_from_slice(&bytes);
}
