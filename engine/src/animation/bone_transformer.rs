use std::f32::consts::PI;

use bevy_math::{Mat4, Quat, Vec3};
use log::trace;

use hlstudio_mdl::MotionFlags;

use super::anim_value::{sample_position, sample_rotation};
use crate::math::{angle_quaternion, quaternion_slerp};
use crate::model::{Animation, Bone, BoneController, EditableModel, Sequence, ROTATION_AXIS};

/// Number of controller bytes. Controllers with a higher slot read the mouth value.
pub const CONTROLLER_COUNT: usize = 4;

/// Blend sources evaluated at once: the corners of one quadrant of a 3x3 grid.
const STATE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransformInput {
  /// Sequence to evaluate. `-1` evaluates no animation at all, other out of range
  /// values fall back to sequence 0.
  pub sequence: i32,
  pub frame: f32,
  /// Applied to root bones after their own rotation and translation.
  pub scale: Vec3,
  pub blending: [u8; 2],
  pub controllers: [u8; CONTROLLER_COUNT],
  pub mouth: u8
}

impl Default for BoneTransformInput {
  fn default() -> Self {
    Self {
      sequence: 0,
      frame: 0.0,
      scale: Vec3::ONE,
      blending: [0; 2],
      controllers: [0; CONTROLLER_COUNT],
      mouth: 0
    }
  }
}

/// Bone local rotation and position of one evaluated blend source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
  pub rotation: Quat,
  pub position: Vec3
}

impl Default for BoneTransform {
  fn default() -> Self {
    Self {
      rotation: Quat::IDENTITY,
      position: Vec3::ZERO
    }
  }
}

/// Evaluates poses. The scratch buffers are reused between calls, so one transformer
/// serves one caller at a time.
#[derive(Default)]
pub struct BoneTransformer {
  states: [Vec<BoneTransform>; STATE_COUNT],
  adjustments: Vec<f32>,
  matrices: Vec<Mat4>
}

impl BoneTransformer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Bone to model space matrices of the pose described by `input`, one per bone.
  pub fn setup_bones(&mut self, model: &EditableModel, input: &BoneTransformInput) -> &[Mat4] {
    let bone_count = model.bones.len();
    for state in &mut self.states {
      state.clear();
      state.resize(bone_count, BoneTransform::default());
    }
    self.matrices.clear();

    let empty;
    let sequence = match usize::try_from(input.sequence).ok().and_then(|i| model.sequences.get(i)) {
      Some(sequence) => sequence,
      None if input.sequence != -1 && !model.sequences.is_empty() => {
        trace!("Sequence {} is out of range, using sequence 0", input.sequence);
        &model.sequences[0]
      }
      None => {
        trace!("Sequence {} is disabled, evaluating the rest pose", input.sequence);
        empty = Sequence::empty(0);
        &empty
      }
    };

    calculate_bone_adjust(&model.bone_controllers, input, &mut self.adjustments);
    let frame = input.frame.max(0.0);
    let [first, second, third, fourth] = &mut self.states;

    match sequence.blend_count() {
      9 => {
        let (s, column) = grid_blend(input.blending[0] as f32);
        let (t, row) = grid_blend(input.blending[1] as f32);
        let base = row * 3 + column;
        let indices = [base, base + 1, base + 3, base + 4];
        for (state, blend) in [&mut *first, &mut *second, &mut *third, &mut *fourth].into_iter().zip(indices) {
          calculate_rotations(&model.bones, sequence, blend, frame, &self.adjustments, state);
        }
        slerp_bones(first, second, s / 255.0);
        slerp_bones(third, fourth, s / 255.0);
        slerp_bones(first, third, t / 255.0);
      }
      count => {
        calculate_rotations(&model.bones, sequence, 0, frame, &self.adjustments, first);
        if count > 1 {
          calculate_rotations(&model.bones, sequence, 1, frame, &self.adjustments, second);
          let s = input.blending[0] as f32 / 255.0;
          slerp_bones(first, second, s);

          if count == 4 {
            calculate_rotations(&model.bones, sequence, 2, frame, &self.adjustments, third);
            calculate_rotations(&model.bones, sequence, 3, frame, &self.adjustments, fourth);
            slerp_bones(third, fourth, input.blending[0] as f32 / 255.0);
            slerp_bones(first, third, input.blending[1] as f32 / 255.0);
          }
        }
      }
    }

    for (i, bone) in model.bones.iter().enumerate() {
      let transform = &first[i];
      let local = Mat4::from_rotation_translation(transform.rotation, transform.position);
      let world = match bone.parent.and_then(|p| self.matrices.get(p)) {
        Some(parent) => *parent * local,
        None => Mat4::from_scale(input.scale) * local
      };
      self.matrices.push(world);
    }
    &self.matrices
  }

  /// Matrices of the last evaluated pose.
  pub fn bone_matrices(&self) -> &[Mat4] {
    &self.matrices
  }
}

/// Splits a grid blend byte at 127 into the interpolant inside the selected half and
/// the grid column (or row) that half starts at.
fn grid_blend(value: f32) -> (f32, usize) {
  if value <= 127.0 {
    (value * 2.0, 0)
  } else {
    ((value - 127.0) * 2.0, 1)
  }
}

/// Controller values in their native units, indexed like the model's controllers.
fn calculate_bone_adjust(controllers: &[BoneController], input: &BoneTransformInput, adjustments: &mut Vec<f32>) {
  adjustments.clear();
  for controller in controllers {
    let value = if controller.index <= 3 {
      let byte = usize::try_from(controller.index)
        .ok()
        .and_then(|i| input.controllers.get(i))
        .copied()
        .unwrap_or(0) as f32;
      if controller.is_looping() {
        byte * (360.0 / 256.0) + controller.start
      } else {
        let value = (byte / 255.0).clamp(0.0, 1.0);
        (1.0 - value) * controller.start + value * controller.end
      }
    } else {
      let value = (input.mouth as f32 / 64.0).min(1.0);
      (1.0 - value) * controller.start + value * controller.end
    };

    let adjustment = if controller.is_rotation() {
      value * (PI / 180.0)
    } else if controller.controller_type.intersects(MotionFlags::X | MotionFlags::Y | MotionFlags::Z) {
      value
    } else {
      0.0
    };
    adjustments.push(adjustment);
  }
}

fn calculate_rotations(
  bones: &[Bone],
  sequence: &Sequence,
  blend: usize,
  frame: f32,
  adjustments: &[f32],
  transforms: &mut [BoneTransform]
) {
  let whole = frame.trunc();
  let s = frame - whole;
  let frame = whole as usize;
  let unanimated = Animation::default();

  for (i, (bone, transform)) in bones.iter().zip(transforms.iter_mut()).enumerate() {
    let animation = sequence.animation(blend, i).unwrap_or(&unanimated);
    transform.rotation = calculate_bone_quaternion(frame, s, bone, animation, adjustments);
    transform.position = calculate_bone_position(frame, s, bone, animation, adjustments);
  }

  if let Some(motion) = usize::try_from(sequence.motion_bone).ok().and_then(|b| transforms.get_mut(b)) {
    if sequence.motion_type.contains(MotionFlags::X) {
      motion.position.x = 0.0;
    }
    if sequence.motion_type.contains(MotionFlags::Y) {
      motion.position.y = 0.0;
    }
    if sequence.motion_type.contains(MotionFlags::Z) {
      motion.position.z = 0.0;
    }
  }
}

fn adjustment(bone: &Bone, axis: usize, adjustments: &[f32]) -> f32 {
  bone.axes[axis]
    .controller
    .and_then(|c| adjustments.get(c))
    .copied()
    .unwrap_or(0.0)
}

fn calculate_bone_quaternion(frame: usize, s: f32, bone: &Bone, animation: &Animation, adjustments: &[f32]) -> Quat {
  let mut angle1 = [0f32; 3];
  let mut angle2 = [0f32; 3];

  for j in 0..3 {
    let axis = &bone.axes[ROTATION_AXIS + j];
    match sample_rotation(&animation.values[ROTATION_AXIS + j], frame) {
      Some((a1, a2)) => {
        angle1[j] = axis.value + a1 as f32 * axis.scale;
        angle2[j] = axis.value + a2 as f32 * axis.scale;
      }
      None => {
        angle1[j] = axis.value;
        angle2[j] = axis.value;
      }
    }

    if axis.controller.is_some() {
      let adj = adjustment(bone, ROTATION_AXIS + j, adjustments);
      angle1[j] += adj;
      angle2[j] += adj;
    }
  }

  if angle1 != angle2 {
    let q1 = angle_quaternion(Vec3::from_array(angle1));
    let q2 = angle_quaternion(Vec3::from_array(angle2));
    quaternion_slerp(q1, q2, s)
  } else {
    angle_quaternion(Vec3::from_array(angle1))
  }
}

fn calculate_bone_position(frame: usize, s: f32, bone: &Bone, animation: &Animation, adjustments: &[f32]) -> Vec3 {
  let mut position = [0f32; 3];
  for j in 0..3 {
    let axis = &bone.axes[j];
    position[j] = axis.value;
    if let Some(value) = sample_position(&animation.values[j], frame, s) {
      position[j] += value * axis.scale;
    }
    if axis.controller.is_some() {
      position[j] += adjustment(bone, j, adjustments);
    }
  }
  Vec3::from_array(position)
}

/// Blends `to` into `from` by `s`, clamped to `[0, 1]`.
fn slerp_bones(from: &mut [BoneTransform], to: &[BoneTransform], s: f32) {
  let s = s.clamp(0.0, 1.0);
  let s1 = 1.0 - s;
  for (a, b) in from.iter_mut().zip(to) {
    a.rotation = quaternion_slerp(a.rotation, b.rotation, s);
    a.position = a.position * s1 + b.position * s;
  }
}

#[cfg(test)]
mod tests {
  use std::f32::consts::FRAC_PI_2;

  use hlstudio_mdl::AXIS_COUNT;

  use super::*;
  use crate::animation::encode_values;
  use crate::model::BoneAxis;

  fn bone(parent: Option<usize>, values: [f32; AXIS_COUNT], scale: f32) -> Bone {
    Bone {
      name: String::new(),
      parent,
      flags: 0,
      axes: values.map(|value| BoneAxis {
        value,
        scale,
        controller: None
      })
    }
  }

  fn channels(channels: &[(usize, &[i16])]) -> Animation {
    let mut animation = Animation::default();
    for (axis, values) in channels {
      animation.values[*axis] = encode_values(values);
    }
    animation
  }

  fn sequence(frames: i32, animations: Vec<Vec<Animation>>) -> Sequence {
    let mut sequence = Sequence::empty(0);
    sequence.frame_count = frames;
    sequence.animations = animations;
    sequence
  }

  fn model(bones: Vec<Bone>, sequences: Vec<Sequence>) -> EditableModel {
    EditableModel {
      bones,
      sequences,
      ..EditableModel::default()
    }
  }

  fn input(sequence: i32, frame: f32) -> BoneTransformInput {
    BoneTransformInput {
      sequence,
      frame,
      ..BoneTransformInput::default()
    }
  }

  fn position(matrix: &Mat4) -> Vec3 {
    matrix.w_axis.truncate()
  }

  fn posed() -> EditableModel {
    model(
      vec![
        bone(None, [1.0, 2.0, 3.0, 0.0, 0.0, FRAC_PI_2], 1.0),
        bone(Some(0), [4.0, 0.0, 0.0, 0.0, 0.0, 0.0], 1.0)
      ],
      vec![sequence(2, vec![vec![channels(&[(0, &[50, 60])]), channels(&[(5, &[30, 40])])]])]
    )
  }

  #[test]
  fn disabled_sequence_evaluates_rest_pose() {
    let model = posed();
    let mut transformer = BoneTransformer::new();
    let matrices = transformer.setup_bones(&model, &input(-1, 1.0)).to_vec();

    let root_rotation = angle_quaternion(Vec3::new(0.0, 0.0, FRAC_PI_2));
    let root = Mat4::from_rotation_translation(root_rotation, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(matrices[0], root);
    assert!(position(&matrices[1]).abs_diff_eq(Vec3::new(1.0, 6.0, 3.0), 1e-5));
  }

  #[test]
  fn out_of_range_sequence_falls_back_to_first() {
    let model = posed();
    let mut transformer = BoneTransformer::new();
    let first = transformer.setup_bones(&model, &input(0, 0.0)).to_vec();
    let fallback = transformer.setup_bones(&model, &input(12, 0.0)).to_vec();
    assert_eq!(first, fallback);
    assert_eq!(position(&first[0]).x, 51.0);

    let no_sequences = model_without_sequences();
    let matrices = transformer.setup_bones(&no_sequences, &input(3, 0.0));
    assert_eq!(position(&matrices[0]), Vec3::new(1.0, 2.0, 3.0));
  }

  fn model_without_sequences() -> EditableModel {
    let mut model = posed();
    model.sequences.clear();
    model
  }

  #[test]
  fn equal_endpoints_build_quaternion_directly() {
    let value = 0.25f32;
    let scale = 0.01f32;
    let mut root = bone(None, [0.0; AXIS_COUNT], scale);
    root.axes[5].value = value;
    let model = model(vec![root], vec![sequence(2, vec![vec![channels(&[(5, &[100, 100])])]])]);

    let mut transformer = BoneTransformer::new();
    let matrices = transformer.setup_bones(&model, &input(0, 0.5));
    let expected = angle_quaternion(Vec3::new(0.0, 0.0, value + 100.0 * scale));
    assert_eq!(matrices[0], Mat4::from_rotation_translation(expected, Vec3::ZERO));
  }

  #[test]
  fn interpolates_between_frames() {
    let model = model(
      vec![bone(None, [0.0; AXIS_COUNT], 0.01)],
      vec![sequence(2, vec![vec![channels(&[(0, &[0, 1000]), (5, &[0, 100])])]])]
    );
    let mut transformer = BoneTransformer::new();
    let matrices = transformer.setup_bones(&model, &input(0, 0.25));
    assert!((position(&matrices[0]).x - 2.5).abs() < 1e-5);
    let rotated = matrices[0].transform_vector3(Vec3::X);
    assert!(rotated.abs_diff_eq(Vec3::new(0.25f32.cos(), 0.25f32.sin(), 0.0), 1e-5));
  }

  #[test]
  fn negative_frames_clamp_to_zero() {
    let model = posed();
    let mut transformer = BoneTransformer::new();
    let start = transformer.setup_bones(&model, &input(0, 0.0)).to_vec();
    assert_eq!(transformer.setup_bones(&model, &input(0, -3.5)), start.as_slice());
  }

  #[test]
  fn motion_axes_are_zeroed() {
    let mut walk = sequence(1, vec![vec![channels(&[(0, &[10]), (1, &[10])])]]);
    walk.motion_type = MotionFlags::X | MotionFlags::Z;
    walk.motion_bone = 0;
    let model = model(vec![bone(None, [0.0, 0.0, 36.0, 0.0, 0.0, 0.0], 1.0)], vec![walk]);

    let mut transformer = BoneTransformer::new();
    let matrices = transformer.setup_bones(&model, &input(0, 0.0));
    assert_eq!(position(&matrices[0]), Vec3::new(0.0, 10.0, 0.0));
  }

  #[test]
  fn root_scale_applies_after_bone_transform() {
    let model = model(vec![bone(None, [1.0, 0.0, 0.0, 0.0, 0.0, FRAC_PI_2], 1.0)], Vec::new());
    let mut transformer = BoneTransformer::new();
    let input = BoneTransformInput {
      sequence: -1,
      scale: Vec3::new(2.0, 1.0, 1.0),
      ..BoneTransformInput::default()
    };
    let matrices = transformer.setup_bones(&model, &input);
    assert!(matrices[0].transform_point3(Vec3::X).abs_diff_eq(Vec3::new(2.0, 1.0, 0.0), 1e-5));
  }

  fn controlled_model() -> EditableModel {
    let mut head = bone(None, [0.0; AXIS_COUNT], 1.0);
    head.axes[5].controller = Some(0);
    head.axes[0].controller = Some(1);
    head.axes[4].controller = Some(2);
    let controller = |controller_type, start, end, index, array_index| BoneController {
      bone: 0,
      controller_type,
      start,
      end,
      rest: 0,
      index,
      array_index
    };
    EditableModel {
      bones: vec![head],
      bone_controllers: vec![
        controller(MotionFlags::ZR, 0.0, 90.0, 0, 0),
        controller(MotionFlags::X, 0.0, 8.0, 4, 1),
        controller(MotionFlags::YR | MotionFlags::RLOOP, 0.0, 360.0, 1, 2),
      ],
      ..EditableModel::default()
    }
  }

  #[test]
  fn controllers_adjust_bones() {
    let model = controlled_model();
    let mut transformer = BoneTransformer::new();

    let matrices = transformer.setup_bones(&model, &input(-1, 0.0)).to_vec();
    assert_eq!(matrices[0], Mat4::IDENTITY);

    let input = BoneTransformInput {
      sequence: -1,
      controllers: [255, 64, 0, 0],
      mouth: 32,
      ..BoneTransformInput::default()
    };
    let matrices = transformer.setup_bones(&model, &input);
    assert!((position(&matrices[0]).x - 4.0).abs() < 1e-5);
    let expected = angle_quaternion(Vec3::new(0.0, FRAC_PI_2, FRAC_PI_2));
    let expected = Mat4::from_rotation_translation(expected, Vec3::new(4.0, 0.0, 0.0));
    assert!(matrices[0].abs_diff_eq(expected, 1e-5));

    let input = BoneTransformInput {
      sequence: -1,
      mouth: 200,
      ..BoneTransformInput::default()
    };
    let matrices = transformer.setup_bones(&model, &input).to_vec();
    assert!((position(&matrices[0]).x - 8.0).abs() < 1e-5);
    assert_eq!(transformer.bone_matrices(), matrices.as_slice());
  }

  fn blend_sources(count: usize) -> Sequence {
    sequence(
      1,
      (0..count)
        .map(|b| vec![channels(&[(0, &[(b * 10) as i16])])])
        .collect()
    )
  }

  fn blended_x(model: &EditableModel, blending: [u8; 2]) -> f32 {
    let mut transformer = BoneTransformer::new();
    let input = BoneTransformInput {
      blending,
      ..BoneTransformInput::default()
    };
    position(&transformer.setup_bones(model, &input)[0]).x
  }

  #[test]
  fn two_and_four_way_blends() {
    let two = model(vec![bone(None, [0.0; AXIS_COUNT], 1.0)], vec![blend_sources(2)]);
    assert_eq!(blended_x(&two, [0, 0]), 0.0);
    assert_eq!(blended_x(&two, [255, 0]), 10.0);
    assert!((blended_x(&two, [51, 0]) - 2.0).abs() < 1e-4);

    let four = model(vec![bone(None, [0.0; AXIS_COUNT], 1.0)], vec![blend_sources(4)]);
    assert_eq!(blended_x(&four, [255, 0]), 10.0);
    assert_eq!(blended_x(&four, [0, 255]), 20.0);
    assert_eq!(blended_x(&four, [255, 255]), 30.0);
  }

  #[test]
  fn nine_way_blend_selects_quadrants() {
    let grid = model(vec![bone(None, [0.0; AXIS_COUNT], 1.0)], vec![blend_sources(9)]);
    assert_eq!(blended_x(&grid, [0, 0]), 0.0);
    assert_eq!(blended_x(&grid, [255, 0]), 20.0);
    assert_eq!(blended_x(&grid, [0, 255]), 60.0);
    assert_eq!(blended_x(&grid, [255, 255]), 80.0);
    assert!((blended_x(&grid, [128, 128]) - (40.0 + 40.0 * 2.0 / 255.0)).abs() < 1e-3);
  }

  #[test]
  fn nine_way_tie_break_is_deterministic() {
    let grid = model(vec![bone(None, [0.0; AXIS_COUNT], 1.0)], vec![blend_sources(9)]);
    let first = blended_x(&grid, [127, 127]);
    for _ in 0..4 {
      assert_eq!(blended_x(&grid, [127, 127]), first);
    }
    let a = 254.0 / 255.0;
    assert!((first - 40.0 * a).abs() < 1e-3);
  }
}
