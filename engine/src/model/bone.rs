use hlstudio_mdl::{MotionFlags, AXIS_COUNT};

/// Index of the first rotation channel of a bone.
pub const ROTATION_AXIS: usize = 3;

/// Controller slot driven by the mouth value instead of the four controller bytes.
pub const MOUTH_CONTROLLER: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoneAxis {
  /// Value of the channel when it is not animated.
  pub value: f32,
  /// Multiplier applied to the stored animation values.
  pub scale: f32,
  /// Index into [`EditableModel::bone_controllers`](super::EditableModel::bone_controllers).
  pub controller: Option<usize>
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
  pub name: String,
  /// Always refers to a bone with a lower index.
  pub parent: Option<usize>,
  pub flags: i32,
  /// X, Y, Z position followed by X, Y, Z rotation in radians.
  pub axes: [BoneAxis; AXIS_COUNT]
}

impl Bone {
  pub fn is_root(&self) -> bool {
    self.parent.is_none()
  }

  pub fn default_position(&self) -> [f32; 3] {
    [self.axes[0].value, self.axes[1].value, self.axes[2].value]
  }

  pub fn default_rotation(&self) -> [f32; 3] {
    [self.axes[3].value, self.axes[4].value, self.axes[5].value]
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoneController {
  pub bone: usize,
  pub controller_type: MotionFlags,
  pub start: f32,
  pub end: f32,
  pub rest: i32,
  /// Input slot: 0 to 3 read the controller bytes, [`MOUTH_CONTROLLER`] reads the mouth.
  pub index: i32,
  /// Position of the controller in the model's controller list.
  pub array_index: usize
}

impl BoneController {
  pub fn is_looping(&self) -> bool {
    self.controller_type.contains(MotionFlags::RLOOP)
  }

  pub fn is_rotation(&self) -> bool {
    self
      .controller_type
      .intersects(MotionFlags::XR | MotionFlags::YR | MotionFlags::ZR)
  }

  pub fn is_mouth(&self) -> bool {
    self.index > 3
  }

  /// The bone channel the controller adds to.
  pub fn axis(&self) -> Option<usize> {
    [
      MotionFlags::X,
      MotionFlags::Y,
      MotionFlags::Z,
      MotionFlags::XR,
      MotionFlags::YR,
      MotionFlags::ZR
    ]
    .iter()
    .position(|flag| self.controller_type.contains(*flag))
  }

  /// Controller byte that produces `value` (degrees for rotations).
  pub fn value_to_byte(&self, value: f32) -> u8 {
    if self.is_looping() {
      let steps = ((value - self.start) * (256.0 / 360.0)).round() as i32;
      return steps.rem_euclid(256) as u8;
    }
    (normalized(value, self.start, self.end) * 255.0).round() as u8
  }

  /// Mouth byte that produces `value`. Only bytes up to 64 are distinguishable.
  pub fn mouth_value_to_byte(&self, value: f32) -> u8 {
    (normalized(value, self.start, self.end) * 64.0).round() as u8
  }
}

fn normalized(value: f32, start: f32, end: f32) -> f32 {
  if end == start {
    return 0.0;
  }
  ((value - start) / (end - start)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn controller(controller_type: MotionFlags, start: f32, end: f32) -> BoneController {
    BoneController {
      bone: 0,
      controller_type,
      start,
      end,
      rest: 0,
      index: 0,
      array_index: 0
    }
  }

  #[test]
  fn controller_axis_follows_type() {
    assert_eq!(controller(MotionFlags::Y, 0.0, 1.0).axis(), Some(1));
    assert_eq!(controller(MotionFlags::ZR | MotionFlags::RLOOP, 0.0, 360.0).axis(), Some(5));
    assert_eq!(controller(MotionFlags::LX, 0.0, 1.0).axis(), None);

    assert!(controller(MotionFlags::ZR | MotionFlags::RLOOP, 0.0, 360.0).is_rotation());
    assert!(!controller(MotionFlags::Y, 0.0, 1.0).is_rotation());
  }

  #[test]
  fn value_to_byte_inverts_ranges() {
    let head = controller(MotionFlags::YR, -60.0, 60.0);
    assert_eq!(head.value_to_byte(-60.0), 0);
    assert_eq!(head.value_to_byte(60.0), 255);
    assert_eq!(head.value_to_byte(500.0), 255);
    assert_eq!(head.value_to_byte(0.0), 128);

    let spin = controller(MotionFlags::ZR | MotionFlags::RLOOP, 0.0, 360.0);
    assert_eq!(spin.value_to_byte(90.0), 64);
    assert_eq!(spin.value_to_byte(-90.0), 192);
    assert_eq!(spin.value_to_byte(360.0), 0);

    let jaw = controller(MotionFlags::XR, 0.0, 30.0);
    assert_eq!(jaw.mouth_value_to_byte(30.0), 64);
    assert_eq!(jaw.mouth_value_to_byte(15.0), 32);
  }
}
