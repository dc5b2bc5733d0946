use bevy_math::Vec3;
use hlstudio_mdl::{AnimValue, MotionFlags, SequenceFlags, AXIS_COUNT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
  pub frame: i32,
  pub event: i32,
  pub event_type: i32,
  pub options: String
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
  pub origin: Vec3,
  pub start: i32,
  pub end: i32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendAxis {
  pub blend_type: MotionFlags,
  pub start: f32,
  pub end: f32
}

impl Default for BlendAxis {
  fn default() -> Self {
    Self {
      blend_type: MotionFlags::empty(),
      start: 0.0,
      end: 0.0
    }
  }
}

/// Value spans of the six channels of one bone in one blend source.
/// An empty list means the channel keeps the bone's default value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Animation {
  pub values: [Vec<AnimValue>; AXIS_COUNT]
}

impl Animation {
  pub fn is_animated(&self, axis: usize) -> bool {
    !self.values[axis].is_empty()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
  pub label: String,
  pub fps: f32,
  pub flags: SequenceFlags,
  pub activity: i32,
  pub activity_weight: i32,
  /// Sorted by frame.
  pub events: Vec<Event>,
  pub frame_count: i32,
  pub pivots: Vec<Pivot>,
  pub motion_type: MotionFlags,
  pub motion_bone: i32,
  pub linear_movement: Vec3,
  pub bb_min: Vec3,
  pub bb_max: Vec3,
  pub blend: [BlendAxis; 2],
  pub blend_parent: i32,
  pub sequence_group: usize,
  pub entry_node: i32,
  pub exit_node: i32,
  pub node_flags: i32,
  pub next_sequence: i32,
  /// `animations[blend][bone]`, one row per blend source.
  pub animations: Vec<Vec<Animation>>
}

impl Sequence {
  /// A sequence without frames or animation data. Evaluating it leaves every bone at its
  /// default values.
  pub fn empty(bone_count: usize) -> Self {
    Self {
      label: String::new(),
      fps: 0.0,
      flags: SequenceFlags::empty(),
      activity: 0,
      activity_weight: 0,
      events: Vec::new(),
      frame_count: 1,
      pivots: Vec::new(),
      motion_type: MotionFlags::empty(),
      motion_bone: 0,
      linear_movement: Vec3::ZERO,
      bb_min: Vec3::ZERO,
      bb_max: Vec3::ZERO,
      blend: [BlendAxis::default(); 2],
      blend_parent: 0,
      sequence_group: 0,
      entry_node: 0,
      exit_node: 0,
      node_flags: 0,
      next_sequence: 0,
      animations: vec![vec![Animation::default(); bone_count]]
    }
  }

  pub fn blend_count(&self) -> usize {
    self.animations.len()
  }

  pub fn animation(&self, blend: usize, bone: usize) -> Option<&Animation> {
    self.animations.get(blend)?.get(bone)
  }

  pub fn is_looping(&self) -> bool {
    self.flags.contains(SequenceFlags::LOOPING)
  }

  /// Units per second covered by the sequence's linear movement.
  pub fn ground_speed(&self) -> f32 {
    if self.frame_count <= 1 {
      return 0.0;
    }
    self.linear_movement.length() * self.fps / (self.frame_count - 1) as f32
  }

  /// Inserts `event` after all events on the same or an earlier frame.
  pub fn add_event(&mut self, event: Event) {
    let position = self.events.partition_point(|e| e.frame <= event.frame);
    self.events.insert(position, event);
  }

  /// Restores frame order after events were edited in place. Events on the same frame
  /// keep their relative order.
  pub fn sort_events(&mut self) {
    self.events.sort_by_key(|e| e.frame);
  }

  /// Blend byte that selects `value` on blend axis `axis`.
  pub fn blend_value_to_byte(&self, axis: usize, value: f32) -> u8 {
    let Some(blend) = self.blend.get(axis) else {
      return 0;
    };
    if blend.end == blend.start {
      return 0;
    }
    let mut value = value;
    if blend.blend_type.intersects(MotionFlags::XR | MotionFlags::YR | MotionFlags::ZR) {
      if blend.end < blend.start {
        value = -value;
      }
      let middle = (blend.start + blend.end) / 2.0;
      if value > middle + 180.0 {
        value -= 360.0;
      }
      if value < middle - 180.0 {
        value += 360.0;
      }
    }
    let setting = (255.0 * (value - blend.start) / (blend.end - blend.start)) as i32;
    setting.clamp(0, 255) as u8
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn event(frame: i32, event: i32) -> Event {
    Event {
      frame,
      event,
      event_type: 0,
      options: String::new()
    }
  }

  #[test]
  fn events_stay_sorted_and_stable() {
    let mut sequence = Sequence::empty(0);
    sequence.add_event(event(10, 1));
    sequence.add_event(event(2, 2));
    sequence.add_event(event(10, 3));
    sequence.add_event(event(5, 4));
    let ids: Vec<i32> = sequence.events.iter().map(|e| e.event).collect();
    assert_eq!(ids, [2, 4, 1, 3]);

    sequence.events[0].frame = 10;
    sequence.sort_events();
    let ids: Vec<i32> = sequence.events.iter().map(|e| e.event).collect();
    assert_eq!(ids, [4, 2, 1, 3]);
  }

  #[test]
  fn ground_speed_uses_frame_intervals() {
    let mut sequence = Sequence::empty(0);
    sequence.fps = 30.0;
    sequence.frame_count = 31;
    sequence.linear_movement = Vec3::new(0.0, 60.0, 0.0);
    assert_eq!(sequence.ground_speed(), 60.0);

    sequence.frame_count = 1;
    assert_eq!(sequence.ground_speed(), 0.0);
  }

  #[test]
  fn blend_value_maps_range_to_bytes() {
    let mut sequence = Sequence::empty(0);
    sequence.blend[0] = BlendAxis {
      blend_type: MotionFlags::XR,
      start: -45.0,
      end: 45.0
    };
    assert_eq!(sequence.blend_value_to_byte(0, -45.0), 0);
    assert_eq!(sequence.blend_value_to_byte(0, 45.0), 255);
    assert_eq!(sequence.blend_value_to_byte(0, 90.0), 255);
    assert_eq!(sequence.blend_value_to_byte(1, 10.0), 0);
  }
}
