//! Decoding and encoding of animation value spans.
//!
//! A channel is a list of runs. Each run starts with a header holding `valid` and
//! `total`, followed by `valid` explicit values. Frames past `valid` but inside
//! `total` repeat the last explicit value.

use hlstudio_mdl::AnimValue;

/// Longest run a header can describe.
const MAX_RUN: usize = u8::MAX as usize;

/// Header index of the run containing `frame` and the frame's offset inside it.
fn locate(values: &[AnimValue], frame: usize) -> Option<(usize, usize)> {
  let mut run = 0;
  let mut k = frame;
  loop {
    let header = values.get(run)?;
    let total = header.total() as usize;
    // A run holding more values than frames restarts at its first value.
    if total < header.valid() as usize {
      k = 0;
    }
    if total > k {
      return Some((run, k));
    }
    if total == 0 {
      return None;
    }
    k -= total;
    run += header.valid() as usize + 1;
  }
}

/// Frames past the stored runs read the last explicit value.
fn value_at(values: &[AnimValue], index: usize) -> i16 {
  values.get(index).or(values.last()).map_or(0, |v| v.value())
}

/// The two stored rotation values to interpolate between for `frame` and `frame + 1`.
/// Returns `None` for an unanimated channel.
pub fn sample_rotation(values: &[AnimValue], frame: usize) -> Option<(i16, i16)> {
  if values.is_empty() {
    return None;
  }
  let Some((run, k)) = locate(values, frame) else {
    let last = value_at(values, values.len());
    return Some((last, last));
  };
  let header = values[run];
  let valid = header.valid() as usize;
  let total = header.total() as usize;
  let v = |i: usize| value_at(values, run + i);

  if valid > k {
    let a1 = v(k + 1);
    let a2 = if valid > k + 1 {
      v(k + 2)
    } else if total > k + 1 {
      a1
    } else {
      v(valid + 2)
    };
    Some((a1, a2))
  } else {
    let a1 = v(valid);
    let a2 = if total > k + 1 { a1 } else { v(valid + 2) };
    Some((a1, a2))
  }
}

/// The stored position value at `frame` blended towards the next frame by `s`.
/// Unlike rotations, the last explicit value of a run never looks into the next run.
pub fn sample_position(values: &[AnimValue], frame: usize, s: f32) -> Option<f32> {
  if values.is_empty() {
    return None;
  }
  let Some((run, k)) = locate(values, frame) else {
    return Some(value_at(values, values.len()) as f32);
  };
  let header = values[run];
  let valid = header.valid() as usize;
  let total = header.total() as usize;
  let v = |i: usize| value_at(values, run + i) as f32;

  if valid > k {
    if valid > k + 1 {
      Some(v(k + 1) * (1.0 - s) + s * v(k + 2))
    } else {
      Some(v(k + 1))
    }
  } else if total <= k + 1 {
    Some(v(valid) * (1.0 - s) + s * v(valid + 2))
  } else {
    Some(v(valid))
  }
}

/// Compresses one value per frame into runs. Repeats of a run's last value are folded
/// into its tail. A channel that is zero everywhere encodes to an empty list.
pub fn encode_values(frames: &[i16]) -> Vec<AnimValue> {
  if frames.iter().all(|v| *v == 0) {
    return Vec::new();
  }

  let mut values = Vec::new();
  let mut i = 0;
  while i < frames.len() {
    let start = i;
    i += 1;
    while i < frames.len() && i - start < MAX_RUN && frames[i] != frames[i - 1] {
      i += 1;
    }
    let valid = i - start;
    while i < frames.len() && i - start < MAX_RUN && frames[i] == frames[i - 1] {
      i += 1;
    }
    let total = i - start;

    values.push(AnimValue::header(valid as u8, total as u8));
    values.extend(frames[start..start + valid].iter().map(|v| AnimValue::from_value(*v)));
  }
  values
}
