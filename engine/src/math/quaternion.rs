use bevy_math::{EulerRot, Quat, Vec3};

/// Quaternion of the rotation described by `angles` in radians: roll around X,
/// pitch around Y and yaw around Z, applied in that order.
pub fn angle_quaternion(angles: Vec3) -> Quat {
  let (sy, cy) = (angles.z * 0.5).sin_cos();
  let (sp, cp) = (angles.y * 0.5).sin_cos();
  let (sr, cr) = (angles.x * 0.5).sin_cos();

  Quat::from_xyzw(
    sr * cp * cy - cr * sp * sy,
    cr * sp * cy + sr * cp * sy,
    cr * cp * sy - sr * sp * cy,
    cr * cp * cy + sr * sp * sy
  )
}

/// Inverse of [`angle_quaternion`].
pub fn quaternion_angles(q: Quat) -> Vec3 {
  let (yaw, pitch, roll) = q.to_euler(EulerRot::ZYX);
  Vec3::new(roll, pitch, yaw)
}

/// Spherical interpolation that always takes the shorter arc and falls back to a linear
/// blend for nearly identical inputs.
pub fn quaternion_slerp(p: Quat, q: Quat, t: f32) -> Quat {
  let p = p.to_array();
  let mut q = q.to_array();

  let mut a = 0.0f32;
  let mut b = 0.0f32;
  for i in 0..4 {
    a += (p[i] - q[i]) * (p[i] - q[i]);
    b += (p[i] + q[i]) * (p[i] + q[i]);
  }
  if a > b {
    for v in &mut q {
      *v = -*v;
    }
  }

  let cosom = p[0] * q[0] + p[1] * q[1] + p[2] * q[2] + p[3] * q[3];
  let mut qt = [0f32; 4];

  if (1.0 + cosom) > 0.000001 {
    let (sclp, sclq) = if (1.0 - cosom) > 0.000001 {
      let omega = cosom.acos();
      let sinom = omega.sin();
      (((1.0 - t) * omega).sin() / sinom, (t * omega).sin() / sinom)
    } else {
      (1.0 - t, t)
    };
    for i in 0..4 {
      qt[i] = sclp * p[i] + sclq * q[i];
    }
  } else {
    qt = [-q[1], q[0], -q[3], q[2]];
    let sclp = ((1.0 - t) * (0.5 * std::f32::consts::PI)).sin();
    let sclq = (t * (0.5 * std::f32::consts::PI)).sin();
    for i in 0..3 {
      qt[i] = sclp * p[i] + sclq * qt[i];
    }
  }

  Quat::from_array(qt)
}
