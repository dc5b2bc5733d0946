use bevy_math::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
  pub min: Vec3,
  pub max: Vec3
}

impl BoundingBox {
  pub fn new(min: Vec3, max: Vec3) -> Self {
    Self {
      min,
      max
    }
  }

  /// Smallest box containing every point, `None` for an empty set.
  pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
    let mut points = points.into_iter();
    let first = points.next()?;
    Some(points.fold(Self::new(first, first), |b, p| Self::new(b.min.min(p), b.max.max(p))))
  }

  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encloses_points() {
    let bounds = BoundingBox::from_points([Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 4.0, 2.0)]).unwrap();
    assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
    assert_eq!(bounds.max, Vec3::new(1.0, 4.0, 2.0));
    assert_eq!(bounds.center(), Vec3::new(0.0, 1.0, 1.0));
    assert!(BoundingBox::from_points(Vec::<Vec3>::new()).is_none());
  }
}
