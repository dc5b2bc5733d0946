mod bounding_box;
mod quaternion;

pub use self::bounding_box::BoundingBox;
pub use self::quaternion::{angle_quaternion, quaternion_angles, quaternion_slerp};
