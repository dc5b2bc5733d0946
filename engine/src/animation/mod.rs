mod anim_value;
mod bone_transformer;

pub use self::anim_value::{encode_values, sample_position, sample_rotation};
pub use self::bone_transformer::{BoneTransform, BoneTransformInput, BoneTransformer, CONTROLLER_COUNT};
