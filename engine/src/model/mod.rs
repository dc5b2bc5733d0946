mod bone;
mod convert;
mod editable_model;
mod mesh;
mod sequence;
mod texture;

pub use self::bone::{Bone, BoneAxis, BoneController, MOUTH_CONTROLLER, ROTATION_AXIS};
pub use self::editable_model::{Attachment, EditableModel, Hitbox, MeshLocation, SequenceGroup};
pub use self::mesh::{BodyPart, Mesh, RunKind, SubModel, TriangleCommands, TriangleRun, TriangleVertex, Vertex};
pub use self::sequence::{Animation, BlendAxis, Event, Pivot, Sequence};
pub use self::texture::Texture;
