#[macro_use]
extern crate bitflags;

mod read_util;
mod header;
mod bone;
mod bone_controller;
mod hitbox;
mod sequence_group;
mod sequence_desc;
mod event;
mod pivot;
mod attachment;
mod anim;
mod body_part;
mod model;
mod mesh;
mod texture;
mod skin_table;
mod error;
mod model_file;
mod loader;
mod save;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use self::read_util::{fixed_string_lossy, to_fixed_string, PrimitiveRead, PrimitiveWrite, RawDataRead};
pub use self::header::{Header, ModelFlags, SequenceHeader, SEQUENCE_HEADER_ID, STUDIO_HEADER_ID, STUDIO_VERSION};
pub use self::bone::{Bone, AXIS_COUNT};
pub use self::bone_controller::{BoneController, MotionFlags};
pub use self::hitbox::Hitbox;
pub use self::sequence_group::SequenceGroup;
pub use self::sequence_desc::{SequenceDesc, SequenceFlags};
pub use self::event::Event;
pub use self::pivot::Pivot;
pub use self::attachment::Attachment;
pub use self::anim::{AnimOffsets, AnimValue};
pub use self::body_part::BodyPart;
pub use self::model::Model;
pub use self::mesh::Mesh;
pub use self::texture::{Texture, TextureFlags, PALETTE_SIZE};
pub use self::skin_table::SkinTable;
pub use self::error::AssetError;
pub use self::model_file::{StudioBuffer, StudioFile};
pub use self::loader::{
  load_model, sequence_group_file_path, texture_file_path, ContainerKind, LoadOptions, LoadedFile, RawModel,
  TEXTURE_FILE_SUFFIX
};
pub use self::save::{save_model, SaveOptions};
