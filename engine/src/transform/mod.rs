//! Reversible whole-model edits.
//!
//! Every operation is split into a snapshot taken before the first change and an `apply`
//! that recomputes the edited values from that snapshot. Passing `None` to `apply`
//! writes the captured values back unchanged.

mod rotate;
mod scale;
mod texture_coordinates;
mod translate;

pub use self::rotate::RotateSnapshot;
pub use self::scale::{ScaleFlags, ScaleSnapshot};
pub use self::texture_coordinates::{TextureCoordinateScale, TextureCoordinateSnapshot};
pub use self::translate::TranslateSnapshot;
