#[macro_use]
extern crate bitflags;

pub mod animation;
pub mod math;
pub mod model;
pub mod transform;
