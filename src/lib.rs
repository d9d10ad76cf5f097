pub mod aabb;
pub mod camera;
pub mod codec;
pub mod config;
pub mod driver;
pub mod events;
pub mod grid;
pub mod io;
pub mod pattern;
pub mod rule_set;

pub type ScreenSize = u16;
pub type Coord = i64;
