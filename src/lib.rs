pub mod bsp;
pub mod defs;
pub mod map;
pub mod sim;
pub mod world;

pub use map::{FaceSink, Map};
