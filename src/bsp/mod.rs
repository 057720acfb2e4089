pub mod entities;
pub mod level;
pub mod loader;
pub mod raw;

#[cfg(test)]
pub(crate) mod testutil;

pub use entities::{EntityError, EntityProperties, parse_entities};
pub use loader::{LoadError, load_entities, load_level};
pub use raw::{BspError, BspFile, LumpKind};
