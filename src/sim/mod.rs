mod components;
mod spawn;
mod systems;
mod tic;

pub use components::{BrushModel, Classname, LeafLink, Name, Origin, PropertiesIndex};
pub use systems::link_entities;
pub use tic::{DT, SIM_FPS, TicRunner};
