use glam::Vec3;

use crate::world::{Aabb, Child, LeafList, ModelId};

/// World-space position (`"origin"` key).
#[derive(Debug, Clone, Copy)]
pub struct Origin(pub Vec3);

#[derive(Debug, Clone)]
pub struct Classname(pub String);

/// `name` / `targetname`, used by trigger chains.
#[derive(Debug, Clone)]
pub struct Name(pub String);

/// Index into the map's entity property list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertiesIndex(pub usize);

/// Entity drawn and collided through one of the level's submodels.
#[derive(Debug, Clone, Copy)]
pub struct BrushModel {
    pub model: ModelId,
    pub head: Child,
    /// Submodel bounds moved by `offset`.
    pub bounds: Aabb,
    /// Displacement of the model from where it was compiled.
    pub offset: Vec3,
}

/// Leaves the entity touches, refreshed every tic.
#[derive(Debug, Clone, Default)]
pub struct LeafLink(pub LeafList);
