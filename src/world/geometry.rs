use glam::Vec3;

use crate::defs::{ContentFlags, SurfaceFlags};

pub type PlaneId = u32;
pub type NodeId = u32;
pub type LeafId = u32;
pub type BrushId = u32;
pub type BrushSideId = u32;
pub type TexInfoId = u32;
pub type FaceId = u32;
pub type ModelId = u32;

/// Index of the tree root inside `Level::nodes`.
pub const ROOT_NODE: NodeId = 0;

/// Runtime snapshot of one level (immutable after load).
///
/// Every cross reference is an index into one of the flat arrays below and
/// was range-checked by the loader.
#[derive(Debug, Default)]
pub struct Level {
    pub name: String,
    pub planes: Vec<Plane>,
    pub nodes: Vec<Node>,
    pub leaves: Vec<Leaf>,
    pub brushes: Vec<Brush>,
    pub brush_sides: Vec<BrushSide>,
    pub leaf_brushes: Vec<BrushId>,
    pub leaf_faces: Vec<FaceId>,
    pub texinfo: Vec<TexInfo>,
    pub faces: Vec<Face>,
    pub vertices: Vec<Vec3>,
    pub models: Vec<Model>,
}

/*----------------------- simple primitives --------------------------*/

/// Oriented plane `normal · p = dist`, normal of unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/*------------------------------ tree --------------------------------*/

/// Child slot of a node: the tree is acyclic and every path ends in a leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Child {
    Node(NodeId),
    Leaf(LeafId),
}

impl Child {
    /// Decode the on-disk sign encoding (`>= 0` node, `< 0` is `-1 - leaf`).
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        if raw >= 0 {
            Child::Node(raw as NodeId)
        } else {
            Child::Leaf((-1 - raw) as LeafId)
        }
    }
}

pub const FRONT: usize = 0;
pub const BACK: usize = 1;

#[derive(Clone, Debug)]
pub struct Node {
    pub plane: PlaneId,
    /// `[front, back]`
    pub children: [Child; 2],
    pub bounds: Aabb,
    pub first_face: FaceId,
    pub face_count: u32,
}

#[derive(Clone, Debug)]
pub struct Leaf {
    pub contents: ContentFlags,
    /// Visibility cluster, `-1` for solid leaves.
    pub cluster: i16,
    pub area: i16,
    pub bounds: Aabb,
    pub first_leaf_face: u32,
    pub leaf_face_count: u32,
    pub first_leaf_brush: u32,
    pub leaf_brush_count: u32,
}

/*---------------------------- brushes -------------------------------*/

/// Convex volume: intersection of the back half-spaces of its sides.
#[derive(Clone, Debug)]
pub struct Brush {
    pub contents: ContentFlags,
    pub first_side: BrushSideId,
    pub side_count: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct BrushSide {
    pub plane: PlaneId,
    /// `None` for compiler-generated bevel sides.
    pub texinfo: Option<TexInfoId>,
}

/*---------------------------- surfaces ------------------------------*/

#[derive(Clone, Debug)]
pub struct TexInfo {
    pub flags: SurfaceFlags,
    pub texture: String,
}

#[derive(Clone, Debug)]
pub struct Face {
    pub plane: PlaneId,
    /// Face normal points away from the plane normal.
    pub back_side: bool,
    pub first_edge: u32,
    pub edge_count: u32,
    pub texinfo: TexInfoId,
}

/// Model 0 is the world; the rest are brush entities (doors, platforms).
#[derive(Clone, Debug)]
pub struct Model {
    pub bounds: Aabb,
    pub head: Child,
}
