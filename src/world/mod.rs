mod bsp;
mod geometry;
mod plane;
mod trace;

pub use geometry::{
    Aabb, BACK, Brush, BrushId, BrushSide, BrushSideId, Child, FRONT, Face, FaceId, Leaf, LeafId,
    Level, Model, ModelId, Node, NodeId, Plane, PlaneId, ROOT_NODE, TexInfo, TexInfoId,
};

pub use bsp::LeafList;

pub use plane::{BoxSide, NORMAL_EPSILON, ON_PLANE_EPSILON};

pub use trace::TraceResult;
