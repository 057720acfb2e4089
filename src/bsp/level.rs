use crate::bsp::raw::{BspError, BspFile, LumpKind};
use bincode::Decode;
use log::debug;

/*=======================================================================*/
/*                         Raw binary structs                            */
/*=======================================================================*/

#[repr(C)]
#[derive(Clone, Copy, Decode, Debug)]
#[cfg_attr(test, derive(bincode::Encode))]
pub struct RawPlane {
    pub normal: [f32; 3],
    pub dist: f32,
    pub type_: i32,
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Debug)]
#[cfg_attr(test, derive(bincode::Encode))]
pub struct RawVertex {
    pub point: [f32; 3],
}

/// `children` >= 0 are node indices, negative values are `-1 - leaf`.
#[repr(C)]
#[derive(Clone, Copy, Decode, Debug)]
#[cfg_attr(test, derive(bincode::Encode))]
pub struct RawNode {
    pub plane: i32,
    pub children: [i32; 2],
    pub mins: [i16; 3],
    pub maxs: [i16; 3],
    pub first_face: u16,
    pub num_faces: u16,
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Debug)]
#[cfg_attr(test, derive(bincode::Encode))]
pub struct RawTexInfo {
    pub vecs: [[f32; 4]; 2],
    pub flags: i32,
    pub value: i32,
    pub texture: [u8; 32],
    pub next_texinfo: i32,
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Debug)]
#[cfg_attr(test, derive(bincode::Encode))]
pub struct RawFace {
    pub plane: u16,
    pub side: i16,
    pub first_edge: i32,
    pub num_edges: i16,
    pub texinfo: i16,
    pub styles: [u8; 4],
    pub light_ofs: i32,
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Debug)]
#[cfg_attr(test, derive(bincode::Encode))]
pub struct RawLeaf {
    pub contents: i32,
    pub cluster: i16,
    pub area: i16,
    pub mins: [i16; 3],
    pub maxs: [i16; 3],
    pub first_leaf_face: u16,
    pub num_leaf_faces: u16,
    pub first_leaf_brush: u16,
    pub num_leaf_brushes: u16,
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Debug)]
#[cfg_attr(test, derive(bincode::Encode))]
pub struct RawModel {
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
    pub origin: [f32; 3],
    pub head_node: i32,
    pub first_face: i32,
    pub num_faces: i32,
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Debug)]
#[cfg_attr(test, derive(bincode::Encode))]
pub struct RawBrush {
    pub first_side: i32,
    pub num_sides: i32,
    pub contents: i32,
}

#[repr(C)]
#[derive(Clone, Copy, Decode, Debug)]
#[cfg_attr(test, derive(bincode::Encode))]
pub struct RawBrushSide {
    pub plane: u16,
    pub texinfo: i16,
}

/*=======================================================================*/
/*                     Aggregate returned by `parse_level`               */
/*=======================================================================*/
#[derive(Debug)]
pub struct RawLevel {
    pub entities: String,
    pub planes: Vec<RawPlane>,
    pub vertices: Vec<RawVertex>,
    pub nodes: Vec<RawNode>,
    pub texinfo: Vec<RawTexInfo>,
    pub faces: Vec<RawFace>,
    pub leaves: Vec<RawLeaf>,
    pub leaf_faces: Vec<u16>,
    pub leaf_brushes: Vec<u16>,
    pub models: Vec<RawModel>,
    pub brushes: Vec<RawBrush>,
    pub brush_sides: Vec<RawBrushSide>,
}

/// Trim a fixed-size, NUL-padded name field.
pub fn name_str(bytes: &[u8]) -> &str {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..end]).unwrap_or("")
}

/*=======================================================================*/
/*                     Convenience helpers on `BspFile`                  */
/*=======================================================================*/
impl BspFile {
    /// Decode every lump the level core consumes.  Visibility, lighting,
    /// edges, areas and the pop lump stay in the file untouched.
    pub fn parse_level(&self) -> Result<RawLevel, BspError> {
        let level = RawLevel {
            entities: self.entity_text(),
            planes: self.lump_to_vec(LumpKind::Planes)?,
            vertices: self.lump_to_vec(LumpKind::Vertices)?,
            nodes: self.lump_to_vec(LumpKind::Nodes)?,
            texinfo: self.lump_to_vec(LumpKind::TexInfo)?,
            faces: self.lump_to_vec(LumpKind::Faces)?,
            leaves: self.lump_to_vec(LumpKind::Leaves)?,
            leaf_faces: self.lump_to_vec(LumpKind::LeafFaces)?,
            leaf_brushes: self.lump_to_vec(LumpKind::LeafBrushes)?,
            models: self.lump_to_vec(LumpKind::Models)?,
            brushes: self.lump_to_vec(LumpKind::Brushes)?,
            brush_sides: self.lump_to_vec(LumpKind::BrushSides)?,
        };

        debug!(
            "lumps: {} planes, {} nodes, {} leaves, {} brushes, {} sides, {} faces, {} models",
            level.planes.len(),
            level.nodes.len(),
            level.leaves.len(),
            level.brushes.len(),
            level.brush_sides.len(),
            level.faces.len(),
            level.models.len(),
        );
        Ok(level)
    }
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
