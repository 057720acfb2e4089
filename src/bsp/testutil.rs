//! In-memory IBSP images for unit tests.

use crate::bsp::{
    level::*,
    raw::{BSP_MAGIC, BSP_VERSION, HEADER_LUMPS, HEADER_SIZE, LumpKind, record_config},
};
use crate::defs::{ContentFlags, SurfaceFlags};

#[derive(Default, Clone)]
pub struct BspImage {
    lumps: [Vec<u8>; HEADER_LUMPS],
}

impl BspImage {
    /// Append one encoded record to `kind`.
    pub fn push<T: bincode::Encode>(&mut self, kind: LumpKind, rec: T) -> &mut Self {
        let bytes = bincode::encode_to_vec(rec, record_config()).expect("encode record");
        self.lumps[kind as usize].extend_from_slice(&bytes);
        self
    }

    /// Replace a lump with arbitrary bytes.
    pub fn raw_lump(&mut self, kind: LumpKind, bytes: Vec<u8>) -> &mut Self {
        self.lumps[kind as usize] = bytes;
        self
    }

    pub fn entities(&mut self, text: &str) -> &mut Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        self.raw_lump(LumpKind::Entities, bytes)
    }

    pub fn plane(&mut self, normal: [f32; 3], dist: f32) -> &mut Self {
        let type_ = normal.iter().position(|c| c.abs() == 1.0).map_or(3, |i| i as i32);
        self.push(LumpKind::Planes, RawPlane { normal, dist, type_ })
    }

    pub fn node(&mut self, plane: i32, children: [i32; 2], mins: [i16; 3], maxs: [i16; 3]) -> &mut Self {
        self.push(
            LumpKind::Nodes,
            RawNode { plane, children, mins, maxs, first_face: 0, num_faces: 0 },
        )
    }

    pub fn leaf(
        &mut self,
        contents: ContentFlags,
        mins: [i16; 3],
        maxs: [i16; 3],
        faces: (u16, u16),
        brushes: (u16, u16),
    ) -> &mut Self {
        let solid = contents.contains(ContentFlags::SOLID);
        self.push(
            LumpKind::Leaves,
            RawLeaf {
                contents: contents.bits() as i32,
                cluster: if solid { -1 } else { 0 },
                area: if solid { 0 } else { 1 },
                mins,
                maxs,
                first_leaf_face: faces.0,
                num_leaf_faces: faces.1,
                first_leaf_brush: brushes.0,
                num_leaf_brushes: brushes.1,
            },
        )
    }

    pub fn brush(&mut self, first_side: i32, num_sides: i32, contents: ContentFlags) -> &mut Self {
        self.push(
            LumpKind::Brushes,
            RawBrush { first_side, num_sides, contents: contents.bits() as i32 },
        )
    }

    pub fn brush_side(&mut self, plane: u16, texinfo: i16) -> &mut Self {
        self.push(LumpKind::BrushSides, RawBrushSide { plane, texinfo })
    }

    pub fn texinfo(&mut self, flags: SurfaceFlags, name: &str) -> &mut Self {
        let mut texture = [0u8; 32];
        texture[..name.len()].copy_from_slice(name.as_bytes());
        self.push(
            LumpKind::TexInfo,
            RawTexInfo {
                vecs: [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0]],
                flags: flags.bits() as i32,
                value: 0,
                texture,
                next_texinfo: -1,
            },
        )
    }

    pub fn model(&mut self, mins: [f32; 3], maxs: [f32; 3], head_node: i32) -> &mut Self {
        self.push(
            LumpKind::Models,
            RawModel { mins, maxs, origin: [0.0; 3], head_node, first_face: 0, num_faces: 0 },
        )
    }

    /// Serialize header, directory and lump payloads.
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE);
        out.extend_from_slice(BSP_MAGIC);
        out.extend_from_slice(&BSP_VERSION.to_le_bytes());

        let mut offset = HEADER_SIZE;
        for lump in &self.lumps {
            out.extend_from_slice(&(offset as i32).to_le_bytes());
            out.extend_from_slice(&(lump.len() as i32).to_le_bytes());
            offset += lump.len();
        }
        for lump in &self.lumps {
            out.extend_from_slice(lump);
        }
        out
    }
}

/// A floor at z = 0: leaf 1 (empty, z >= 0) in front, leaf 0 (`floor`) behind.
/// Brush 0 is the 128 x 128 x 64 block under the origin; its top face is metal.
pub fn floor_image(floor: ContentFlags) -> BspImage {
    let mut img = BspImage::default();
    img.plane([0.0, 0.0, 1.0], 0.0)
        .plane([0.0, 0.0, -1.0], 64.0)
        .plane([1.0, 0.0, 0.0], 64.0)
        .plane([-1.0, 0.0, 0.0], 64.0)
        .plane([0.0, 1.0, 0.0], 64.0)
        .plane([0.0, -1.0, 0.0], 64.0);

    img.node(0, [-2, -1], [-64, -64, -64], [256, 64, 128]);

    // leaf 1 sees face 0
    img.leaf(floor, [-64, -64, -64], [64, 64, 0], (0, 0), (0, 1))
        .leaf(ContentFlags::empty(), [-64, -64, 0], [256, 64, 128], (0, 1), (1, 0));
    img.push(LumpKind::LeafBrushes, 0u16);

    img.texinfo(SurfaceFlags::METAL, "metal/floor1")
        .texinfo(SurfaceFlags::empty(), "concrete/wall");

    img.brush(0, 6, floor);
    for side in 0..6u16 {
        img.brush_side(side, if side == 0 { 0 } else { 1 });
    }

    for p in [[-64.0, -64.0, 0.0], [64.0, -64.0, 0.0], [64.0, 64.0, 0.0], [-64.0, 64.0, 0.0f32]] {
        img.push(LumpKind::Vertices, RawVertex { point: p });
    }
    img.push(
        LumpKind::Faces,
        RawFace {
            plane: 0,
            side: 0,
            first_edge: 0,
            num_edges: 4,
            texinfo: 0,
            styles: [0, 255, 255, 255],
            light_ofs: -1,
        },
    );
    img.push(LumpKind::LeafFaces, 0u16);

    img.push(
        LumpKind::Models,
        RawModel {
            mins: [-64.0, -64.0, -64.0],
            maxs: [256.0, 64.0, 128.0],
            origin: [0.0; 3],
            head_node: 0,
            first_face: 0,
            num_faces: 1,
        },
    );
    img.entities("{\n\"classname\" \"worldspawn\"\n\"sky\" \"sr\"\n}\n");
    img
}

/// [`floor_image`] with a solid floor, plus a door slab (model `*1`,
/// x in 100..110) and three point entities.
pub fn sample_image() -> BspImage {
    let mut img = floor_image(ContentFlags::SOLID);

    // planes 6, 7, 8
    img.plane([1.0, 0.0, 0.0], 100.0)
        .plane([1.0, 0.0, 0.0], 110.0)
        .plane([-1.0, 0.0, 0.0], -100.0);

    // nodes 1, 2 form the door's own tree
    img.node(6, [2, -3], [100, -64, 0], [110, 64, 128])
        .node(7, [-5, -4], [100, -64, 0], [110, 64, 128]);

    // leaves 2 (open), 3 (door), 4 (open)
    img.leaf(ContentFlags::empty(), [100, -64, 0], [100, 64, 128], (1, 0), (2, 0))
        .leaf(ContentFlags::SOLID, [100, -64, 0], [110, 64, 128], (1, 0), (1, 1))
        .leaf(ContentFlags::empty(), [110, -64, 0], [110, 64, 128], (1, 0), (2, 0));
    img.push(LumpKind::LeafBrushes, 1u16);

    img.texinfo(SurfaceFlags::WOOD, "wood/door");
    img.brush(6, 2, ContentFlags::SOLID);
    img.brush_side(8, 2).brush_side(7, 2);

    img.model([100.0, -64.0, 0.0], [110.0, 64.0, 128.0], 1);

    img.entities(concat!(
        "{\n\"classname\" \"worldspawn\"\n\"sky\" \"sr\"\n\"message\" \"test yard\"\n}\n",
        "{\n\"classname\" \"info_player_start\"\n\"origin\" \"0 0 24\"\n}\n",
        "{\n\"classname\" \"func_door\"\n\"model\" \"*1\"\n\"targetname\" \"door1\"\n}\n",
        "{\n\"classname\" \"light\"\n\"origin\" \"32 0 -32\"\n\"light\" \"200\"\n}\n",
    ));
    img
}
