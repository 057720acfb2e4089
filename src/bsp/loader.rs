// ──────────────────────────────────────────────────────────────────────────
// bsp/loader.rs
//
//  *   RawLevel   (bsp::level)   ──╮
//  *   entity text               │   --->  world::Level
//                                ╯          + Vec<EntityProperties>
//
// Every cross reference is range-checked here so the tree walkers can
// index without further checks.
// ──────────────────────────────────────────────────────────────────────────

use crate::{
    bsp::{
        entities::{EntityError, EntityProperties, parse_entities},
        level::{self as raw_level, RawLevel},
        raw::{BspError, BspFile, LumpKind},
    },
    world as geo,
};
use log::info;
use thiserror::Error;

/*──────────────────────────── Error type ───────────────────────────*/

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Bsp(#[from] BspError),

    #[error("{0} lump is empty")]
    Empty(LumpKind),

    #[error("{lump} lump element {elem}: {field} {value} out of range (limit {limit})")]
    BadIndex {
        lump: LumpKind,
        elem: usize,
        field: &'static str,
        value: i64,
        limit: usize,
    },

    #[error("planes lump element {elem}: normal length {length} is not unit")]
    DegeneratePlane { elem: usize, length: f32 },

    #[error("planes lump element {elem}: distance {dist} is not finite")]
    BadPlaneDistance { elem: usize, dist: f32 },

    #[error("entities lump: {0}")]
    Entities(#[from] EntityError),
}

/*====================================================================*/
/*                       Public API                                   */
/*====================================================================*/

/// Decode and validate the level geometry of `bsp`.
pub fn load_level(bsp: &BspFile, name: &str) -> Result<geo::Level, LoadError> {
    /*----- 1. Raw lumps --------------------------------------------------*/
    let raw = bsp.parse_level()?;

    /*----- 2. Integrity checks -------------------------------------------*/
    validate(&raw)?;

    /*----- 3. Convert raw → geo lists ------------------------------------*/
    use raw_to_geo::*;

    let level = geo::Level {
        name: name.to_owned(),
        planes: raw.planes.iter().map(plane_from).collect(),
        nodes: raw.nodes.iter().map(node_from).collect(),
        leaves: raw.leaves.iter().map(leaf_from).collect(),
        brushes: raw.brushes.iter().map(brush_from).collect(),
        brush_sides: raw.brush_sides.iter().map(brush_side_from).collect(),
        leaf_brushes: raw.leaf_brushes.iter().map(|&b| b as geo::BrushId).collect(),
        leaf_faces: raw.leaf_faces.iter().map(|&f| f as geo::FaceId).collect(),
        texinfo: raw.texinfo.iter().map(texinfo_from).collect(),
        faces: raw.faces.iter().map(face_from).collect(),
        vertices: raw.vertices.iter().map(|v| glam::Vec3::from(v.point)).collect(),
        models: raw.models.iter().map(model_from).collect(),
    };

    info!(
        "level `{}`: {} nodes, {} leaves, {} brushes, {} submodels",
        level.name,
        level.nodes.len(),
        level.leaves.len(),
        level.brushes.len(),
        level.models.len().saturating_sub(1),
    );
    Ok(level)
}

/// Parse the entity lump of `bsp`.
pub fn load_entities(bsp: &BspFile) -> Result<Vec<EntityProperties>, LoadError> {
    let ents = parse_entities(&bsp.entity_text())?;
    info!("{} entities", ents.len());
    Ok(ents)
}

/*====================================================================*/
/*                        Validation                                  */
/*====================================================================*/

/// `value` must index into a list of `limit` elements.
fn check_index(
    lump: LumpKind,
    elem: usize,
    field: &'static str,
    value: i64,
    limit: usize,
) -> Result<(), LoadError> {
    if value < 0 || value as u64 >= limit as u64 {
        return Err(LoadError::BadIndex { lump, elem, field, value, limit });
    }
    Ok(())
}

/// `first .. first + count` must lie within a list of `limit` elements.
fn check_span(
    lump: LumpKind,
    elem: usize,
    field: &'static str,
    first: i64,
    count: i64,
    limit: usize,
) -> Result<(), LoadError> {
    if first < 0 || count < 0 || (first + count) as u64 > limit as u64 {
        let value = if first < 0 || first as u64 > limit as u64 { first } else { first + count };
        return Err(LoadError::BadIndex { lump, elem, field, value, limit });
    }
    Ok(())
}

/// Sign-encoded child: node index or `-1 - leaf`.
fn check_child(elem: usize, raw: i32, nodes: usize, leaves: usize) -> Result<(), LoadError> {
    if raw >= 0 {
        check_index(LumpKind::Nodes, elem, "child node", raw as i64, nodes)
    } else {
        check_index(LumpKind::Nodes, elem, "child leaf", -1 - raw as i64, leaves)
    }
}

fn validate(raw: &RawLevel) -> Result<(), LoadError> {
    for (kind, len) in [
        (LumpKind::Planes, raw.planes.len()),
        (LumpKind::Nodes, raw.nodes.len()),
        (LumpKind::Leaves, raw.leaves.len()),
    ] {
        if len == 0 {
            return Err(LoadError::Empty(kind));
        }
    }

    for (i, p) in raw.planes.iter().enumerate() {
        let length = glam::Vec3::from(p.normal).length();
        if !length.is_finite() || (length - 1.0).abs() > geo::NORMAL_EPSILON {
            return Err(LoadError::DegeneratePlane { elem: i, length });
        }
        if !p.dist.is_finite() {
            return Err(LoadError::BadPlaneDistance { elem: i, dist: p.dist });
        }
    }

    let (planes, nodes, leaves) = (raw.planes.len(), raw.nodes.len(), raw.leaves.len());

    for (i, n) in raw.nodes.iter().enumerate() {
        check_index(LumpKind::Nodes, i, "plane", n.plane as i64, planes)?;
        for &c in &n.children {
            check_child(i, c, nodes, leaves)?;
            // children always point further down the array, so no cycles
            if c >= 0 && c as usize <= i {
                return Err(LoadError::BadIndex {
                    lump: LumpKind::Nodes,
                    elem: i,
                    field: "child node (back reference)",
                    value: c as i64,
                    limit: nodes,
                });
            }
        }
        check_span(LumpKind::Nodes, i, "faces", n.first_face as i64, n.num_faces as i64, raw.faces.len())?;
    }

    for (i, l) in raw.leaves.iter().enumerate() {
        check_span(
            LumpKind::Leaves,
            i,
            "leaf faces",
            l.first_leaf_face as i64,
            l.num_leaf_faces as i64,
            raw.leaf_faces.len(),
        )?;
        check_span(
            LumpKind::Leaves,
            i,
            "leaf brushes",
            l.first_leaf_brush as i64,
            l.num_leaf_brushes as i64,
            raw.leaf_brushes.len(),
        )?;
    }

    for (i, &f) in raw.leaf_faces.iter().enumerate() {
        check_index(LumpKind::LeafFaces, i, "face", f as i64, raw.faces.len())?;
    }
    for (i, &b) in raw.leaf_brushes.iter().enumerate() {
        check_index(LumpKind::LeafBrushes, i, "brush", b as i64, raw.brushes.len())?;
    }

    for (i, b) in raw.brushes.iter().enumerate() {
        check_span(
            LumpKind::Brushes,
            i,
            "sides",
            b.first_side as i64,
            b.num_sides as i64,
            raw.brush_sides.len(),
        )?;
    }
    for (i, s) in raw.brush_sides.iter().enumerate() {
        check_index(LumpKind::BrushSides, i, "plane", s.plane as i64, planes)?;
        if s.texinfo >= 0 {
            check_index(LumpKind::BrushSides, i, "texinfo", s.texinfo as i64, raw.texinfo.len())?;
        }
    }

    for (i, t) in raw.texinfo.iter().enumerate() {
        if t.next_texinfo >= 0 {
            check_index(LumpKind::TexInfo, i, "next", t.next_texinfo as i64, raw.texinfo.len())?;
        }
    }

    for (i, f) in raw.faces.iter().enumerate() {
        check_index(LumpKind::Faces, i, "plane", f.plane as i64, planes)?;
        check_index(LumpKind::Faces, i, "texinfo", f.texinfo as i64, raw.texinfo.len())?;
    }

    for (i, m) in raw.models.iter().enumerate() {
        check_index(LumpKind::Models, i, "head node", m.head_node as i64, nodes)?;
        check_span(LumpKind::Models, i, "faces", m.first_face as i64, m.num_faces as i64, raw.faces.len())?;
    }

    Ok(())
}

/*====================================================================*/
/*                  Raw → Geo helpers (local)                         */
/*====================================================================*/
mod raw_to_geo {
    use super::*;
    use crate::defs::{ContentFlags, SurfaceFlags};
    use glam::Vec3;

    #[inline]
    fn raw_bounds_to_aabb(mins: &[i16; 3], maxs: &[i16; 3]) -> geo::Aabb {
        let v = |r: &[i16; 3]| Vec3::new(r[0] as f32, r[1] as f32, r[2] as f32);
        geo::Aabb::new(v(mins), v(maxs))
    }

    pub fn plane_from(r: &raw_level::RawPlane) -> geo::Plane {
        // renormalise within the accepted tolerance
        geo::Plane::new(Vec3::from(r.normal).normalize(), r.dist)
    }

    pub fn node_from(r: &raw_level::RawNode) -> geo::Node {
        geo::Node {
            plane: r.plane as geo::PlaneId,
            children: r.children.map(geo::Child::from_raw),
            bounds: raw_bounds_to_aabb(&r.mins, &r.maxs),
            first_face: r.first_face as geo::FaceId,
            face_count: r.num_faces as u32,
        }
    }

    pub fn leaf_from(r: &raw_level::RawLeaf) -> geo::Leaf {
        geo::Leaf {
            contents: ContentFlags::from_raw(r.contents),
            cluster: r.cluster,
            area: r.area,
            bounds: raw_bounds_to_aabb(&r.mins, &r.maxs),
            first_leaf_face: r.first_leaf_face as u32,
            leaf_face_count: r.num_leaf_faces as u32,
            first_leaf_brush: r.first_leaf_brush as u32,
            leaf_brush_count: r.num_leaf_brushes as u32,
        }
    }

    pub fn brush_from(r: &raw_level::RawBrush) -> geo::Brush {
        geo::Brush {
            contents: ContentFlags::from_raw(r.contents),
            first_side: r.first_side as geo::BrushSideId,
            side_count: r.num_sides as u32,
        }
    }

    pub fn brush_side_from(r: &raw_level::RawBrushSide) -> geo::BrushSide {
        geo::BrushSide {
            plane: r.plane as geo::PlaneId,
            texinfo: (r.texinfo >= 0).then_some(r.texinfo as geo::TexInfoId),
        }
    }

    pub fn texinfo_from(r: &raw_level::RawTexInfo) -> geo::TexInfo {
        geo::TexInfo {
            flags: SurfaceFlags::from_raw(r.flags),
            texture: raw_level::name_str(&r.texture).to_owned(),
        }
    }

    pub fn face_from(r: &raw_level::RawFace) -> geo::Face {
        geo::Face {
            plane: r.plane as geo::PlaneId,
            back_side: r.side != 0,
            first_edge: r.first_edge.max(0) as u32,
            edge_count: r.num_edges.max(0) as u32,
            texinfo: r.texinfo as geo::TexInfoId,
        }
    }

    pub fn model_from(r: &raw_level::RawModel) -> geo::Model {
        geo::Model {
            bounds: geo::Aabb::new(r.mins.into(), r.maxs.into()),
            head: geo::Child::Node(r.head_node as geo::NodeId),
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::{
        level::{RawBrushSide, RawLeaf, RawNode, RawPlane},
        testutil::{BspImage, sample_image},
    };
    use crate::defs::{ContentFlags, SurfaceFlags};
    use crate::world::Child;

    fn load(img: &BspImage) -> Result<geo::Level, LoadError> {
        let bsp = BspFile::from_bytes(img.build())?;
        load_level(&bsp, "test")
    }

    #[test]
    fn sample_level_loads() {
        let lvl = load(&sample_image()).unwrap();
        assert_eq!(lvl.name, "test");
        assert_eq!(lvl.nodes[0].children, [Child::Leaf(1), Child::Leaf(0)]);
        assert_eq!(lvl.nodes[1].children, [Child::Node(2), Child::Leaf(2)]);
        assert_eq!(lvl.leaves[0].contents, ContentFlags::SOLID);
        assert_eq!(lvl.brush_sides[0].texinfo, Some(0));
        assert_eq!(lvl.texinfo[0].flags, SurfaceFlags::METAL);
        assert_eq!(lvl.texinfo[0].texture, "metal/floor1");
        assert_eq!(lvl.models.len(), 2);
        assert_eq!(lvl.vertices.len(), 4);
        assert_eq!((lvl.leaves[0].cluster, lvl.leaves[0].area), (-1, 0));
        assert_eq!((lvl.leaves[1].cluster, lvl.leaves[1].area), (0, 1));
    }

    #[test]
    fn entities_load() {
        let bsp = BspFile::from_bytes(sample_image().build()).unwrap();
        let ents = load_entities(&bsp).unwrap();
        assert_eq!(ents.len(), 4);
        assert!(ents[0].is_worldspawn());
    }

    #[test]
    fn empty_required_lump() {
        let err = load(&BspImage::default()).unwrap_err();
        assert!(matches!(err, LoadError::Empty(LumpKind::Planes)));
        assert_eq!(err.to_string(), "planes lump is empty");
    }

    #[test]
    fn node_plane_out_of_range() {
        let mut img = sample_image();
        img.push(
            LumpKind::Nodes,
            RawNode { plane: 99, children: [-1, -2], mins: [0; 3], maxs: [0; 3], first_face: 0, num_faces: 0 },
        );
        let err = load(&img).unwrap_err();
        assert!(matches!(
            err,
            LoadError::BadIndex { lump: LumpKind::Nodes, elem: 3, field: "plane", value: 99, .. }
        ));
        assert!(err.to_string().starts_with("nodes lump"));
    }

    #[test]
    fn child_leaf_out_of_range() {
        let mut img = sample_image();
        img.push(
            LumpKind::Nodes,
            RawNode { plane: 0, children: [-1, -40], mins: [0; 3], maxs: [0; 3], first_face: 0, num_faces: 0 },
        );
        let err = load(&img).unwrap_err();
        assert!(matches!(err, LoadError::BadIndex { field: "child leaf", value: 39, .. }));
    }

    #[test]
    fn node_cycle_rejected() {
        let mut img = sample_image();
        img.push(
            LumpKind::Nodes,
            RawNode { plane: 0, children: [0, -1], mins: [0; 3], maxs: [0; 3], first_face: 0, num_faces: 0 },
        );
        assert!(matches!(load(&img).unwrap_err(), LoadError::BadIndex { lump: LumpKind::Nodes, .. }));
    }

    #[test]
    fn leaf_brush_span_out_of_range() {
        let mut img = sample_image();
        img.push(
            LumpKind::Leaves,
            RawLeaf {
                contents: 1,
                cluster: -1,
                area: 0,
                mins: [0; 3],
                maxs: [0; 3],
                first_leaf_face: 0,
                num_leaf_faces: 0,
                first_leaf_brush: 1,
                num_leaf_brushes: 5,
            },
        );
        let err = load(&img).unwrap_err();
        assert!(matches!(
            err,
            LoadError::BadIndex { lump: LumpKind::Leaves, field: "leaf brushes", value: 6, limit: 2, .. }
        ));
    }

    #[test]
    fn brush_side_plane_out_of_range() {
        let mut img = sample_image();
        img.push(LumpKind::BrushSides, RawBrushSide { plane: 500, texinfo: -1 });
        let err = load(&img).unwrap_err();
        assert!(matches!(err, LoadError::BadIndex { lump: LumpKind::BrushSides, .. }));
    }

    #[test]
    fn degenerate_plane() {
        let mut img = sample_image();
        img.push(LumpKind::Planes, RawPlane { normal: [0.0; 3], dist: 0.0, type_: 0 });
        let err = load(&img).unwrap_err();
        assert!(matches!(err, LoadError::DegeneratePlane { elem: 9, .. }));
    }

    #[test]
    fn non_finite_plane_distance() {
        let mut img = sample_image();
        img.push(LumpKind::Planes, RawPlane { normal: [0.0, 0.0, 1.0], dist: f32::NAN, type_: 2 });
        let err = load(&img).unwrap_err();
        assert!(matches!(err, LoadError::BadPlaneDistance { elem: 9, .. }));
        assert!(err.to_string().contains("distance"));
    }

    #[test]
    fn bad_entities_fail_load() {
        let mut img = sample_image();
        img.entities("{ \"classname\" \"worldspawn\"");
        let bsp = BspFile::from_bytes(img.build()).unwrap();
        let err = load_entities(&bsp).unwrap_err();
        assert!(matches!(err, LoadError::Entities(EntityError::Unterminated { entity: 0 })));
    }
}
