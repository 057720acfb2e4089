//! Line traces against the level tree.
//!
//! The segment is pushed down the tree as a pair of fractions `[f1, f2]`
//! of the whole segment.  Where it crosses a splitter it is cut in two:
//! the near half is traced first and the far half only if the near half
//! came back clear, so the first blocking leaf reached is the nearest one.
//! Split points are always interpolated from the caller's endpoints.

use glam::Vec3;

use crate::defs::{ContentFlags, SurfaceFlags};
use crate::world::geometry::*;
use crate::world::plane::ON_PLANE_EPSILON;

/// Outcome of a line trace.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceResult {
    /// A blocking volume was reached.
    pub hit: bool,
    /// The segment began inside a blocking volume.
    pub start_solid: bool,
    /// 0..=1 along `start → end`; 1 when clear.
    pub fraction: f32,
    pub end_position: Vec3,
    /// Unit normal of the struck surface, facing the incoming segment.
    pub plane_normal: Vec3,
    pub axis_u: Vec3,
    pub axis_v: Vec3,
    /// Contents of the blocking leaf.
    pub contents: ContentFlags,
    pub surface: SurfaceFlags,
    pub leaf: Option<LeafId>,
    /// Brush entity owning the struck model, filled in by the map.
    pub entity: Option<hecs::Entity>,
}

impl TraceResult {
    /// Clear trace reaching `end`.
    pub fn clear(end: Vec3) -> Self {
        Self {
            hit: false,
            start_solid: false,
            fraction: 1.0,
            end_position: end,
            plane_normal: Vec3::ZERO,
            axis_u: Vec3::ZERO,
            axis_v: Vec3::ZERO,
            contents: ContentFlags::empty(),
            surface: SurfaceFlags::empty(),
            leaf: None,
            entity: None,
        }
    }

    /// Trace starting inside `leaf`.
    fn start_solid(start: Vec3, leaf: LeafId, contents: ContentFlags) -> Self {
        Self {
            hit: true,
            start_solid: true,
            fraction: 0.0,
            end_position: start,
            contents,
            leaf: Some(leaf),
            ..Self::clear(start)
        }
    }
}

/// Where the segment crossed into the subtree being traced.
#[derive(Clone, Copy, Debug)]
struct Entry {
    fraction: f32,
    point: Vec3,
    /// Splitter oriented to face the side the segment came from.
    plane: Plane,
}

#[derive(Clone, Copy, Debug)]
struct Hit {
    leaf: LeafId,
    entry: Option<Entry>,
    fraction: f32,
    point: Vec3,
}

struct Segment {
    start: Vec3,
    delta: Vec3,
    mask: ContentFlags,
}

impl Segment {
    #[inline(always)]
    fn at(&self, fraction: f32) -> Vec3 {
        self.start + self.delta * fraction
    }
}

impl Level {
    /// Trace `start → end` through the world, stopping at the first leaf
    /// whose contents intersect `mask`.
    pub fn trace(&self, start: Vec3, end: Vec3, mask: ContentFlags) -> TraceResult {
        self.trace_from(self.root(), start, end, mask)
    }

    /// [`Self::trace`] through the tree rooted at `head`.
    pub fn trace_from(&self, head: Child, start: Vec3, end: Vec3, mask: ContentFlags) -> TraceResult {
        let start_leaf = self.leaf_at_from(head, start);
        let contents = self.leaves[start_leaf as usize].contents;
        if contents.intersects(mask) {
            return TraceResult::start_solid(start, start_leaf, contents);
        }
        if start == end {
            return TraceResult::clear(end);
        }

        let seg = Segment {
            start,
            delta: end - start,
            mask,
        };
        let Some(hit) = self.trace_child(&seg, head, 0.0, 1.0, start, end, None) else {
            return TraceResult::clear(end);
        };

        let contents = self.leaves[hit.leaf as usize].contents;
        match hit.entry {
            Some(entry) => {
                let (axis_u, axis_v) = entry.plane.tangent_axes();
                TraceResult {
                    hit: true,
                    start_solid: false,
                    fraction: entry.fraction,
                    end_position: entry.point,
                    plane_normal: entry.plane.normal,
                    axis_u,
                    axis_v,
                    contents,
                    surface: self.struck_surface(hit.leaf, &entry.plane, mask),
                    leaf: Some(hit.leaf),
                    entity: None,
                }
            }
            // Blocking leaf reached without crossing a splitter or leaving
            // a splitter the start rests on.
            None => TraceResult {
                fraction: hit.fraction,
                end_position: hit.point,
                ..TraceResult::start_solid(start, hit.leaf, contents)
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn trace_child(
        &self,
        seg: &Segment,
        child: Child,
        f1: f32,
        f2: f32,
        p1: Vec3,
        p2: Vec3,
        entry: Option<Entry>,
    ) -> Option<Hit> {
        let id = match child {
            Child::Leaf(id) => {
                let leaf = &self.leaves[id as usize];
                return leaf.contents.intersects(seg.mask).then_some(Hit {
                    leaf: id,
                    entry,
                    fraction: f1,
                    point: p1,
                });
            }
            Child::Node(id) => id,
        };

        let node = &self.nodes[id as usize];
        let plane = self.node_plane(node);
        let d1 = plane.distance(p1);
        let d2 = plane.distance(p2);

        // Entirely on one side (on-plane counts as front).
        if d1 >= -ON_PLANE_EPSILON && d2 >= -ON_PLANE_EPSILON {
            return self.trace_child(seg, node.children[FRONT], f1, f2, p1, p2, entry);
        }
        if d1 <= ON_PLANE_EPSILON && d2 <= ON_PLANE_EPSILON {
            // A start resting on the plane belongs to the front leaf, so the
            // segment leaves it right here.
            let entry = match entry {
                None if d1 >= -ON_PLANE_EPSILON => Some(Entry {
                    fraction: f1,
                    point: p1,
                    plane: *plane,
                }),
                e => e,
            };
            return self.trace_child(seg, node.children[BACK], f1, f2, p1, p2, entry);
        }

        // Straddling: d1 and d2 differ by more than 2ε, no division by zero.
        let t = (d1 / (d1 - d2)).clamp(0.0, 1.0);
        let split = f1 + (f2 - f1) * t;
        let mid = seg.at(split);
        let near = if d1 >= 0.0 { FRONT } else { BACK };

        if let Some(hit) = self.trace_child(seg, node.children[near], f1, split, p1, mid, entry) {
            return Some(hit);
        }

        let facing = if near == FRONT { *plane } else { plane.flipped() };
        let crossing = Entry {
            fraction: split,
            point: mid,
            plane: facing,
        };
        self.trace_child(seg, node.children[near ^ 1], split, f2, mid, p2, Some(crossing))
    }

    /// Flags of the brush face lying on `plane` inside the struck leaf.
    fn struck_surface(&self, leaf: LeafId, plane: &Plane, mask: ContentFlags) -> SurfaceFlags {
        self.leaf_brushes(leaf)
            .filter(|(_, b)| b.contents.intersects(mask))
            .flat_map(|(_, b)| self.brush_sides(b))
            .find(|s| self.planes[s.plane as usize].same_as(plane))
            .and_then(|s| s.texinfo)
            .map_or(SurfaceFlags::empty(), |t| self.texinfo[t as usize].flags)
    }
}
