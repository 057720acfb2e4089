use glam::Vec3;
use smallvec::SmallVec;

use crate::defs::ContentFlags;
use crate::world::geometry::*;
use crate::world::plane::{BoxSide, ON_PLANE_EPSILON};

/// Leaf list returned by box queries; most boxes touch only a handful.
pub type LeafList = SmallVec<[LeafId; 8]>;

// ──────────────────────────────────────────────────────────────────────────
//                       Level – public helpers
// ──────────────────────────────────────────────────────────────────────────
impl Level {
    /// Root of the world tree (the loader guarantees at least one node).
    #[inline]
    pub fn root(&self) -> Child {
        Child::Node(ROOT_NODE)
    }

    #[inline(always)]
    pub fn node_plane(&self, node: &Node) -> &Plane {
        &self.planes[node.plane as usize]
    }

    /// Walk the tree and return the leaf containing `p`.
    ///
    /// Points within [`ON_PLANE_EPSILON`] of a splitter go to the front.
    pub fn leaf_at(&self, p: Vec3) -> LeafId {
        self.leaf_at_from(self.root(), p)
    }

    /// [`Self::leaf_at`] starting below `head` (a brush model's tree).
    pub fn leaf_at_from(&self, head: Child, p: Vec3) -> LeafId {
        let mut child = head;
        loop {
            match child {
                Child::Leaf(id) => return id,
                Child::Node(id) => {
                    let node = &self.nodes[id as usize];
                    let side = if self.node_plane(node).distance(p) >= -ON_PLANE_EPSILON {
                        FRONT
                    } else {
                        BACK
                    };
                    child = node.children[side];
                }
            }
        }
    }

    pub fn contents_at(&self, p: Vec3) -> ContentFlags {
        self.leaves[self.leaf_at(p) as usize].contents
    }

    /// Every leaf whose region touches the box `[min, max]`, in tree order
    /// (front before back), without duplicates.
    pub fn leaves_in_box(&self, bounds: &Aabb) -> LeafList {
        let mut out = LeafList::new();
        self.box_leaves(self.root(), bounds.center(), bounds.half_extents(), &mut out);
        out
    }

    fn box_leaves(&self, child: Child, center: Vec3, half: Vec3, out: &mut LeafList) {
        match child {
            Child::Leaf(id) => {
                if !out.contains(&id) {
                    out.push(id);
                }
            }
            Child::Node(id) => {
                let node = &self.nodes[id as usize];
                match self.node_plane(node).classify_box(center, half) {
                    BoxSide::Front => self.box_leaves(node.children[FRONT], center, half, out),
                    BoxSide::Back => self.box_leaves(node.children[BACK], center, half, out),
                    BoxSide::Straddling => {
                        self.box_leaves(node.children[FRONT], center, half, out);
                        self.box_leaves(node.children[BACK], center, half, out);
                    }
                }
            }
        }
    }

    /// Brushes referenced by `leaf`.
    pub fn leaf_brushes(&self, leaf: LeafId) -> impl Iterator<Item = (BrushId, &Brush)> + '_ {
        let l = &self.leaves[leaf as usize];
        let first = l.first_leaf_brush as usize;
        self.leaf_brushes[first..first + l.leaf_brush_count as usize]
            .iter()
            .map(|&b| (b, &self.brushes[b as usize]))
    }

    /// Faces referenced by `leaf`.
    pub fn leaf_faces(&self, leaf: LeafId) -> &[FaceId] {
        let l = &self.leaves[leaf as usize];
        let first = l.first_leaf_face as usize;
        &self.leaf_faces[first..first + l.leaf_face_count as usize]
    }

    pub fn brush_sides(&self, brush: &Brush) -> &[BrushSide] {
        let first = brush.first_side as usize;
        &self.brush_sides[first..first + brush.side_count as usize]
    }

    /// Point inside (or on the surface of) a brush.
    pub fn brush_contains(&self, brush: &Brush, p: Vec3) -> bool {
        self.brush_sides(brush)
            .iter()
            .all(|s| self.planes[s.plane as usize].distance(p) <= ON_PLANE_EPSILON)
    }

    /// Union of the contents of every brush of `p`'s leaf that contains `p`.
    ///
    /// Finer than [`Self::contents_at`] for leaves shared by several brushes.
    pub fn brush_contents_at(&self, p: Vec3) -> ContentFlags {
        self.leaf_brushes(self.leaf_at(p))
            .filter(|(_, b)| self.brush_contains(b, p))
            .fold(ContentFlags::empty(), |acc, (_, b)| acc | b.contents)
    }

    /// Collect leaves whose bounds lie within `max_distance` of `eye`,
    /// nearest subtree first (the order a front-to-back renderer wants).
    pub fn fill_visible_leaves(&self, eye: Vec3, max_distance: f32, leaves: &mut Vec<LeafId>) {
        leaves.clear();

        self.walk_bsp(self.root(), eye, max_distance, leaves);
    }

    fn walk_bsp(&self, child: Child, eye: Vec3, max_distance: f32, leaves: &mut Vec<LeafId>) {
        match child {
            Child::Leaf(id) => {
                if self.leaves[id as usize].bounds.distance_to(eye) <= max_distance {
                    leaves.push(id);
                }
            }
            Child::Node(id) => {
                let node = &self.nodes[id as usize];
                if node.bounds.distance_to(eye) > max_distance {
                    return;
                }
                let near = if self.node_plane(node).distance(eye) >= -ON_PLANE_EPSILON {
                    FRONT
                } else {
                    BACK
                };

                // Near side first, then the far side.
                self.walk_bsp(node.children[near], eye, max_distance, leaves);
                self.walk_bsp(node.children[near ^ 1], eye, max_distance, leaves);
            }
        }
    }
}
