use glam::Vec3;

use crate::world::geometry::{Aabb, Plane};

/// Distance within which a point counts as lying on a plane.
pub const ON_PLANE_EPSILON: f32 = 0.03125;

/// Tolerance when comparing unit normals.
pub const NORMAL_EPSILON: f32 = 0.01;

/// Where an axis-aligned box lies relative to a plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxSide {
    Front,
    Back,
    Straddling,
}

// ──────────────────────────────────────────────────────────────────────────
//                       Plane geometry helpers
// ──────────────────────────────────────────────────────────────────────────
impl Plane {
    pub const fn new(normal: Vec3, dist: f32) -> Self {
        Self { normal, dist }
    }

    /// Signed distance, positive on the front side.
    #[inline(always)]
    pub fn distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) - self.dist
    }

    /// Same plane seen from the other side.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self::new(-self.normal, -self.dist)
    }

    /// Coplanar and facing the same way, within the epsilons.
    pub fn same_as(&self, other: &Plane) -> bool {
        self.normal.dot(other.normal) > 1.0 - NORMAL_EPSILON
            && (self.dist - other.dist).abs() <= ON_PLANE_EPSILON
    }

    /// Classify the box centred on `center` with half extents `half`.
    pub fn classify_box(&self, center: Vec3, half: Vec3) -> BoxSide {
        let d = self.distance(center);
        let r = self.normal.abs().dot(half);
        if d - r >= -ON_PLANE_EPSILON {
            BoxSide::Front
        } else if d + r <= ON_PLANE_EPSILON {
            BoxSide::Back
        } else {
            BoxSide::Straddling
        }
    }

    /// Orthonormal `(u, v)` spanning the plane.
    ///
    /// Seeded with the world axis least aligned with the normal (first axis
    /// wins ties), so the result depends only on the normal.
    pub fn tangent_axes(&self) -> (Vec3, Vec3) {
        let n = self.normal;
        let a = n.abs();
        let seed = if a.x <= a.y && a.x <= a.z {
            Vec3::X
        } else if a.y <= a.z {
            Vec3::Y
        } else {
            Vec3::Z
        };
        let u = n.cross(seed).normalize();
        let v = n.cross(u);
        (u, v)
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Aabb geometry helpers
// ──────────────────────────────────────────────────────────────────────────
impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn translated(&self, by: Vec3) -> Self {
        Self::new(self.min + by, self.max + by)
    }

    /// Euclidean distance from `p` to the box (0 inside).
    pub fn distance_to(&self, p: Vec3) -> f32 {
        (p - p.clamp(self.min, self.max)).length()
    }

    /// Slab test: fraction along `start → end` where the segment enters the
    /// box, or `None` when it misses.
    pub fn clip_segment(&self, start: Vec3, end: Vec3) -> Option<f32> {
        let delta = end - start;
        let (mut enter, mut exit) = (0.0f32, 1.0f32);

        for axis in 0..3 {
            let (s, d) = (start[axis], delta[axis]);
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < f32::EPSILON {
                if s < lo - ON_PLANE_EPSILON || s > hi + ON_PLANE_EPSILON {
                    return None;
                }
                continue;
            }
            let t0 = (lo - ON_PLANE_EPSILON - s) / d;
            let t1 = (hi + ON_PLANE_EPSILON - s) / d;
            enter = enter.max(t0.min(t1));
            exit = exit.min(t0.max(t1));
            if enter > exit {
                return None;
            }
        }
        Some(enter)
    }
}
