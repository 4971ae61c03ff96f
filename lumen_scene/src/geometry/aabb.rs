//! Axis-aligned bounding boxes.
//!
//! Containers carry the union of their children's boxes; transform
//! containers and instances carry a matrix-transformed box. An empty
//! container degenerates to [`AABB::EMPTY`], which is the identity for
//! [`AABB::union`].

use glam::{Mat4, Vec3};

/// Axis-Aligned Bounding Box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Degenerate empty box: min > max on every axis.
    ///
    /// Acts as the identity for `union`, so empty containers fold away
    /// when a parent recomputes its volume.
    pub const EMPTY: AABB = AABB {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Build an AABB from two arbitrary corner points.
    pub fn new(point1: Vec3, point2: Vec3) -> AABB {
        AABB {
            min: point1.min(point2),
            max: point1.max(point2),
        }
    }

    /// True if this box contains no volume (degenerate on any axis).
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Center point. Meaningless for an empty box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Smallest box enclosing both operands.
    ///
    /// `AABB::EMPTY` is the identity: `a.union(&AABB::EMPTY) == a`.
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Transform this AABB by a matrix, returning a new AABB.
    ///
    /// Uses the Arvo method: projects each matrix axis onto the AABB
    /// extents for an exact (tight) result without transforming all
    /// 8 corners. An empty box stays empty.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        if self.is_empty() {
            return *self;
        }

        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }

    /// Test if this AABB fully contains another AABB.
    ///
    /// Returns `true` if `other` is entirely within `self`.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Test if this AABB intersects (overlaps) another AABB.
    ///
    /// Returns `true` if the two AABBs overlap or touch.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
