use glam::DVec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tile in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub Uuid);

impl TileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TileId {
    fn default() -> Self {
        Self::new()
    }
}

/// Axis-aligned 2D bounding box with closed boundaries.
///
/// All intersection and containment tests treat touching edges as inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2 {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds2 {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box centered at `center` with the given half-extent along each axis.
    pub fn from_center_extent(center: DVec2, half_extent: DVec2) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Half size along each axis.
    pub fn extent(&self) -> DVec2 {
        (self.max - self.min) * 0.5
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn shifted(&self, delta: DVec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    pub fn expanded(&self, amount: f64) -> Self {
        Self {
            min: self.min - DVec2::splat(amount),
            max: self.max + DVec2::splat(amount),
        }
    }

    pub fn union(&self, other: &Bounds2) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Accumulate an optional box into an optional running total.
    pub fn union_opt(total: Option<Bounds2>, other: Option<Bounds2>) -> Option<Bounds2> {
        match (total, other) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (Some(a), None) => Some(a),
            (None, b) => b,
        }
    }

    /// Closed-boundary overlap test: touching edges count as intersecting.
    pub fn intersects(&self, other: &Bounds2) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// True if `other` lies entirely inside this box (edges included).
    pub fn contains(&self, other: &Bounds2) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_id_uniqueness() {
        let a = TileId::new();
        let b = TileId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn bounds_new_normalizes_corners() {
        let b = Bounds2::new(DVec2::new(10.0, -5.0), DVec2::new(-10.0, 5.0));
        assert_eq!(b.min, DVec2::new(-10.0, -5.0));
        assert_eq!(b.max, DVec2::new(10.0, 5.0));
    }

    #[test]
    fn bounds_center_and_extent() {
        let b = Bounds2::new(DVec2::ZERO, DVec2::new(100.0, 50.0));
        assert_eq!(b.center(), DVec2::new(50.0, 25.0));
        assert_eq!(b.extent(), DVec2::new(50.0, 25.0));
        assert_eq!(b.size(), DVec2::new(100.0, 50.0));
    }

    #[test]
    fn touching_edges_count_as_intersecting() {
        let a = Bounds2::new(DVec2::ZERO, DVec2::new(100.0, 100.0));
        let b = Bounds2::new(DVec2::new(100.0, 0.0), DVec2::new(200.0, 100.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn disjoint_boxes_do_not_intersect() {
        let a = Bounds2::new(DVec2::ZERO, DVec2::new(100.0, 100.0));
        let b = Bounds2::new(DVec2::new(100.1, 0.0), DVec2::new(200.0, 100.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn contains_includes_edges() {
        let outer = Bounds2::new(DVec2::ZERO, DVec2::new(100.0, 100.0));
        let inner = Bounds2::new(DVec2::ZERO, DVec2::new(100.0, 50.0));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn union_covers_both() {
        let a = Bounds2::new(DVec2::ZERO, DVec2::new(10.0, 10.0));
        let b = Bounds2::new(DVec2::new(50.0, -20.0), DVec2::new(60.0, 5.0));
        let u = a.union(&b);
        assert!(u.contains(&a));
        assert!(u.contains(&b));
    }

    #[test]
    fn union_opt_accumulates() {
        let a = Bounds2::new(DVec2::ZERO, DVec2::new(10.0, 10.0));
        assert_eq!(Bounds2::union_opt(None, None), None);
        assert_eq!(Bounds2::union_opt(Some(a), None), Some(a));
        assert_eq!(Bounds2::union_opt(None, Some(a)), Some(a));
    }

    #[test]
    fn shift_and_expand() {
        let b = Bounds2::new(DVec2::ZERO, DVec2::new(10.0, 10.0));
        let s = b.shifted(DVec2::new(5.0, -5.0));
        assert_eq!(s.min, DVec2::new(5.0, -5.0));
        let e = b.expanded(2.0);
        assert_eq!(e.min, DVec2::new(-2.0, -2.0));
        assert_eq!(e.max, DVec2::new(12.0, 12.0));
    }
}
