use glam::{DVec2, IVec2};
use tilespace_common::Bounds2;
use tilespace_kernel::TileRecord;

/// The editable window: a box of fixed half-extent centered on the origin.
/// Computed on demand, never stored.
pub fn editable_window(origin: IVec2, half_extent: f64) -> Bounds2 {
    Bounds2::from_center_extent(origin.as_dvec2(), DVec2::splat(half_extent))
}

/// Whether a tile is eligible to be visible inside `window`.
///
/// The root and always-loaded tiles are unconditionally visible. Tiles
/// with unknown geometry fail open so newly-discovered content does not
/// vanish. Boundary contact counts as inside.
pub fn should_be_visible(record: &TileRecord, window: &Bounds2) -> bool {
    if record.is_root() || record.always_loaded {
        return true;
    }
    match record.world_bounds() {
        None => true,
        Some(bounds) => bounds.intersects(window),
    }
}
