/// Streaming configuration: editable window size, snapping, rebase toggle.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Half-extent of the editable window along each axis, in world units.
    /// Tiles outside the window around the current origin are shelved.
    pub editable_half_extent: f64,
    /// Maximum edge-to-edge distance at which bounds snapping engages.
    pub snap_distance: f64,
    /// Grid cell size for plain grid snapping of translation deltas.
    pub grid_size: i32,
    /// When false, focus and origin moves are recognized no-ops.
    pub rebasing_enabled: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            // Half of the maximum world span the editor keeps addressable
            // at full precision.
            editable_half_extent: 2_097_152.0,
            snap_distance: 50.0,
            grid_size: 1,
            rebasing_enabled: true,
        }
    }
}
