use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};
use tilespace_common::{Bounds2, TileId};

/// Streaming state of a tile's level content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    /// Content not in memory.
    NotLoaded,
    /// Load request issued, confirmation pending.
    Loading,
    /// Content in memory and placed in the world.
    Loaded,
    /// Content in memory but hidden and excluded from active placement.
    Shelved,
}

impl LoadState {
    /// True while the tile's content is resident (placed or shelved).
    pub fn is_resident(self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Shelved)
    }
}

/// Per-kind tile behavior, consulted by policy functions.
///
/// Landscape tiles snap to their terrain component grid instead of the
/// generic bounds snapper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TileKind {
    Standard,
    Landscape { component_size: DVec2 },
}

/// A unit of world content positioned in a large 2D coordinate space.
///
/// Positions are integer vectors: `relative_position` is relative to the
/// parent tile (absolute for the root), `absolute_position` caches the sum
/// of relative positions up the parent chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub id: TileId,
    /// Package name this tile was scanned from; keys external storage.
    pub name: String,
    pub parent: Option<TileId>,
    pub relative_position: IVec2,
    pub absolute_position: IVec2,
    /// Bounding box in tile-local space. `None` until geometry is known.
    pub local_bounds: Option<Bounds2>,
    /// Always-loaded tiles are exempt from visibility and shelving logic.
    pub always_loaded: bool,
    pub load_state: LoadState,
    /// Draw/selection tie-break only; irrelevant to streaming.
    pub z_order: i32,
    pub kind: TileKind,
}

impl TileRecord {
    /// A fresh, not-yet-loaded standard tile at the origin.
    pub fn new(id: TileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            relative_position: IVec2::ZERO,
            absolute_position: IVec2::ZERO,
            local_bounds: None,
            always_loaded: false,
            load_state: LoadState::NotLoaded,
            z_order: 0,
            kind: TileKind::Standard,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_landscape(&self) -> bool {
        matches!(self.kind, TileKind::Landscape { .. })
    }

    /// Local bounds placed at the tile's absolute position.
    pub fn world_bounds(&self) -> Option<Bounds2> {
        self.local_bounds
            .map(|b| b.shifted(self.absolute_position.as_dvec2()))
    }
}
