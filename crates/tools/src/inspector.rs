use tilespace_common::{Bounds2, TileId};
use tilespace_kernel::LoadState;
use tilespace_stream::{LevelHost, TileStreamingCoordinator};

/// Tile collection inspector for developer tooling.
///
/// Read-only queries against coordinator state for debugging and
/// development UI.
pub struct TileInspector;

impl TileInspector {
    /// Produce a summary of the tile collection.
    pub fn summary<H: LevelHost>(coordinator: &TileStreamingCoordinator<H>) -> TileSummary {
        let mut loaded = 0;
        let mut shelved = 0;
        let mut not_loaded = 0;
        for rec in coordinator.store().all_tiles() {
            match rec.load_state {
                LoadState::Loaded => loaded += 1,
                LoadState::Shelved => shelved += 1,
                LoadState::NotLoaded | LoadState::Loading => not_loaded += 1,
            }
        }
        let all = coordinator.store().ids();
        TileSummary {
            tile_count: all.len(),
            loaded,
            shelved,
            not_loaded,
            origin: [coordinator.origin().x, coordinator.origin().y],
            world_bounds: coordinator.bounding_box_of(&all, false, false),
        }
    }

    /// Detailed info about a single tile.
    pub fn inspect_tile<H: LevelHost>(
        coordinator: &TileStreamingCoordinator<H>,
        id: TileId,
    ) -> Option<TileInfo> {
        let rec = coordinator.store().get(id)?;
        Some(TileInfo {
            id,
            name: rec.name.clone(),
            parent: rec.parent.and_then(|p| {
                coordinator.store().get(p).map(|parent| parent.name.clone())
            }),
            position: [rec.absolute_position.x, rec.absolute_position.y],
            load_state: rec.load_state,
            always_loaded: rec.always_loaded,
            visible: coordinator.should_be_visible(id).unwrap_or(false),
        })
    }

    /// List all tile ids in the collection.
    pub fn list_tiles<H: LevelHost>(coordinator: &TileStreamingCoordinator<H>) -> Vec<TileId> {
        coordinator.store().ids()
    }
}

/// Summary of the tile collection for the inspector.
#[derive(Debug, Clone)]
pub struct TileSummary {
    pub tile_count: usize,
    pub loaded: usize,
    pub shelved: usize,
    pub not_loaded: usize,
    pub origin: [i32; 2],
    pub world_bounds: Option<Bounds2>,
}

impl std::fmt::Display for TileSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tiles: total={} loaded={} shelved={} not_loaded={} origin=({}, {})",
            self.tile_count, self.loaded, self.shelved, self.not_loaded, self.origin[0], self.origin[1],
        )
    }
}

/// Detailed info about a single tile.
#[derive(Debug, Clone)]
pub struct TileInfo {
    pub id: TileId,
    pub name: String,
    pub parent: Option<String>,
    pub position: [i32; 2],
    pub load_state: LoadState,
    pub always_loaded: bool,
    pub visible: bool,
}

impl std::fmt::Display for TileInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tile [{:.8}] {} parent={} pos=({}, {}) state={:?} visible={}",
            &self.id.0.to_string()[..8],
            self.name,
            self.parent.as_deref().unwrap_or("-"),
            self.position[0],
            self.position[1],
            self.load_state,
            self.visible,
        )
    }
}
