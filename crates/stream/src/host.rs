use glam::IVec2;
use std::collections::BTreeSet;
use tilespace_common::{Bounds2, TileId};
use tilespace_kernel::{LoadState, TileKind, TileRecord};

/// One tile as reported by the host's initial scan.
#[derive(Debug, Clone)]
pub struct TileScan {
    pub id: TileId,
    pub name: String,
    pub parent: Option<TileId>,
    /// Position relative to the parent (absolute for the root).
    pub position: IVec2,
    pub bounds: Option<Bounds2>,
    pub always_loaded: bool,
    pub z_order: i32,
    pub kind: TileKind,
}

impl TileScan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TileId::new(),
            name: name.into(),
            parent: None,
            position: IVec2::ZERO,
            bounds: None,
            always_loaded: false,
            z_order: 0,
            kind: TileKind::Standard,
        }
    }
}

impl From<&TileScan> for TileRecord {
    fn from(scan: &TileScan) -> Self {
        TileRecord {
            parent: scan.parent,
            relative_position: scan.position,
            absolute_position: scan.position,
            local_bounds: scan.bounds,
            always_loaded: scan.always_loaded,
            z_order: scan.z_order,
            kind: scan.kind,
            load_state: LoadState::NotLoaded,
            ..TileRecord::new(scan.id, scan.name.clone())
        }
    }
}

impl From<&TileRecord> for TileScan {
    fn from(record: &TileRecord) -> Self {
        TileScan {
            id: record.id,
            name: record.name.clone(),
            parent: record.parent,
            position: record.relative_position,
            bounds: record.local_bounds,
            always_loaded: record.always_loaded,
            z_order: record.z_order,
            kind: record.kind,
        }
    }
}

/// The engine-side collaborator the coordinator drives.
///
/// Load and unload requests are synchronous from the coordinator's point
/// of view: `request_load` returning true means the content is resident
/// by the time the call returns.
pub trait LevelHost {
    /// Enumerate all known tiles. Called once per session/refresh.
    fn scan_tiles(&mut self) -> Vec<TileScan>;
    /// Activate a tile's level content. Returns false if refused.
    fn request_load(&mut self, id: TileId) -> bool;
    /// Deactivate a tile's level content.
    fn request_unload(&mut self, id: TileId);
    /// Physically translate the loaded content of a tile by `delta`.
    fn apply_world_offset(&mut self, id: TileId, delta: IVec2);
    /// Write-through of a tile's persisted fields after they change.
    fn persist_tile_info(&mut self, record: &TileRecord);
}

/// In-memory host for demos and tests; records every call it receives.
#[derive(Debug, Default)]
pub struct MemoryHost {
    pub tiles: Vec<TileScan>,
    /// Tiles whose load requests should be refused.
    pub refuse_loads: BTreeSet<TileId>,
    pub load_requests: Vec<TileId>,
    pub unload_requests: Vec<TileId>,
    pub offsets: Vec<(TileId, IVec2)>,
    pub persisted: Vec<TileRecord>,
}

impl MemoryHost {
    pub fn new(tiles: Vec<TileScan>) -> Self {
        Self {
            tiles,
            ..Self::default()
        }
    }
}

impl LevelHost for MemoryHost {
    fn scan_tiles(&mut self) -> Vec<TileScan> {
        self.tiles.clone()
    }

    fn request_load(&mut self, id: TileId) -> bool {
        self.load_requests.push(id);
        !self.refuse_loads.contains(&id)
    }

    fn request_unload(&mut self, id: TileId) {
        self.unload_requests.push(id);
    }

    fn apply_world_offset(&mut self, id: TileId, delta: IVec2) {
        self.offsets.push((id, delta));
    }

    fn persist_tile_info(&mut self, record: &TileRecord) {
        self.persisted.push(record.clone());
    }
}
