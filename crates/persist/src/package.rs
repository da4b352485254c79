use glam::IVec2;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tilespace_common::{Bounds2, TileId};
use tilespace_kernel::{LoadState, TileKind, TileRecord, TileStore};

/// Per-tile persisted attributes. Keyed by name so packages stay stable
/// across sessions; runtime ids are reassigned on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTileInfo {
    pub name: String,
    /// Parent tile name. `None` marks the package root.
    pub parent: Option<String>,
    /// Position relative to the parent (absolute for the root).
    pub position: IVec2,
    pub bounds: Option<Bounds2>,
    pub always_loaded: bool,
    pub z_order: i32,
    pub kind: TileKind,
}

impl PersistedTileInfo {
    pub fn from_record(record: &TileRecord, parent_name: Option<String>) -> Self {
        Self {
            name: record.name.clone(),
            parent: parent_name,
            position: record.relative_position,
            bounds: record.local_bounds,
            always_loaded: record.always_loaded,
            z_order: record.z_order,
            kind: record.kind,
        }
    }
}

/// A serializable tile collection, the unit of save and load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TilesetPackage {
    pub tiles: Vec<PersistedTileInfo>,
}

impl TilesetPackage {
    /// Capture the persisted fields of every tile in the store. Parent
    /// links are resolved to names; a dangling parent id resolves to the
    /// root's name so the package keeps exactly one root marker.
    pub fn capture(store: &TileStore) -> Self {
        let root_name = store
            .all_tiles()
            .find(|rec| rec.parent.is_none())
            .map(|rec| rec.name.clone());
        let tiles = store
            .all_tiles()
            .map(|rec| {
                let parent_name = match rec.parent {
                    None => None,
                    Some(pid) => store
                        .get(pid)
                        .map(|parent| parent.name.clone())
                        .or_else(|| root_name.clone()),
                };
                PersistedTileInfo::from_record(rec, parent_name)
            })
            .collect();
        Self { tiles }
    }

    /// Materialize the package into fresh records with newly assigned
    /// ids. Tiles naming an unknown parent are attached to the package
    /// root; leaving them parentless would let a later hierarchy build
    /// crown one of them root instead.
    pub fn to_records(&self) -> Vec<TileRecord> {
        let ids: Vec<TileId> = self.tiles.iter().map(|_| TileId::new()).collect();
        let id_of = |name: &str| {
            self.tiles
                .iter()
                .position(|t| t.name == name)
                .map(|i| ids[i])
        };
        let root_id = self
            .tiles
            .iter()
            .position(|t| t.parent.is_none())
            .map(|i| ids[i]);
        self.tiles
            .iter()
            .zip(&ids)
            .map(|(info, id)| TileRecord {
                parent: info
                    .parent
                    .as_deref()
                    .and_then(|name| id_of(name).or(root_id))
                    .filter(|p| p != id),
                relative_position: info.position,
                absolute_position: info.position,
                local_bounds: info.bounds,
                always_loaded: info.always_loaded,
                z_order: info.z_order,
                kind: info.kind,
                load_state: LoadState::NotLoaded,
                ..TileRecord::new(*id, info.name.clone())
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Content hash over the canonical CBOR encoding.
    pub fn content_hash(&self) -> Result<String, crate::store::StoreError> {
        let bytes = crate::store::cbor_serialize(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}
