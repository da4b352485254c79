//! Tileset persistence: serializable packages plus a file-backed store
//! with schema versioning and integrity checks.

mod package;
mod store;

pub use package::{PersistedTileInfo, TilesetPackage};
pub use store::{StoreError, TilesetMeta, TilesetStore};

pub fn crate_info() -> &'static str {
    "tilespace-persist v0.1.0"
}
