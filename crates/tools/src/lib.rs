//! Developer tooling: read-only inspection of tile collections.

mod inspector;

pub use inspector::{TileInfo, TileInspector, TileSummary};

pub fn crate_info() -> &'static str {
    "tilespace-tools v0.1.0"
}
