//! Shared types and utilities for the tilespace editor core.

mod types;

pub use types::{Bounds2, TileId};

pub fn crate_info() -> &'static str {
    "tilespace-common v0.1.0"
}
