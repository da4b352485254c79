//! Authoring layer: undoable editing of the tile collection.

mod editor;

pub use editor::{EditOp, TileEditor};

pub fn crate_info() -> &'static str {
    "tilespace-author v0.1.0"
}
