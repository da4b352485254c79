//! Tile Kernel: authoritative tile records, store, and hierarchy.
//!
//! # Invariants
//! - Every tile's absolute position equals its relative position plus its
//!   parent's absolute position, all the way up to the single root.
//! - Translating a tile moves all of its descendants by the same delta
//!   (rigid propagation); descendants' relative positions never change.
//! - Exactly one root tile anchors the hierarchy; tiles with a missing or
//!   invalid parent link are reattached to the root, never dropped.

mod hierarchy;
mod store;
mod tile;

pub use hierarchy::{HierarchyError, HierarchyIndex};
pub use store::TileStore;
pub use tile::{LoadState, TileKind, TileRecord};

pub fn crate_info() -> &'static str {
    "tilespace-kernel v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("kernel"));
    }
}
