//! Streaming: editable window, origin rebasing, shelve/unshelve transitions.
//!
//! # Invariants
//! - A loaded, non-always-loaded tile is active if and only if it falls in
//!   the editable window around the current origin.
//! - Shelve transitions run before the origin value changes; unshelve
//!   transitions run after, never against a stale origin.
//! - Tiles with unknown bounds fail open: they are treated as visible.

mod config;
mod coordinator;
mod host;
mod rebase;
mod snap;
mod visibility;

pub use config::WorldConfig;
pub use coordinator::{
    ChangeSet, CoordinatorSnapshot, FocusStrategy, StreamError, TileStreamingCoordinator,
};
pub use host::{LevelHost, MemoryHost, TileScan};
pub use rebase::{post_rebase, pre_rebase};
pub use snap::{bounds_snap_delta, grid_snap, grid_snap_delta, landscape_snap_delta};
pub use visibility::{editable_window, should_be_visible};

pub fn crate_info() -> &'static str {
    "tilespace-stream v0.1.0"
}
