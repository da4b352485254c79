use glam::IVec2;
use tilespace_common::TileId;
use tilespace_kernel::{HierarchyIndex, LoadState, TileStore};

use crate::config::WorldConfig;
use crate::visibility::{editable_window, should_be_visible};

/// Shelve every active tile that will fall outside the window at
/// `new_origin`. Runs before the origin value changes so content can be
/// hidden ahead of the coordinate shift. Idempotent: transitions are
/// guarded by current state.
pub fn pre_rebase(
    store: &mut TileStore,
    hierarchy: &HierarchyIndex,
    config: &WorldConfig,
    _old_origin: IVec2,
    new_origin: IVec2,
) -> Vec<TileId> {
    let window = editable_window(new_origin, config.editable_half_extent);
    let root = hierarchy.root();
    let mut shelved = Vec::new();
    for id in store.ids() {
        if id == root {
            continue;
        }
        let Some(rec) = store.get_mut(id) else { continue };
        if rec.load_state == LoadState::Loaded
            && !rec.always_loaded
            && !should_be_visible(rec, &window)
        {
            rec.load_state = LoadState::Shelved;
            tracing::debug!(tile = %rec.name, "shelving tile outside new window");
            shelved.push(id);
        }
    }
    shelved
}

/// Unshelve every shelved tile that fits the window at `new_origin`.
/// Runs after the origin value has changed. Not-loaded tiles are left
/// alone; they are evaluated lazily at load time.
pub fn post_rebase(
    store: &mut TileStore,
    hierarchy: &HierarchyIndex,
    config: &WorldConfig,
    _old_origin: IVec2,
    new_origin: IVec2,
) -> Vec<TileId> {
    let window = editable_window(new_origin, config.editable_half_extent);
    let root = hierarchy.root();
    let mut unshelved = Vec::new();
    for id in store.ids() {
        if id == root {
            continue;
        }
        let Some(rec) = store.get_mut(id) else { continue };
        if rec.load_state == LoadState::Shelved && should_be_visible(rec, &window) {
            rec.load_state = LoadState::Loaded;
            tracing::debug!(tile = %rec.name, "unshelving tile inside window");
            unshelved.push(id);
        }
    }
    unshelved
}
