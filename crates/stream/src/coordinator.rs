use glam::IVec2;
use tilespace_common::{Bounds2, TileId};
use tilespace_kernel::{HierarchyError, HierarchyIndex, LoadState, TileKind, TileRecord, TileStore};

use crate::config::WorldConfig;
use crate::host::LevelHost;
use crate::visibility::{editable_window, should_be_visible};
use crate::{rebase, snap};

/// Errors surfaced by coordinator operations.
///
/// Most operations route around bad data instead (unknown ids are
/// skipped, missing bounds fail open); only structural problems error.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("unknown tile {0:?}")]
    UnknownTile(TileId),
    #[error("assigning {parent:?} as parent of {child:?} would create a cycle")]
    CyclicParent { child: TileId, parent: TileId },
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

/// Strategy for relocating the origin when focusing on an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusStrategy {
    /// Unconditionally center the origin on the area.
    OriginAtCenter,
    /// Relocate only if the area is not fully editable; center on it.
    EnsureEditableCentered,
    /// Relocate only if needed, shifting the window minimally so it
    /// contains the area; minimizes perceived jump.
    EnsureEditable,
}

/// Explicit record of what an operation changed, returned to the caller
/// instead of broadcast events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub moved: Vec<TileId>,
    pub loaded: Vec<TileId>,
    pub unloaded: Vec<TileId>,
    pub shelved: Vec<TileId>,
    pub unshelved: Vec<TileId>,
    /// (old, new) when the operation moved the world origin.
    pub origin: Option<(IVec2, IVec2)>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty()
            && self.loaded.is_empty()
            && self.unloaded.is_empty()
            && self.shelved.is_empty()
            && self.unshelved.is_empty()
            && self.origin.is_none()
    }

    fn merge(&mut self, other: ChangeSet) {
        self.moved.extend(other.moved);
        self.loaded.extend(other.loaded);
        self.unloaded.extend(other.unloaded);
        self.shelved.extend(other.shelved);
        self.unshelved.extend(other.unshelved);
        if other.origin.is_some() {
            self.origin = match self.origin {
                Some((old, _)) => other.origin.map(|(_, new)| (old, new)),
                None => other.origin,
            };
        }
    }
}

/// Full state capture for undo support: records plus origin.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorSnapshot {
    pub records: Vec<TileRecord>,
    pub origin: IVec2,
}

/// Top-level orchestrator for tile translation, origin rebasing, and
/// load/shelve state transitions. All collaborator access goes through
/// the `LevelHost` passed at construction; there is no ambient state.
pub struct TileStreamingCoordinator<H: LevelHost> {
    config: WorldConfig,
    store: TileStore,
    hierarchy: HierarchyIndex,
    origin: IVec2,
    host: H,
}

impl<H: LevelHost> TileStreamingCoordinator<H> {
    /// Scan tiles from the host and build the initial hierarchy.
    pub fn new(config: WorldConfig, mut host: H) -> Result<Self, StreamError> {
        let scans = host.scan_tiles();
        let mut store = TileStore::new();
        for scan in &scans {
            store.upsert(TileRecord::from(scan));
        }
        let hierarchy = HierarchyIndex::build(&store)?;
        store.refresh_absolute_positions(&hierarchy);
        tracing::info!(tiles = store.len(), "tile collection populated");
        Ok(Self {
            config,
            store,
            hierarchy,
            origin: IVec2::ZERO,
            host,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn store(&self) -> &TileStore {
        &self.store
    }

    pub fn hierarchy(&self) -> &HierarchyIndex {
        &self.hierarchy
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn origin(&self) -> IVec2 {
        self.origin
    }

    pub fn editable_window(&self) -> Bounds2 {
        editable_window(self.origin, self.config.editable_half_extent)
    }

    pub fn absolute_position(&self, id: TileId) -> Option<IVec2> {
        self.store.get(id).map(|rec| rec.absolute_position)
    }

    /// The tile's bounds placed at its absolute position.
    pub fn level_bounds(&self, id: TileId) -> Option<Bounds2> {
        self.store.get(id).and_then(|rec| rec.world_bounds())
    }

    pub fn should_be_visible(&self, id: TileId) -> Option<bool> {
        let window = self.editable_window();
        self.store.get(id).map(|rec| should_be_visible(rec, &window))
    }

    /// Union of the listed tiles' world bounds. Children contribute only
    /// while visible; with `visible_only` the listed tiles do too.
    pub fn bounding_box_of(
        &self,
        ids: &[TileId],
        include_children: bool,
        visible_only: bool,
    ) -> Option<Bounds2> {
        let mut total = None;
        for id in ids {
            if include_children {
                let kids = self.hierarchy.children_of(*id);
                total = Bounds2::union_opt(total, self.bounding_box_of(kids, true, true));
            }
            if let Some(rec) = self.store.get(*id) {
                if !visible_only || rec.load_state == LoadState::Loaded {
                    total = Bounds2::union_opt(total, rec.world_bounds());
                }
            }
        }
        total
    }

    /// Translate a set of tiles by `delta`, with optional bounds snapping.
    ///
    /// Only top-level movers are translated; descendants follow rigidly.
    /// If the move pushes tiles outside the editable window the origin is
    /// rebased just enough to keep them editable, then any tile that fits
    /// the (possibly moved) window is unshelved.
    pub fn translate_levels(&mut self, tiles: &[TileId], delta: IVec2, snap: bool) -> ChangeSet {
        let _span = tracing::info_span!("translate_levels").entered();
        let mut change = ChangeSet::default();

        let root = self.hierarchy.root();
        let known: Vec<TileId> = tiles
            .iter()
            .copied()
            .filter(|id| *id != root && self.store.contains(*id))
            .collect();
        let movers = self.hierarchy.top_level_of(&known);
        if movers.is_empty() {
            return change;
        }

        // Bounding box of the group, preferring currently-visible tiles so
        // the camera focus stays anchored to what the user can see.
        let focus_box = self
            .bounding_box_of(&movers, true, true)
            .or_else(|| self.bounding_box_of(&movers, true, false));

        let delta = self.snap_translation_delta(&movers, delta, snap);
        if delta == IVec2::ZERO {
            return change;
        }

        for id in &movers {
            let moved = self.store.translate_branch(&self.hierarchy, *id, delta);
            for moved_id in &moved {
                let resident = self
                    .store
                    .get(*moved_id)
                    .is_some_and(|rec| rec.load_state.is_resident());
                if resident {
                    self.host.apply_world_offset(*moved_id, delta);
                }
            }
            change.moved.extend(moved);
        }
        // Only branch heads changed their persisted relative position.
        for id in &movers {
            if let Some(rec) = self.store.get(*id) {
                self.host.persist_tile_info(rec);
            }
        }

        if let Some(destination) = focus_box.map(|b| b.shifted(delta.as_dvec2())) {
            change.merge(self.focus(destination, FocusStrategy::EnsureEditable));
        }

        // Previously out-of-window tiles may fit now.
        change.unshelved.extend(rebase::post_rebase(
            &mut self.store,
            &self.hierarchy,
            &self.config,
            self.origin,
            self.origin,
        ));
        change
    }

    /// Snap a translation delta: landscape tiles snap to their component
    /// grid, otherwise bounds snapping against static tiles when
    /// requested, plain grid snapping when not.
    fn snap_translation_delta(&self, movers: &[TileId], delta: IVec2, snap: bool) -> IVec2 {
        let landscape = movers.iter().find_map(|id| {
            self.store.get(*id).and_then(|rec| match rec.kind {
                TileKind::Landscape { component_size } => Some(component_size),
                TileKind::Standard => None,
            })
        });
        if let Some(component_size) = landscape {
            return snap::landscape_snap_delta(delta, component_size);
        }
        if !snap {
            return snap::grid_snap_delta(delta, self.config.grid_size);
        }
        let Some(moving_box) = self.bounding_box_of(movers, true, false) else {
            // No geometry to snap against; position tracking still applies.
            return delta;
        };
        let static_bounds = self.static_bounds(movers);
        snap::bounds_snap_delta(moving_box, delta, self.config.snap_distance, &static_bounds)
    }

    /// World bounds of every tile not in the move set and not descended
    /// from it.
    fn static_bounds(&self, movers: &[TileId]) -> Vec<Bounds2> {
        self.store
            .all_tiles()
            .filter(|rec| {
                !movers.contains(&rec.id)
                    && !movers.iter().any(|m| self.hierarchy.is_ancestor_of(*m, rec.id))
            })
            .filter_map(|rec| rec.world_bounds())
            .collect()
    }

    /// Relocate the origin so `area` becomes editable, per `strategy`.
    /// Recognized no-op when rebasing is disabled or the area is invalid.
    pub fn focus(&mut self, area: Bounds2, strategy: FocusStrategy) -> ChangeSet {
        if !self.config.rebasing_enabled || !area.is_finite() {
            return ChangeSet::default();
        }
        let window = self.editable_window();
        let editable = window.contains(&area);

        let new_origin = match strategy {
            FocusStrategy::OriginAtCenter => area.center(),
            FocusStrategy::EnsureEditableCentered => {
                if editable {
                    return ChangeSet::default();
                }
                area.center()
            }
            FocusStrategy::EnsureEditable => {
                if editable {
                    return ChangeSet::default();
                }
                // Margin against immediate re-focusing on the next nudge.
                let area = area.expanded(area.extent().length() * 0.1);
                // Shifted edges span the full window width, so the
                // expanded area lands flush with the far edge and the
                // origin moves the minimum distance.
                let axis_length = self.config.editable_half_extent * 2.0;
                let mut bounds = window;
                if area.min.x < bounds.min.x {
                    bounds.min.x = area.min.x;
                    bounds.max.x = area.min.x + axis_length;
                }
                if area.min.y < bounds.min.y {
                    bounds.min.y = area.min.y;
                    bounds.max.y = area.min.y + axis_length;
                }
                if area.max.x > bounds.max.x {
                    bounds.max.x = area.max.x;
                    bounds.min.x = area.max.x - axis_length;
                }
                if area.max.y > bounds.max.y {
                    bounds.max.y = area.max.y;
                    bounds.min.y = area.max.y - axis_length;
                }
                bounds.center()
            }
        };
        self.move_world_origin(IVec2::new(
            new_origin.x.round() as i32,
            new_origin.y.round() as i32,
        ))
    }

    /// Move the world origin, shelving tiles that leave the editable
    /// window before the origin changes and unshelving tiles that enter
    /// it after.
    pub fn move_world_origin(&mut self, new_origin: IVec2) -> ChangeSet {
        if !self.config.rebasing_enabled || new_origin == self.origin {
            return ChangeSet::default();
        }
        let _span = tracing::info_span!("move_world_origin").entered();
        let old = self.origin;
        let shelved =
            rebase::pre_rebase(&mut self.store, &self.hierarchy, &self.config, old, new_origin);
        self.origin = new_origin;
        let unshelved =
            rebase::post_rebase(&mut self.store, &self.hierarchy, &self.config, old, new_origin);
        tracing::debug!(?old, ?new_origin, shelved = shelved.len(), unshelved = unshelved.len(), "origin moved");
        ChangeSet {
            shelved,
            unshelved,
            origin: Some((old, new_origin)),
            ..ChangeSet::default()
        }
    }

    /// Move the origin back to world zero, with the usual shelve and
    /// unshelve transitions.
    pub fn reset_world_origin(&mut self) -> ChangeSet {
        if !self.config.rebasing_enabled {
            return ChangeSet::default();
        }
        self.move_world_origin(IVec2::ZERO)
    }

    /// Request loads for the given tiles, focusing the window on them
    /// first. A freshly loaded tile outside the window is shelved rather
    /// than shown.
    pub fn load_levels(&mut self, tiles: &[TileId]) -> ChangeSet {
        let _span = tracing::info_span!("load_levels").entered();

        // Focus on the accumulated bounds of the tiles being loaded; stop
        // growing the area once it would exceed the editable axis length.
        let mut focus_area: Option<Bounds2> = None;
        for id in tiles {
            if let Some(bounds) = self.store.get(*id).and_then(|rec| rec.world_bounds()) {
                let candidate = Bounds2::union_opt(focus_area, Some(bounds));
                let fits = candidate.is_none_or(|b| {
                    b.extent().x < self.config.editable_half_extent
                        && b.extent().y < self.config.editable_half_extent
                });
                if fits {
                    focus_area = candidate;
                }
            }
        }
        let mut change = match focus_area {
            Some(area) => self.focus(area, FocusStrategy::OriginAtCenter),
            None => ChangeSet::default(),
        };

        let window = self.editable_window();
        for id in tiles {
            let Some(rec) = self.store.get_mut(*id) else { continue };
            if rec.load_state != LoadState::NotLoaded {
                continue;
            }
            rec.load_state = LoadState::Loading;
            let ok = self.host.request_load(*id);
            let Some(rec) = self.store.get_mut(*id) else { continue };
            if !ok {
                tracing::warn!(tile = %rec.name, "load request refused");
                rec.load_state = LoadState::NotLoaded;
                continue;
            }
            rec.load_state = LoadState::Loaded;
            change.loaded.push(*id);
            if !should_be_visible(rec, &window) {
                rec.load_state = LoadState::Shelved;
                change.shelved.push(*id);
            }
        }
        change
    }

    /// Unload the given tiles. The root cannot be unloaded.
    pub fn unload_levels(&mut self, tiles: &[TileId]) -> ChangeSet {
        let root = self.hierarchy.root();
        let mut change = ChangeSet::default();
        for id in tiles {
            if *id == root {
                continue;
            }
            let Some(rec) = self.store.get_mut(*id) else { continue };
            if rec.load_state == LoadState::NotLoaded {
                continue;
            }
            rec.load_state = LoadState::NotLoaded;
            self.host.request_unload(*id);
            change.unloaded.push(*id);
        }
        change
    }

    /// Explicit UI-driven shelve. Root and always-loaded tiles are exempt.
    pub fn shelve_levels(&mut self, tiles: &[TileId]) -> Vec<TileId> {
        let root = self.hierarchy.root();
        let mut shelved = Vec::new();
        for id in tiles {
            if *id == root {
                continue;
            }
            let Some(rec) = self.store.get_mut(*id) else { continue };
            if rec.load_state == LoadState::Loaded && !rec.always_loaded {
                rec.load_state = LoadState::Shelved;
                shelved.push(*id);
            }
        }
        shelved
    }

    /// Explicit UI-driven unshelve.
    pub fn unshelve_levels(&mut self, tiles: &[TileId]) -> Vec<TileId> {
        let mut unshelved = Vec::new();
        for id in tiles {
            let Some(rec) = self.store.get_mut(*id) else { continue };
            if rec.load_state == LoadState::Shelved {
                rec.load_state = LoadState::Loaded;
                unshelved.push(*id);
            }
        }
        unshelved
    }

    /// Reattach tiles under a new parent, preserving their absolute
    /// positions. Rejects reparenting that would create a cycle.
    pub fn assign_parent(&mut self, tiles: &[TileId], new_parent: TileId) -> Result<(), StreamError> {
        let parent_abs = self
            .store
            .get(new_parent)
            .map(|rec| rec.absolute_position)
            .ok_or(StreamError::UnknownTile(new_parent))?;

        let root = self.hierarchy.root();
        let tiles: Vec<TileId> = tiles.iter().copied().filter(|id| *id != root).collect();
        for id in &tiles {
            if *id == new_parent || self.hierarchy.is_ancestor_of(*id, new_parent) {
                return Err(StreamError::CyclicParent {
                    child: *id,
                    parent: new_parent,
                });
            }
        }

        for id in &tiles {
            let Some(rec) = self.store.get_mut(*id) else { continue };
            // Detach to absolute, reattach relative to the new parent.
            rec.parent = Some(new_parent);
            rec.relative_position = rec.absolute_position - parent_abs;
        }
        self.hierarchy.rebuild(&self.store)?;
        self.store.refresh_absolute_positions(&self.hierarchy);
        for id in &tiles {
            if let Some(rec) = self.store.get(*id) {
                self.host.persist_tile_info(rec);
            }
        }
        Ok(())
    }

    /// Return a tile to the world origin: translate it by the negation of
    /// its absolute position, without snapping.
    pub fn reset_level_origin(&mut self, id: TileId) -> ChangeSet {
        match self.store.get(id) {
            Some(rec) if rec.absolute_position != IVec2::ZERO => {
                let delta = IVec2::ZERO - rec.absolute_position;
                self.translate_levels(&[id], delta, false)
            }
            _ => ChangeSet::default(),
        }
    }

    /// Flip the always-loaded flag, re-evaluating visibility: a shelved
    /// tile becoming always-loaded is unshelved; a tile losing the flag
    /// outside the window is shelved.
    pub fn toggle_always_loaded(&mut self, tiles: &[TileId]) -> ChangeSet {
        let root = self.hierarchy.root();
        let window = self.editable_window();
        let mut change = ChangeSet::default();
        for id in tiles {
            if *id == root {
                continue;
            }
            let Some(rec) = self.store.get_mut(*id) else { continue };
            rec.always_loaded = !rec.always_loaded;
            if rec.always_loaded && rec.load_state == LoadState::Shelved {
                rec.load_state = LoadState::Loaded;
                change.unshelved.push(*id);
            } else if !rec.always_loaded
                && rec.load_state == LoadState::Loaded
                && !should_be_visible(rec, &window)
            {
                rec.load_state = LoadState::Shelved;
                change.shelved.push(*id);
            }
            if let Some(rec) = self.store.get(*id) {
                self.host.persist_tile_info(rec);
            }
        }
        change
    }

    /// Remove a tile from the store entirely ("unload and forget").
    pub fn forget_level(&mut self, id: TileId) -> Result<(), StreamError> {
        if id == self.hierarchy.root() {
            return Err(StreamError::UnknownTile(id));
        }
        if let Some(rec) = self.store.get(id) {
            if rec.load_state.is_resident() {
                self.host.request_unload(id);
            }
            self.store.remove(id);
            self.hierarchy.rebuild(&self.store)?;
            self.store.refresh_absolute_positions(&self.hierarchy);
        }
        Ok(())
    }

    /// Capture the full tile state for undo support.
    pub fn capture(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            records: self.store.all_tiles().cloned().collect(),
            origin: self.origin,
        }
    }

    /// Restore a previously captured state. Does not touch the host.
    pub fn restore(&mut self, snapshot: CoordinatorSnapshot) -> Result<(), StreamError> {
        self.store = TileStore::from_records(snapshot.records);
        self.hierarchy.rebuild(&self.store)?;
        self.origin = snapshot.origin;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, TileScan};
    use glam::DVec2;

    fn bounds(half: f64) -> Bounds2 {
        Bounds2::new(DVec2::splat(-half), DVec2::splat(half))
    }

    struct Fixture {
        coordinator: TileStreamingCoordinator<MemoryHost>,
        root: TileId,
        parent: TileId,
        child: TileId,
        sibling: TileId,
    }

    fn fixture() -> Fixture {
        let mut root = TileScan::new("root");
        root.bounds = Some(bounds(10.0));
        let mut parent = TileScan::new("parent");
        parent.parent = Some(root.id);
        parent.position = IVec2::new(100, 100);
        parent.bounds = Some(bounds(50.0));
        let mut child = TileScan::new("child");
        child.parent = Some(parent.id);
        child.position = IVec2::new(10, -10);
        child.bounds = Some(bounds(50.0));
        let mut sibling = TileScan::new("sibling");
        sibling.parent = Some(root.id);
        sibling.position = IVec2::new(-200, 0);
        sibling.bounds = Some(bounds(50.0));

        let (rid, pid, cid, sid) = (root.id, parent.id, child.id, sibling.id);
        let host = MemoryHost::new(vec![root, parent, child, sibling]);
        let config = WorldConfig {
            editable_half_extent: 1000.0,
            snap_distance: 5.0,
            ..WorldConfig::default()
        };
        let mut coordinator = TileStreamingCoordinator::new(config, host).unwrap();
        for id in coordinator.store.ids() {
            coordinator.store.get_mut(id).unwrap().load_state = LoadState::Loaded;
        }
        Fixture {
            coordinator,
            root: rid,
            parent: pid,
            child: cid,
            sibling: sid,
        }
    }

    #[test]
    fn populate_resolves_absolute_positions() {
        let f = fixture();
        assert_eq!(f.coordinator.absolute_position(f.root), Some(IVec2::ZERO));
        assert_eq!(
            f.coordinator.absolute_position(f.child),
            Some(IVec2::new(110, 90))
        );
    }

    #[test]
    fn translate_child_moves_only_child() {
        // Scenario: root at (0,0), child of root at (100,100); translating
        // the child by (50,0) leaves the root untouched.
        let mut f = fixture();
        let change = f
            .coordinator
            .translate_levels(&[f.parent], IVec2::new(50, 0), false);
        assert!(change.moved.contains(&f.parent));
        assert_eq!(
            f.coordinator.absolute_position(f.parent),
            Some(IVec2::new(150, 100))
        );
        assert_eq!(f.coordinator.absolute_position(f.root), Some(IVec2::ZERO));
    }

    #[test]
    fn translate_selection_with_descendant_applies_delta_once() {
        // Parent and child both selected; the child moves only via
        // propagation, never twice.
        let mut f = fixture();
        f.coordinator
            .translate_levels(&[f.parent, f.child], IVec2::new(10, 10), false);
        assert_eq!(
            f.coordinator.absolute_position(f.parent),
            Some(IVec2::new(110, 110))
        );
        assert_eq!(
            f.coordinator.absolute_position(f.child),
            Some(IVec2::new(120, 100))
        );
        // Child's relative offset to its parent is preserved.
        let rec = f.coordinator.store().get(f.child).unwrap();
        assert_eq!(rec.relative_position, IVec2::new(10, -10));
    }

    #[test]
    fn translate_applies_world_offsets_for_resident_tiles() {
        let mut f = fixture();
        f.coordinator
            .translate_levels(&[f.parent], IVec2::new(50, 0), false);
        let offsets = &f.coordinator.host().offsets;
        assert!(offsets.contains(&(f.parent, IVec2::new(50, 0))));
        assert!(offsets.contains(&(f.child, IVec2::new(50, 0))));
    }

    #[test]
    fn translate_persists_branch_heads() {
        let mut f = fixture();
        f.coordinator
            .translate_levels(&[f.parent], IVec2::new(50, 0), false);
        let persisted = &f.coordinator.host().persisted;
        assert!(persisted.iter().any(|rec| rec.id == f.parent));
        assert!(!persisted.iter().any(|rec| rec.id == f.child));
    }

    #[test]
    fn translate_unknown_or_root_is_noop() {
        let mut f = fixture();
        let change = f
            .coordinator
            .translate_levels(&[f.root, TileId::new()], IVec2::new(5, 5), false);
        assert!(change.is_empty());
    }

    #[test]
    fn translate_far_rebases_origin_and_unshelves() {
        let mut f = fixture();
        let change = f
            .coordinator
            .translate_levels(&[f.sibling], IVec2::new(5000, 0), false);
        // The move pushed the tile out of the old window; the origin must
        // have shifted enough to keep it editable.
        assert!(change.origin.is_some());
        let window = f.coordinator.editable_window();
        let bounds = f.coordinator.level_bounds(f.sibling).unwrap();
        assert!(window.contains(&bounds));
        // Still active at its destination.
        let rec = f.coordinator.store().get(f.sibling).unwrap();
        assert_eq!(rec.load_state, LoadState::Loaded);
    }

    #[test]
    fn bounds_snap_aligns_with_static_edge() {
        // Static sibling spans [-250,-50]..[-150,50]. Move the parent
        // group so its left edge lands near the sibling's right edge.
        let mut f = fixture();
        let before = f.coordinator.level_bounds(f.parent).unwrap();
        // Parent group's box spans [50,-60]..[160,150] (parent + child).
        // Target its left edge (50) to x=-148: delta -198 puts it within
        // snap distance 5 of the static edge at -150.
        let change = f
            .coordinator
            .translate_levels(&[f.parent], IVec2::new(-198, 0), true);
        assert!(!change.moved.is_empty());
        // Snapped delta is -200: the group edge lands exactly at -150.
        let after = f.coordinator.level_bounds(f.parent).unwrap();
        assert_eq!(after.min.x, before.min.x - 200.0);
    }

    #[test]
    fn grid_snap_applies_when_snapping_disabled() {
        let mut f = fixture();
        f.coordinator.config.grid_size = 100;
        f.coordinator
            .translate_levels(&[f.sibling], IVec2::new(130, -70), false);
        assert_eq!(
            f.coordinator.absolute_position(f.sibling),
            Some(IVec2::new(-100, -100))
        );
    }

    #[test]
    fn landscape_movers_snap_to_component_grid() {
        let mut f = fixture();
        {
            let rec = f.coordinator.store.get_mut(f.sibling).unwrap();
            rec.kind = TileKind::Landscape {
                component_size: DVec2::new(128.0, 128.0),
            };
        }
        f.coordinator
            .translate_levels(&[f.sibling], IVec2::new(130, 70), true);
        assert_eq!(
            f.coordinator.absolute_position(f.sibling),
            Some(IVec2::new(-72, 128))
        );
    }

    #[test]
    fn focus_origin_at_center_always_moves() {
        let mut f = fixture();
        let area = Bounds2::new(DVec2::new(90.0, 90.0), DVec2::new(110.0, 110.0));
        let change = f.coordinator.focus(area, FocusStrategy::OriginAtCenter);
        assert_eq!(change.origin, Some((IVec2::ZERO, IVec2::new(100, 100))));
    }

    #[test]
    fn focus_ensure_editable_is_noop_when_inside() {
        let mut f = fixture();
        let area = Bounds2::new(DVec2::new(-10.0, -10.0), DVec2::new(10.0, 10.0));
        assert!(f
            .coordinator
            .focus(area, FocusStrategy::EnsureEditable)
            .is_empty());
        assert!(f
            .coordinator
            .focus(area, FocusStrategy::EnsureEditableCentered)
            .is_empty());
    }

    #[test]
    fn focus_ensure_editable_shifts_minimally() {
        let mut f = fixture();
        // Area just beyond the +x window edge (window is ±1000).
        let area = Bounds2::new(DVec2::new(1100.0, -10.0), DVec2::new(1200.0, 10.0));
        let change = f.coordinator.focus(area, FocusStrategy::EnsureEditable);
        let (_, new_origin) = change.origin.unwrap();
        // Only the x axis shifts, and just enough to cover the area plus
        // its 10% margin; re-centering would have put the origin at 1150.
        assert_eq!(new_origin.y, 0);
        assert!(new_origin.x > 0 && new_origin.x < 300);
        let window = f.coordinator.editable_window();
        assert!(window.contains(&area));
    }

    #[test]
    fn focus_ensure_editable_centered_recenter() {
        let mut f = fixture();
        let area = Bounds2::new(DVec2::new(5000.0, 5000.0), DVec2::new(5100.0, 5100.0));
        let change = f
            .coordinator
            .focus(area, FocusStrategy::EnsureEditableCentered);
        assert_eq!(change.origin, Some((IVec2::ZERO, IVec2::new(5050, 5050))));
    }

    #[test]
    fn focus_noop_when_rebasing_disabled() {
        let mut f = fixture();
        f.coordinator.config.rebasing_enabled = false;
        let area = Bounds2::new(DVec2::new(5000.0, 5000.0), DVec2::new(5100.0, 5100.0));
        assert!(f
            .coordinator
            .focus(area, FocusStrategy::OriginAtCenter)
            .is_empty());
        assert!(f.coordinator.move_world_origin(IVec2::new(1, 1)).is_empty());
    }

    #[test]
    fn move_origin_shelves_and_unshelves() {
        let mut f = fixture();
        let change = f.coordinator.move_world_origin(IVec2::new(100_000, 0));
        // Everything but the root leaves the window.
        assert_eq!(change.shelved.len(), 3);
        let back = f.coordinator.move_world_origin(IVec2::ZERO);
        assert_eq!(back.unshelved.len(), 3);
        assert!(f
            .coordinator
            .store()
            .all_tiles()
            .all(|rec| rec.load_state == LoadState::Loaded));
    }

    #[test]
    fn reset_world_origin_returns_to_zero() {
        let mut f = fixture();
        f.coordinator.move_world_origin(IVec2::new(5000, 0));
        let change = f.coordinator.reset_world_origin();
        assert_eq!(change.origin.map(|(_, n)| n), Some(IVec2::ZERO));
    }

    #[test]
    fn load_shelves_out_of_window_tile() {
        // A tile loaded while outside the editable window must come up
        // shelved, not visible.
        let mut far = TileScan::new("far");
        let mut root = TileScan::new("root");
        root.bounds = Some(bounds(10.0));
        far.parent = Some(root.id);
        far.position = IVec2::new(50_000, 0);
        far.bounds = Some(bounds(10.0));
        let mut near = TileScan::new("near");
        near.parent = Some(root.id);
        near.position = IVec2::new(20, 0);
        near.bounds = Some(bounds(10.0));
        let (fid, nid) = (far.id, near.id);
        let host = MemoryHost::new(vec![root, far, near]);
        let config = WorldConfig {
            editable_half_extent: 1000.0,
            rebasing_enabled: false,
            ..WorldConfig::default()
        };
        let mut coordinator = TileStreamingCoordinator::new(config, host).unwrap();

        let change = coordinator.load_levels(&[fid, nid]);
        assert!(change.loaded.contains(&fid));
        assert!(change.shelved.contains(&fid));
        assert_eq!(
            coordinator.store().get(fid).unwrap().load_state,
            LoadState::Shelved
        );
        assert_eq!(
            coordinator.store().get(nid).unwrap().load_state,
            LoadState::Loaded
        );
    }

    #[test]
    fn load_focuses_origin_on_requested_tiles() {
        let mut root = TileScan::new("root");
        root.bounds = Some(bounds(10.0));
        let mut far = TileScan::new("far");
        far.parent = Some(root.id);
        far.position = IVec2::new(50_000, 0);
        far.bounds = Some(bounds(10.0));
        let fid = far.id;
        let host = MemoryHost::new(vec![root, far]);
        let config = WorldConfig {
            editable_half_extent: 1000.0,
            ..WorldConfig::default()
        };
        let mut coordinator = TileStreamingCoordinator::new(config, host).unwrap();

        let change = coordinator.load_levels(&[fid]);
        assert_eq!(change.origin.map(|(_, n)| n), Some(IVec2::new(50_000, 0)));
        assert_eq!(
            coordinator.store().get(fid).unwrap().load_state,
            LoadState::Loaded
        );
    }

    #[test]
    fn refused_load_reverts_to_not_loaded() {
        let mut f = fixture();
        let extra = TileScan {
            parent: Some(f.root),
            ..TileScan::new("extra")
        };
        let eid = extra.id;
        f.coordinator.store.upsert(TileRecord::from(&extra));
        f.coordinator.hierarchy.rebuild(&f.coordinator.store).unwrap();
        f.coordinator.host.refuse_loads.insert(eid);

        let change = f.coordinator.load_levels(&[eid]);
        assert!(change.loaded.is_empty());
        assert_eq!(
            f.coordinator.store().get(eid).unwrap().load_state,
            LoadState::NotLoaded
        );
    }

    #[test]
    fn unload_requests_host_and_clears_state() {
        let mut f = fixture();
        let change = f.coordinator.unload_levels(&[f.sibling, f.root]);
        assert_eq!(change.unloaded, vec![f.sibling]);
        assert_eq!(f.coordinator.host().unload_requests, vec![f.sibling]);
        assert_eq!(
            f.coordinator.store().get(f.root).unwrap().load_state,
            LoadState::Loaded
        );
    }

    #[test]
    fn shelve_and_unshelve_explicitly() {
        let mut f = fixture();
        let shelved = f.coordinator.shelve_levels(&[f.sibling, f.root]);
        assert_eq!(shelved, vec![f.sibling]);
        let unshelved = f.coordinator.unshelve_levels(&[f.sibling]);
        assert_eq!(unshelved, vec![f.sibling]);
    }

    #[test]
    fn shelve_skips_always_loaded() {
        let mut f = fixture();
        f.coordinator.store.get_mut(f.sibling).unwrap().always_loaded = true;
        assert!(f.coordinator.shelve_levels(&[f.sibling]).is_empty());
    }

    #[test]
    fn assign_parent_preserves_absolute_position() {
        let mut f = fixture();
        let before = f.coordinator.absolute_position(f.child).unwrap();
        f.coordinator.assign_parent(&[f.child], f.sibling).unwrap();
        assert_eq!(f.coordinator.absolute_position(f.child), Some(before));
        let rec = f.coordinator.store().get(f.child).unwrap();
        assert_eq!(rec.parent, Some(f.sibling));
        // relative = absolute - new parent's absolute = (110,90) - (-200,0)
        assert_eq!(rec.relative_position, IVec2::new(310, 90));
    }

    #[test]
    fn assign_parent_rejects_cycles() {
        let mut f = fixture();
        let err = f.coordinator.assign_parent(&[f.parent], f.child);
        assert!(matches!(err, Err(StreamError::CyclicParent { .. })));
        let err = f.coordinator.assign_parent(&[f.parent], f.parent);
        assert!(matches!(err, Err(StreamError::CyclicParent { .. })));
    }

    #[test]
    fn assign_parent_unknown_parent_errors() {
        let mut f = fixture();
        assert!(matches!(
            f.coordinator.assign_parent(&[f.child], TileId::new()),
            Err(StreamError::UnknownTile(_))
        ));
    }

    #[test]
    fn reset_level_origin_returns_tile_to_zero() {
        let mut f = fixture();
        let original = f.coordinator.absolute_position(f.sibling).unwrap();
        f.coordinator.reset_level_origin(f.sibling);
        assert_eq!(
            f.coordinator.absolute_position(f.sibling),
            Some(IVec2::ZERO)
        );
        // Translating back by the original offset restores the tile.
        f.coordinator.translate_levels(&[f.sibling], original, false);
        assert_eq!(f.coordinator.absolute_position(f.sibling), Some(original));
    }

    #[test]
    fn toggle_always_loaded_unshelves() {
        let mut f = fixture();
        f.coordinator.shelve_levels(&[f.sibling]);
        let change = f.coordinator.toggle_always_loaded(&[f.sibling]);
        assert_eq!(change.unshelved, vec![f.sibling]);
        assert!(f.coordinator.store().get(f.sibling).unwrap().always_loaded);
        assert!(f
            .coordinator
            .host()
            .persisted
            .iter()
            .any(|rec| rec.id == f.sibling && rec.always_loaded));
    }

    #[test]
    fn forget_level_removes_and_rebuilds() {
        let mut f = fixture();
        f.coordinator.forget_level(f.parent).unwrap();
        assert!(f.coordinator.store().get(f.parent).is_none());
        // The orphaned child falls back to the root.
        assert_eq!(f.coordinator.hierarchy().parent_of(f.child), Some(f.root));
        assert!(f.coordinator.host().unload_requests.contains(&f.parent));
    }

    #[test]
    fn capture_restore_roundtrip() {
        let mut f = fixture();
        let snapshot = f.coordinator.capture();
        f.coordinator
            .translate_levels(&[f.parent], IVec2::new(500, 500), false);
        f.coordinator.move_world_origin(IVec2::new(100, 0));
        f.coordinator.restore(snapshot.clone()).unwrap();
        assert_eq!(f.coordinator.capture(), snapshot);
        assert_eq!(
            f.coordinator.absolute_position(f.parent),
            Some(IVec2::new(100, 100))
        );
    }

    #[test]
    fn absolute_invariant_holds_after_operations() {
        // Parent-chain consistency after a batch of mutating operations.
        let mut f = fixture();
        f.coordinator
            .translate_levels(&[f.parent, f.child], IVec2::new(37, -53), false);
        f.coordinator.assign_parent(&[f.sibling], f.parent).unwrap();
        f.coordinator.reset_level_origin(f.child);
        assert!(f
            .coordinator
            .store()
            .absolute_positions_consistent(f.coordinator.hierarchy()));
    }
}
