use glam::IVec2;
use tilespace_common::TileId;
use tilespace_stream::{
    ChangeSet, CoordinatorSnapshot, FocusStrategy, LevelHost, StreamError,
    TileStreamingCoordinator,
};

/// One undoable edit, recorded as before/after state captures.
///
/// State capture beats command inversion here: a single translate can
/// cascade into origin moves and shelve transitions, and replaying those
/// backwards piecewise is fragile.
#[derive(Debug, Clone)]
pub struct EditOp {
    pub label: &'static str,
    before: CoordinatorSnapshot,
    after: CoordinatorSnapshot,
}

/// Undo/redo support for tile editing.
///
/// Wraps coordinator operations; every mutating call that actually
/// changed state lands on the undo stack.
#[derive(Debug, Default)]
pub struct TileEditor {
    undo_stack: Vec<EditOp>,
    redo_stack: Vec<EditOp>,
}

impl TileEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate_levels<H: LevelHost>(
        &mut self,
        coordinator: &mut TileStreamingCoordinator<H>,
        tiles: &[TileId],
        delta: IVec2,
        snap: bool,
    ) -> ChangeSet {
        self.record(coordinator, "translate", |c| {
            c.translate_levels(tiles, delta, snap)
        })
    }

    pub fn assign_parent<H: LevelHost>(
        &mut self,
        coordinator: &mut TileStreamingCoordinator<H>,
        tiles: &[TileId],
        new_parent: TileId,
    ) -> Result<(), StreamError> {
        let before = coordinator.capture();
        let result = coordinator.assign_parent(tiles, new_parent);
        if result.is_ok() {
            self.push(before, coordinator.capture(), "assign parent");
        }
        result
    }

    pub fn move_world_origin<H: LevelHost>(
        &mut self,
        coordinator: &mut TileStreamingCoordinator<H>,
        new_origin: IVec2,
    ) -> ChangeSet {
        self.record(coordinator, "move origin", |c| c.move_world_origin(new_origin))
    }

    pub fn focus<H: LevelHost>(
        &mut self,
        coordinator: &mut TileStreamingCoordinator<H>,
        area: tilespace_common::Bounds2,
        strategy: FocusStrategy,
    ) -> ChangeSet {
        self.record(coordinator, "focus", |c| c.focus(area, strategy))
    }

    pub fn reset_level_origin<H: LevelHost>(
        &mut self,
        coordinator: &mut TileStreamingCoordinator<H>,
        id: TileId,
    ) -> ChangeSet {
        self.record(coordinator, "reset tile origin", |c| c.reset_level_origin(id))
    }

    pub fn reset_world_origin<H: LevelHost>(
        &mut self,
        coordinator: &mut TileStreamingCoordinator<H>,
    ) -> ChangeSet {
        self.record(coordinator, "reset world origin", |c| c.reset_world_origin())
    }

    pub fn toggle_always_loaded<H: LevelHost>(
        &mut self,
        coordinator: &mut TileStreamingCoordinator<H>,
        tiles: &[TileId],
    ) -> ChangeSet {
        self.record(coordinator, "toggle always loaded", |c| {
            c.toggle_always_loaded(tiles)
        })
    }

    /// Undo the last edit. Returns true if an operation was undone.
    pub fn undo<H: LevelHost>(&mut self, coordinator: &mut TileStreamingCoordinator<H>) -> bool {
        let Some(op) = self.undo_stack.pop() else {
            return false;
        };
        if coordinator.restore(op.before.clone()).is_err() {
            return false;
        }
        tracing::debug!(label = op.label, "undo");
        self.redo_stack.push(op);
        true
    }

    /// Redo the last undone edit. Returns true if an operation was redone.
    pub fn redo<H: LevelHost>(&mut self, coordinator: &mut TileStreamingCoordinator<H>) -> bool {
        let Some(op) = self.redo_stack.pop() else {
            return false;
        };
        if coordinator.restore(op.after.clone()).is_err() {
            return false;
        }
        tracing::debug!(label = op.label, "redo");
        self.undo_stack.push(op);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    fn record<H: LevelHost, T>(
        &mut self,
        coordinator: &mut TileStreamingCoordinator<H>,
        label: &'static str,
        op: impl FnOnce(&mut TileStreamingCoordinator<H>) -> T,
    ) -> T {
        let before = coordinator.capture();
        let out = op(coordinator);
        self.push(before, coordinator.capture(), label);
        out
    }

    fn push(&mut self, before: CoordinatorSnapshot, after: CoordinatorSnapshot, label: &'static str) {
        // No-op edits stay off the stack so undo always does something.
        if before == after {
            return;
        }
        self.undo_stack.push(EditOp {
            label,
            before,
            after,
        });
        self.redo_stack.clear();
    }
}
