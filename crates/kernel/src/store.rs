use glam::IVec2;
use std::collections::BTreeMap;
use tilespace_common::TileId;

use crate::hierarchy::HierarchyIndex;
use crate::tile::TileRecord;

/// The system of record for all tiles.
///
/// Uses BTreeMap for deterministic iteration order; callers must not rely
/// on the order for correctness.
#[derive(Debug, Clone, Default)]
pub struct TileStore {
    tiles: BTreeMap<TileId, TileRecord>,
}

impl TileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = TileRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.upsert(record);
        }
        store
    }

    pub fn get(&self, id: TileId) -> Option<&TileRecord> {
        self.tiles.get(&id)
    }

    pub fn get_mut(&mut self, id: TileId) -> Option<&mut TileRecord> {
        self.tiles.get_mut(&id)
    }

    /// Insert or replace a record.
    pub fn upsert(&mut self, record: TileRecord) {
        self.tiles.insert(record.id, record);
    }

    pub fn remove(&mut self, id: TileId) -> Option<TileRecord> {
        self.tiles.remove(&id)
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn all_tiles(&self) -> impl Iterator<Item = &TileRecord> {
        self.tiles.values()
    }

    pub fn ids(&self) -> Vec<TileId> {
        self.tiles.keys().copied().collect()
    }

    /// Recompute every cached absolute position from the parent chain.
    ///
    /// Walks the hierarchy from the root so parents are resolved before
    /// their children.
    pub fn refresh_absolute_positions(&mut self, hierarchy: &HierarchyIndex) {
        let root = hierarchy.root();
        if let Some(rec) = self.tiles.get_mut(&root) {
            rec.absolute_position = rec.relative_position;
        }
        let mut stack: Vec<TileId> = vec![root];
        while let Some(id) = stack.pop() {
            let parent_abs = match self.tiles.get(&id) {
                Some(rec) => rec.absolute_position,
                None => continue,
            };
            for child in hierarchy.children_of(id) {
                if let Some(rec) = self.tiles.get_mut(child) {
                    rec.absolute_position = parent_abs + rec.relative_position;
                }
                stack.push(*child);
            }
        }
    }

    /// Translate a tile and, rigidly, all of its descendants.
    ///
    /// The branch head's relative position absorbs the delta; descendants
    /// keep their relative positions and only their cached absolutes move.
    /// Returns every tile that moved, head first.
    pub fn translate_branch(
        &mut self,
        hierarchy: &HierarchyIndex,
        id: TileId,
        delta: IVec2,
    ) -> Vec<TileId> {
        let Some(head) = self.tiles.get_mut(&id) else {
            return Vec::new();
        };
        head.relative_position += delta;
        head.absolute_position += delta;
        let mut moved = vec![id];
        for descendant in hierarchy.descendants_of(id) {
            if let Some(rec) = self.tiles.get_mut(&descendant) {
                rec.absolute_position += delta;
                moved.push(descendant);
            }
        }
        moved
    }

    /// Check that every cached absolute position matches the parent chain.
    pub fn absolute_positions_consistent(&self, hierarchy: &HierarchyIndex) -> bool {
        self.tiles.values().all(|rec| {
            let expected = match hierarchy.parent_of(rec.id).and_then(|p| self.tiles.get(&p)) {
                Some(parent) => parent.absolute_position + rec.relative_position,
                None => rec.relative_position,
            };
            rec.absolute_position == expected
        })
    }
}
