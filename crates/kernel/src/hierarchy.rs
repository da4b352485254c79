use std::collections::{BTreeMap, BTreeSet};
use tilespace_common::TileId;

use crate::store::TileStore;

/// Errors from hierarchy derivation.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error("tile store has no root tile")]
    NoRoot,
}

/// Parent/child adjacency derived from the tile store.
///
/// The index is a cache: it must be rebuilt whenever parent links change
/// in bulk. Tiles whose declared parent is missing or invalid are attached
/// to the root so they never vanish from traversal.
#[derive(Debug, Clone)]
pub struct HierarchyIndex {
    root: TileId,
    parents: BTreeMap<TileId, TileId>,
    children: BTreeMap<TileId, Vec<TileId>>,
}

impl HierarchyIndex {
    pub fn build(store: &TileStore) -> Result<Self, HierarchyError> {
        let mut index = Self {
            root: TileId::new(),
            parents: BTreeMap::new(),
            children: BTreeMap::new(),
        };
        index.rebuild(store)?;
        Ok(index)
    }

    /// Full recompute from the store's declared parent links.
    ///
    /// The single parentless tile becomes the root. A tile pointing at a
    /// nonexistent parent, at itself, or parentless beyond the first is
    /// reattached to the root.
    pub fn rebuild(&mut self, store: &TileStore) -> Result<(), HierarchyError> {
        self.parents.clear();
        self.children.clear();

        let root = store
            .all_tiles()
            .find(|rec| rec.parent.is_none())
            .map(|rec| rec.id)
            .ok_or(HierarchyError::NoRoot)?;
        self.root = root;

        for rec in store.all_tiles() {
            if rec.id == root {
                continue;
            }
            let parent = match rec.parent {
                Some(p) if p != rec.id && store.contains(p) => p,
                declared => {
                    tracing::warn!(tile = %rec.name, ?declared, "invalid parent link, attaching to root");
                    root
                }
            };
            self.parents.insert(rec.id, parent);
            self.children.entry(parent).or_default().push(rec.id);
        }

        // Stable child ordering for traversal and UI listings.
        for kids in self.children.values_mut() {
            kids.sort_by(|a, b| {
                let ka = store.get(*a).map(|r| (r.z_order, r.name.clone()));
                let kb = store.get(*b).map(|r| (r.z_order, r.name.clone()));
                ka.cmp(&kb)
            });
        }
        Ok(())
    }

    pub fn root(&self) -> TileId {
        self.root
    }

    pub fn parent_of(&self, id: TileId) -> Option<TileId> {
        self.parents.get(&id).copied()
    }

    pub fn children_of(&self, id: TileId) -> &[TileId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Strict ancestor test, bounded against malformed (cyclic) links.
    pub fn is_ancestor_of(&self, ancestor: TileId, node: TileId) -> bool {
        let mut visited = BTreeSet::new();
        let mut current = node;
        while let Some(parent) = self.parent_of(current) {
            if !visited.insert(current) {
                return false;
            }
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    /// All descendants of `id` in preorder (parents before children).
    pub fn descendants_of(&self, id: TileId) -> Vec<TileId> {
        let mut result = Vec::new();
        let mut stack: Vec<TileId> = self.children_of(id).to_vec();
        while let Some(next) = stack.pop() {
            result.push(next);
            stack.extend_from_slice(self.children_of(next));
        }
        result
    }

    /// Reduce a selection to tiles that have no ancestor also selected.
    ///
    /// O(n²) in selection size; interactive selections are small.
    pub fn top_level_of(&self, ids: &[TileId]) -> Vec<TileId> {
        ids.iter()
            .copied()
            .filter(|candidate| {
                !ids.iter()
                    .any(|other| *other != *candidate && self.is_ancestor_of(*other, *candidate))
            })
            .collect()
    }
}
