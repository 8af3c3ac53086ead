// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View-tree evaluation and change tracking.
//!
//! Evaluation follows a drain-recompute pattern for each dirty channel:
//!
//! 1. **GEOMETRY** — Drain dirty indices, recompute each view's world
//!    transform as `parent_world * local_to_parent`, its effective opacity as
//!    `parent_effective * opacity`, and its effective hidden state.
//! 2. **APPEARANCE** / **CONTENT** / **SCROLL** / **LAYOUT** — Drain dirty
//!    indices (no recomputation; presenters read current values from the
//!    store).
//! 3. **TOPOLOGY** — Drain and discard (the traversal order was already
//!    rebuilt at the start of evaluation if needed).
//!
//! [`ViewChanges`] uses raw slot indices so presenters can index directly
//! into the store via the `*_at()` accessors.

use alloc::vec::Vec;

use kurbo::Affine;

use super::id::INVALID;
use super::store::ViewStore;
use crate::dirty;

/// The set of changes produced by a single [`ViewStore::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct ViewChanges {
    /// Views whose world frame, effective opacity, or hidden state was
    /// recomputed.
    pub geometry: Vec<u32>,
    /// Views whose appearance properties changed.
    pub appearance: Vec<u32>,
    /// Views whose typed content changed.
    pub content: Vec<u32>,
    /// Views whose scroll metrics (including content size) changed.
    pub scroll: Vec<u32>,
    /// Views that asked their host for a layout pass.
    pub layout_requests: Vec<u32>,
    /// Views that transitioned from visible to effectively hidden.
    pub hidden: Vec<u32>,
    /// Views that transitioned from effectively hidden to visible.
    pub unhidden: Vec<u32>,
    /// Views created since the last evaluate.
    pub added: Vec<u32>,
    /// Views destroyed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl ViewChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.geometry.clear();
        self.appearance.clear();
        self.content.clear();
        self.scroll.clear();
        self.layout_requests.clear();
        self.hidden.clear();
        self.unhidden.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }
}

impl ViewStore {
    /// Evaluates the view tree, recomputing dirty properties and returning the
    /// set of changes.
    pub fn evaluate(&mut self) -> ViewChanges {
        let mut changes = ViewChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut ViewChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let dirty_geometry: Vec<u32> = self
            .dirty
            .drain(dirty::GEOMETRY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_geometry {
            let i = idx as usize;
            let parent_idx = self.parent[i];
            let (parent_world, parent_opacity, parent_hidden) = if parent_idx != INVALID {
                let p = parent_idx as usize;
                (
                    self.world_transform[p],
                    self.effective_opacity[p],
                    self.effective_hidden[p],
                )
            } else {
                (Affine::IDENTITY, 1.0, false)
            };
            self.world_transform[i] = parent_world * self.local_to_parent(idx);
            self.effective_opacity[i] = parent_opacity * self.opacity[i];

            let new_hidden = parent_hidden || self.flags[i].hidden;
            if new_hidden != self.effective_hidden[i] {
                if new_hidden {
                    changes.hidden.push(idx);
                } else {
                    changes.unhidden.push(idx);
                }
                self.effective_hidden[i] = new_hidden;
            }
        }
        changes.geometry = dirty_geometry;

        changes.appearance = self
            .dirty
            .drain(dirty::APPEARANCE)
            .deterministic()
            .run()
            .collect();
        changes.content = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();
        changes.scroll = self
            .dirty
            .drain(dirty::SCROLL)
            .deterministic()
            .run()
            .collect();
        changes.layout_requests = self
            .dirty
            .drain(dirty::LAYOUT)
            .deterministic()
            .run()
            .collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// Returns the current traversal order (depth-first pre-order, back to
    /// front).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called at least
    /// once.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}
