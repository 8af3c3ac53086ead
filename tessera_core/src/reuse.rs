// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed pool of retired views.
//!
//! The pool remembers which reuse key every view it created belongs to in a
//! side table, so retiring a view needs nothing but its handle. Queues are
//! LIFO per key: the most recently retired view is handed out first.
//!
//! Views the pool did not create have nowhere to go once retired, so
//! [`ReusePool::enqueue`] destroys them together with their subtree.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::view::{ViewId, ViewStore};

/// A keyed store of retired, reusable views.
///
/// A pool can be shared by any number of engines as long as they all drive
/// the same [`ViewStore`].
#[derive(Debug, Default)]
pub struct ReusePool {
    queues: BTreeMap<String, Vec<ViewId>>,
    managed: BTreeMap<ViewId, String>,
}

impl ReusePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a retired view pooled under `key`, or one made by `factory`.
    ///
    /// Views made by `factory` become managed by this pool under `key`.
    /// Queued views that were destroyed in the meantime are skipped, and a
    /// queued view that was attached somewhere since it was retired is
    /// detached before it is handed out.
    pub fn dequeue(
        &mut self,
        views: &mut ViewStore,
        key: &str,
        factory: impl FnOnce(&mut ViewStore) -> ViewId,
    ) -> ViewId {
        if let Some(queue) = self.queues.get_mut(key) {
            while let Some(view) = queue.pop() {
                if views.is_alive(view) {
                    views.remove_from_parent(view);
                    return view;
                }
                self.managed.remove(&view);
            }
        }
        let view = factory(views);
        self.managed.insert(view, key.to_string());
        view
    }

    /// Retires `view`, detaching it from its parent.
    ///
    /// Views this pool does not manage are destroyed along with their
    /// subtree. Retiring a view that is already queued does nothing.
    pub fn enqueue(&mut self, views: &mut ViewStore, view: ViewId) {
        let Some(key) = self.managed.get(&view) else {
            if views.is_alive(view) {
                destroy_subtree(views, view);
            }
            return;
        };
        if views.is_alive(view) {
            views.remove_from_parent(view);
        }
        let queue = self.queues.entry(key.clone()).or_default();
        if !queue.contains(&view) {
            queue.push(view);
        }
    }

    /// Returns whether `view` was made through this pool.
    #[must_use]
    pub fn manages(&self, view: ViewId) -> bool {
        self.managed.contains_key(&view)
    }

    /// Returns the number of views queued under `key`.
    #[must_use]
    pub fn queued(&self, key: &str) -> usize {
        self.queues.get(key).map_or(0, Vec::len)
    }

    /// Destroys every queued view, including its subtree.
    pub fn purge(&mut self, views: &mut ViewStore) {
        for (_, queue) in core::mem::take(&mut self.queues) {
            for view in queue {
                self.managed.remove(&view);
                if views.is_alive(view) {
                    destroy_subtree(views, view);
                }
            }
        }
    }
}

fn destroy_subtree(views: &mut ViewStore, view: ViewId) {
    let children: Vec<ViewId> = views.children(view).collect();
    for child in children {
        destroy_subtree(views, child);
    }
    views.remove_from_parent(view);
    views.destroy_view(view);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequeue_falls_back_to_factory() {
        let mut views = ViewStore::new();
        let mut pool = ReusePool::new();
        let v = pool.dequeue(&mut views, "cell", ViewStore::create_view);
        assert!(pool.manages(v));
        assert_eq!(pool.queued("cell"), 0);
    }

    #[test]
    fn queues_are_lifo_per_key() {
        let mut views = ViewStore::new();
        let mut pool = ReusePool::new();
        let a = pool.dequeue(&mut views, "cell", ViewStore::create_view);
        let b = pool.dequeue(&mut views, "cell", ViewStore::create_view);
        let other = pool.dequeue(&mut views, "header", ViewStore::create_view);
        pool.enqueue(&mut views, a);
        pool.enqueue(&mut views, b);
        pool.enqueue(&mut views, other);

        assert_eq!(pool.dequeue(&mut views, "cell", ViewStore::create_view), b);
        assert_eq!(pool.dequeue(&mut views, "cell", ViewStore::create_view), a);
        assert_eq!(pool.queued("header"), 1);
    }

    #[test]
    fn enqueue_detaches() {
        let mut views = ViewStore::new();
        let mut pool = ReusePool::new();
        let host = views.create_view();
        let v = pool.dequeue(&mut views, "cell", ViewStore::create_view);
        views.add_child(host, v);

        pool.enqueue(&mut views, v);
        assert_eq!(views.parent(v), None);
        assert_eq!(views.children(host).count(), 0);
    }

    #[test]
    fn unmanaged_views_are_destroyed() {
        let mut views = ViewStore::new();
        let mut pool = ReusePool::new();
        let host = views.create_view();
        let v = views.create_view();
        let child = views.create_view();
        views.add_child(host, v);
        views.add_child(v, child);

        pool.enqueue(&mut views, v);
        assert!(!views.is_alive(v));
        assert!(!views.is_alive(child));
        assert_eq!(views.children(host).count(), 0);
        assert_eq!(views.roots(), [host]);
        assert!(!pool.manages(v));

        // Retiring a stale handle is harmless.
        pool.enqueue(&mut views, v);
    }

    #[test]
    fn dequeue_detaches_reattached_views() {
        let mut views = ViewStore::new();
        let mut pool = ReusePool::new();
        let other = views.create_view();
        let v = pool.dequeue(&mut views, "cell", ViewStore::create_view);
        pool.enqueue(&mut views, v);
        views.add_child(other, v);

        let got = pool.dequeue(&mut views, "cell", ViewStore::create_view);
        assert_eq!(got, v);
        assert_eq!(views.parent(got), None);
        assert_eq!(views.children(other).count(), 0);
    }

    #[test]
    fn double_enqueue_is_ignored() {
        let mut views = ViewStore::new();
        let mut pool = ReusePool::new();
        let v = pool.dequeue(&mut views, "cell", ViewStore::create_view);
        pool.enqueue(&mut views, v);
        pool.enqueue(&mut views, v);
        assert_eq!(pool.queued("cell"), 1);
    }

    #[test]
    fn destroyed_views_are_skipped() {
        let mut views = ViewStore::new();
        let mut pool = ReusePool::new();
        let v = pool.dequeue(&mut views, "cell", ViewStore::create_view);
        pool.enqueue(&mut views, v);
        views.destroy_view(v);

        let fresh = pool.dequeue(&mut views, "cell", ViewStore::create_view);
        assert_ne!(fresh, v);
        assert!(views.is_alive(fresh));
        assert!(!pool.manages(v));
    }

    #[test]
    fn purge_destroys_queued_views() {
        let mut views = ViewStore::new();
        let mut pool = ReusePool::new();
        let v = pool.dequeue(&mut views, "cell", ViewStore::create_view);
        let child = views.create_view();
        views.add_child(v, child);
        pool.enqueue(&mut views, v);

        pool.purge(&mut views);
        assert!(!views.is_alive(v));
        assert!(!views.is_alive(child));
        assert_eq!(pool.queued("cell"), 0);
    }
}
