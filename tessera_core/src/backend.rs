// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! The engine and providers only ever mutate the [`ViewStore`]. A backend
//! mirrors that store into a platform-native tree (widgets, DOM elements,
//! compositor layers) by implementing [`Presenter`] and consuming the
//! incremental [`ViewChanges`] produced by [`ViewStore::evaluate`].
//!
//! Scroll-metric changes reported in [`ViewChanges::scroll`] are how the
//! engine's content-size updates reach whatever hosts the scrollable area.
//! Layout requests reported in [`ViewChanges::layout_requests`] tell the host
//! to call [`Engine::layout_subviews`](crate::engine::Engine::layout_subviews)
//! on its next pass.

use crate::view::{ViewChanges, ViewStore};

/// Applies evaluated view changes to a platform-native presentation tree.
///
/// # Layout loop pseudocode
///
/// ```rust,ignore
/// fn on_layout_pass() {
///     // Host geometry (scrolling, resizing) is written to the store.
///     views.set_bounds_origin(host, scroll_offset);
///
///     // Reconcile the visible set.
///     engine.layout_subviews(&mut views, &mut pool);
///
///     // Present: apply incremental changes to the native tree.
///     let changes = views.evaluate();
///     presenter.apply(&views, &changes);
/// }
/// ```
pub trait Presenter {
    /// Applies `changes` to the backing tree, reading current values from
    /// `views` as needed.
    fn apply(&mut self, views: &ViewStore, changes: &ViewChanges);
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;

    use kurbo::{Rect, Size};

    use super::*;

    #[derive(Default)]
    struct MirrorPresenter {
        frames: BTreeMap<u32, Rect>,
        content_sizes: BTreeMap<u32, Size>,
    }

    impl Presenter for MirrorPresenter {
        fn apply(&mut self, views: &ViewStore, changes: &ViewChanges) {
            for &idx in &changes.removed {
                self.frames.remove(&idx);
                self.content_sizes.remove(&idx);
            }
            for &idx in &changes.geometry {
                self.frames.insert(idx, views.world_frame_at(idx));
            }
            for &idx in &changes.scroll {
                self.content_sizes
                    .insert(idx, views.scroll_metrics_at(idx).content_size);
            }
        }
    }

    #[test]
    fn presenter_mirrors_incremental_changes() {
        let mut views = ViewStore::new();
        let mut presenter = MirrorPresenter::default();
        let host = views.create_view();
        views.set_frame(host, Rect::new(0.0, 0.0, 320.0, 480.0));
        let changes = views.evaluate();
        presenter.apply(&views, &changes);
        assert_eq!(presenter.frames[&host.index()], Rect::new(0.0, 0.0, 320.0, 480.0));

        views.set_content_size(host, Size::new(320.0, 2000.0));
        let changes = views.evaluate();
        assert!(changes.geometry.is_empty());
        presenter.apply(&views, &changes);
        assert_eq!(presenter.content_sizes[&host.index()], Size::new(320.0, 2000.0));

        views.destroy_view(host);
        let changes = views.evaluate();
        presenter.apply(&views, &changes);
        assert!(presenter.frames.is_empty());
    }
}
