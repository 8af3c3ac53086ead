// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hooks invoked by the engine at reconciliation points.
//!
//! Every hook receives a [`HostCx`] that grants mutable access to the engine
//! that is running, the view store, and the reuse pool. Engine entry points
//! called through it while a pass is in progress are dropped by the engine's
//! re-entrancy guards.
//!
//! While a reconciliation runs, the engine's visible-set accessors
//! ([`Engine::visible_views`], [`Engine::view_for_key`] and friends) still
//! report the previous pass. The new set replaces it after the last hook.

use core::fmt;

use kurbo::{Rect, Vec2};

use crate::engine::Engine;
use crate::reuse::ReusePool;
use crate::view::{ViewId, ViewStore};

/// Context handed to every [`Animator`] hook.
pub struct HostCx<'a> {
    /// The engine running the pass.
    pub engine: &'a mut Engine,
    /// The view store.
    pub views: &'a mut ViewStore,
    /// The reuse pool.
    pub pool: &'a mut ReusePool,
}

impl fmt::Debug for HostCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCx")
            .field("host", &self.engine.host())
            .finish_non_exhaustive()
    }
}

impl HostCx<'_> {
    /// Returns the view hosting the engine.
    #[must_use]
    pub fn host(&self) -> ViewId {
        self.engine.host()
    }
}

/// Strategy object driving view geometry during reconciliation.
///
/// The provided `update` assigns the final frame directly. Every other hook
/// does nothing by default.
pub trait Animator {
    /// Called once per pass before the visible set is queried.
    fn will_update(&self, cx: &mut HostCx<'_>) {
        _ = cx;
    }

    /// Called for a view that just became visible, after its geometry was
    /// set to `frame`.
    fn insert(&self, cx: &mut HostCx<'_>, view: ViewId, frame: Rect) {
        _ = (cx, view, frame);
    }

    /// Called for every visible view with its final frame.
    fn update(&self, cx: &mut HostCx<'_>, view: ViewId, frame: Rect) {
        cx.views.set_size(view, frame.size());
        cx.views.set_center(view, frame.center());
    }

    /// Called for a view whose key disappeared, before it is returned to the
    /// reuse pool. `frame` is its last frame.
    fn delete(&self, cx: &mut HostCx<'_>, view: ViewId, frame: Rect) {
        _ = (cx, view, frame);
    }

    /// Called during a reload for a view that stayed visible, with the scroll
    /// offset change the reload applied.
    fn shift(&self, cx: &mut HostCx<'_>, delta: Vec2, view: ViewId, frame: Rect) {
        _ = (cx, delta, view, frame);
    }
}

/// The engine-wide animator used when nothing else is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultAnimator;

impl Animator for DefaultAnimator {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_update_assigns_frame() {
        let mut views = ViewStore::new();
        let mut pool = ReusePool::new();
        let host = views.create_view();
        let view = views.create_view();
        let mut engine = Engine::new(host);
        let mut cx = HostCx {
            engine: &mut engine,
            views: &mut views,
            pool: &mut pool,
        };
        assert_eq!(cx.host(), host);

        let frame = Rect::new(10.0, 20.0, 50.0, 40.0);
        DefaultAnimator.insert(&mut cx, view, Rect::ZERO);
        DefaultAnimator.update(&mut cx, view, frame);
        assert_eq!(views.frame(view), frame);
    }
}
