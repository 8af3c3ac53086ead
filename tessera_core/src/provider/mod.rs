// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout and visibility protocol.
//!
//! A [`Provider`] describes a piece of UI. Laying it out under a
//! [`Constraint`] produces a [`Renderer`]: an immutable snapshot of sizes and
//! frames for that pass. The renderer answers visibility queries without
//! running layout again: [`Renderer::views`] returns one [`ViewData`] for
//! every leaf whose frame intersects a rectangle. A single layout pass serves
//! every scroll position until something invalidates it.
//!
//! ```text
//!   Provider::layout(constraint) ──► Rc<dyn Renderer>
//!                                         │
//!          scroll / resize ──► Renderer::views(visible_rect) ──► Vec<ViewData>
//! ```
//!
//! Frames compose additively: a container queries each intersecting child
//! with the rectangle translated into the child's space and shifts the
//! results back by the child's origin.
//!
//! Leaves hand a [`ViewProvider`] to the engine. It knows how to make (or
//! dequeue) a live view and how to configure it.

mod adapter;
mod layout;
mod space;

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect, Size, Vec2};

use crate::animator::Animator;
use crate::constraint::Constraint;
use crate::geometry::intersects;
use crate::reuse::ReusePool;
use crate::view::{ViewId, ViewStore};

pub use adapter::{Sizing, ViewAdapter};
pub use layout::{ChildMeasure, Container, Custom, Flow, LayoutStrategy, Stack};
pub use space::Space;

/// A composable layout node.
pub trait Provider {
    /// Lays out this node under `constraint` and returns the pass result.
    ///
    /// Must be deterministic for a fixed constraint and internal state.
    fn layout(&self, constraint: Constraint) -> Rc<dyn Renderer>;
}

/// The result of one layout pass.
///
/// Renderers are immutable snapshots. The one sanctioned exception is size
/// bookkeeping: a renderer may recompute [`size`](Self::size) as a side
/// effect of [`views`](Self::views) (for example, content that extends as it
/// is scrolled). Callers that depend on the size must re-read it after every
/// visibility query.
pub trait Renderer {
    /// Returns the size this pass occupies.
    fn size(&self) -> Size;

    /// Returns every visible leaf whose frame intersects `rect`.
    ///
    /// `rect` and the returned frames are in this renderer's own coordinate
    /// space. A rectangle that intersects nothing yields an empty `Vec`.
    fn views(&self, rect: Rect) -> Vec<ViewData>;
}

/// The live-view contract of a leaf.
pub trait ViewProvider {
    /// Returns the identifier under which this provider's views are pooled.
    fn reuse_key(&self) -> Option<&str> {
        None
    }

    /// Produces a view for this leaf, dequeuing a retired one when possible.
    fn make_view(&self, views: &mut ViewStore, pool: &mut ReusePool) -> ViewId;

    /// Configures `view` for this leaf.
    ///
    /// Views that do not match this provider's view type are skipped
    /// silently.
    fn update_view(&self, views: &mut ViewStore, view: ViewId);
}

/// One visible leaf resolved by a visibility query.
#[derive(Clone)]
pub struct ViewData {
    /// Declared identity key. Not necessarily unique within one query.
    pub key: String,
    /// Frame in the coordinate space of the query rectangle.
    pub frame: Rect,
    /// Makes and configures the live view.
    pub provider: Rc<dyn ViewProvider>,
    /// Per-item animator, taking priority over the engine's animator.
    pub animator: Option<Rc<dyn Animator>>,
}

impl fmt::Debug for ViewData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewData")
            .field("key", &self.key)
            .field("frame", &self.frame)
            .field("reuse_key", &self.provider.reuse_key())
            .field("has_animator", &self.animator.is_some())
            .finish()
    }
}

impl ViewData {
    /// Creates view data with no animator override.
    #[must_use]
    pub fn new(key: impl Into<String>, frame: Rect, provider: Rc<dyn ViewProvider>) -> Self {
        Self {
            key: key.into(),
            frame,
            provider,
            animator: None,
        }
    }

    /// Sets the per-item animator.
    #[must_use]
    pub fn with_animator(mut self, animator: Option<Rc<dyn Animator>>) -> Self {
        self.animator = animator;
        self
    }

    /// Returns a copy with the frame shifted by `offset`.
    #[must_use]
    pub fn offset(mut self, offset: Vec2) -> Self {
        self.frame = self.frame + offset;
        self
    }
}

/// The renderer of a single leaf: one frame at the origin.
#[derive(Clone)]
pub(crate) struct LeafRenderer {
    pub(crate) key: String,
    pub(crate) size: Size,
    pub(crate) provider: Rc<dyn ViewProvider>,
    pub(crate) animator: Option<Rc<dyn Animator>>,
}

impl Renderer for LeafRenderer {
    fn size(&self) -> Size {
        self.size
    }

    fn views(&self, rect: Rect) -> Vec<ViewData> {
        let frame = Rect::from_origin_size(Point::ZERO, self.size);
        if !intersects(rect, frame) {
            return Vec::new();
        }
        alloc::vec![
            ViewData::new(self.key.clone(), frame, Rc::clone(&self.provider))
                .with_animator(self.animator.clone())
        ]
    }
}
