// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the reconciliation engine.
//!
//! This module provides a [`TraceSink`] trait with one method per engine
//! event. All method bodies default to no-ops, so implementing only the events
//! you care about is fine.
//!
//! [`Tracer`] owns an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing and the sink is dropped
//! on installation. When **on**, each method performs a single `Option`
//! branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use alloc::boxed::Box;

use kurbo::{Rect, Size, Vec2};

/// Which engine entry point an event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineOp {
    /// Full relayout followed by reconciliation.
    Reload,
    /// Visible-set reconciliation against the current renderer.
    LoadCells,
    /// Relayout without refreshing content of carried-over views.
    InvalidateLayout,
}

/// Why an engine entry point returned without doing any work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// No component is attached.
    NoComponent,
    /// The same pass is already running further up the stack.
    Reentrant,
    /// The operation needs a completed reload first.
    NotLoaded,
}

/// Emitted after a reload finished laying out the component.
#[derive(Clone, Copy, Debug)]
pub struct ReloadEvent {
    /// Number of reloads run so far, including this one.
    pub reload_count: u64,
    /// Constraint maximum the component was laid out under.
    pub constraint_max: Size,
    /// Content size after zoom.
    pub content_size: Size,
    /// Scroll offset change recorded for shift hooks.
    pub offset_change: Vec2,
}

/// Emitted after a visible-set reconciliation.
#[derive(Clone, Copy, Debug)]
pub struct LoadCellsEvent {
    /// Visible rectangle in content coordinates.
    pub visible_rect: Rect,
    /// Number of visible items after the pass.
    pub visible: usize,
    /// Views created or dequeued for new keys.
    pub inserted: usize,
    /// Views retired because their keys disappeared.
    pub deleted: usize,
    /// Views carried over from the previous pass.
    pub carried: usize,
    /// Whether the pass ran as part of a reload.
    pub reloading: bool,
}

/// Emitted when an entry point is skipped.
#[derive(Clone, Copy, Debug)]
pub struct SkipEvent {
    /// The skipped entry point.
    pub op: EngineOp,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Emitted when the content size written to the host changes.
#[derive(Clone, Copy, Debug)]
pub struct ContentSizeEvent {
    /// Previous content size.
    pub old: Size,
    /// New content size.
    pub new: Size,
}

/// Receiver for engine events.
pub trait TraceSink {
    /// Called after a reload laid out the component.
    fn on_reload(&mut self, e: &ReloadEvent) {
        _ = e;
    }

    /// Called after a visible-set reconciliation.
    fn on_load_cells(&mut self, e: &LoadCellsEvent) {
        _ = e;
    }

    /// Called when an entry point is skipped.
    fn on_skip(&mut self, e: &SkipEvent) {
        _ = e;
    }

    /// Called when the content size changes.
    fn on_content_size(&mut self, e: &ContentSizeEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Owning wrapper around an optional [`TraceSink`].
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Emits a [`ReloadEvent`].
    #[inline]
    pub fn reload(&mut self, e: &ReloadEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_reload(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`LoadCellsEvent`].
    #[inline]
    pub fn load_cells(&mut self, e: &LoadCellsEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_load_cells(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SkipEvent`].
    #[inline]
    pub fn skip(&mut self, op: EngineOp, reason: SkipReason) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_skip(&SkipEvent { op, reason });
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (op, reason);
        }
    }

    /// Emits a [`ContentSizeEvent`].
    #[inline]
    pub fn content_size(&mut self, old: Size, new: Size) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_content_size(&ContentSizeEvent { old, new });
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (old, new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_skip(&SkipEvent {
            op: EngineOp::Reload,
            reason: SkipReason::NoComponent,
        });
        sink.on_content_size(&ContentSizeEvent {
            old: Size::ZERO,
            new: Size::new(1.0, 1.0),
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.skip(EngineOp::LoadCells, SkipReason::Reentrant);
        tracer.content_size(Size::ZERO, Size::ZERO);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::rc::Rc;
        use alloc::vec::Vec;
        use core::cell::RefCell;

        struct RecordingSink {
            skips: Rc<RefCell<Vec<EngineOp>>>,
        }
        impl TraceSink for RecordingSink {
            fn on_skip(&mut self, e: &SkipEvent) {
                self.skips.borrow_mut().push(e.op);
            }
        }

        let skips = Rc::new(RefCell::new(Vec::new()));
        let mut tracer = Tracer::new(Box::new(RecordingSink {
            skips: Rc::clone(&skips),
        }));
        tracer.skip(EngineOp::InvalidateLayout, SkipReason::NotLoaded);
        assert_eq!(*skips.borrow(), &[EngineOp::InvalidateLayout]);
    }
}
