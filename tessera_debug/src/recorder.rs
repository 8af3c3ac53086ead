// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! An engine owns its sink, so [`RecorderSink`] is a cheap clonable handle to
//! a shared buffer: install one clone with
//! [`Engine::set_trace_sink`](tessera_core::engine::Engine::set_trace_sink)
//! and read the events through another.

use std::cell::RefCell;
use std::rc::Rc;

use tessera_core::trace::{ContentSizeEvent, LoadCellsEvent, ReloadEvent, SkipEvent, TraceSink};

/// One recorded engine event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// See [`TraceSink::on_reload`].
    Reload(ReloadEvent),
    /// See [`TraceSink::on_load_cells`].
    LoadCells(LoadCellsEvent),
    /// See [`TraceSink::on_skip`].
    Skip(SkipEvent),
    /// See [`TraceSink::on_content_size`].
    ContentSize(ContentSizeEvent),
}

/// A [`TraceSink`] that appends events to a shared buffer.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    events: Rc<RefCell<Vec<RecordedEvent>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.borrow().clone()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Returns whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Removes and returns all recorded events.
    pub fn drain(&self) -> Vec<RecordedEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    fn push(&self, event: RecordedEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl TraceSink for RecorderSink {
    fn on_reload(&mut self, e: &ReloadEvent) {
        self.push(RecordedEvent::Reload(*e));
    }

    fn on_load_cells(&mut self, e: &LoadCellsEvent) {
        self.push(RecordedEvent::LoadCells(*e));
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        self.push(RecordedEvent::Skip(*e));
    }

    fn on_content_size(&mut self, e: &ContentSizeEvent) {
        self.push(RecordedEvent::ContentSize(*e));
    }
}
