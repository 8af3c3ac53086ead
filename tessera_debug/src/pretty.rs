// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use kurbo::{Rect, Size};
use tessera_core::trace::{
    ContentSizeEvent, EngineOp, LoadCellsEvent, ReloadEvent, SkipEvent, SkipReason, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

pub(crate) fn op_name(op: EngineOp) -> &'static str {
    match op {
        EngineOp::Reload => "reload",
        EngineOp::LoadCells => "load_cells",
        EngineOp::InvalidateLayout => "invalidate_layout",
    }
}

pub(crate) fn reason_name(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::NoComponent => "no component",
        SkipReason::Reentrant => "re-entrant",
        SkipReason::NotLoaded => "not loaded",
    }
}

struct ShowSize(Size);

impl std::fmt::Display for ShowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.width.is_finite() && self.0.height.is_finite() {
            write!(f, "{:.0}x{:.0}", self.0.width, self.0.height)
        } else {
            write!(f, "{}x{}", self.0.width, self.0.height)
        }
    }
}

struct ShowRect(Rect);

impl std::fmt::Display for ShowRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.0},{:.0} {})",
            self.0.x0,
            self.0.y0,
            ShowSize(self.0.size())
        )
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_reload(&mut self, e: &ReloadEvent) {
        let _ = writeln!(
            self.writer,
            "[reload] #{} max={} content={} offset_change=({:.0},{:.0})",
            e.reload_count,
            ShowSize(e.constraint_max),
            ShowSize(e.content_size),
            e.offset_change.x,
            e.offset_change.y,
        );
    }

    fn on_load_cells(&mut self, e: &LoadCellsEvent) {
        let _ = writeln!(
            self.writer,
            "[load] rect={} visible={} +{} -{} ={}{}",
            ShowRect(e.visible_rect),
            e.visible,
            e.inserted,
            e.deleted,
            e.carried,
            if e.reloading { " (reload)" } else { "" },
        );
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        let _ = writeln!(
            self.writer,
            "[skip] {}: {}",
            op_name(e.op),
            reason_name(e.reason),
        );
    }

    fn on_content_size(&mut self, e: &ContentSizeEvent) {
        let _ = writeln!(
            self.writer,
            "[content] {} -> {}",
            ShowSize(e.old),
            ShowSize(e.new),
        );
    }
}
