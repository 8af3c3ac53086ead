// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON-lines exporter.
//!
//! [`export`] writes one JSON object per recorded event, in recording order.
//! Every object carries an `"event"` tag; the remaining fields mirror the
//! event struct.

use std::io::{self, Write};

use kurbo::{Rect, Size};
use serde_json::{Value, json};

use crate::pretty::{op_name, reason_name};
use crate::recorder::RecordedEvent;

/// Writes `events` to `writer` as JSON lines.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    for event in events {
        serde_json::to_writer(&mut *writer, &to_json(event))?;
        writeln!(writer)?;
    }
    writer.flush()
}

/// Converts one recorded event to a JSON value.
#[must_use]
pub fn to_json(event: &RecordedEvent) -> Value {
    match event {
        RecordedEvent::Reload(e) => json!({
            "event": "reload",
            "reload_count": e.reload_count,
            "constraint_max": size(e.constraint_max),
            "content_size": size(e.content_size),
            "offset_change": [e.offset_change.x, e.offset_change.y],
        }),
        RecordedEvent::LoadCells(e) => json!({
            "event": "load_cells",
            "visible_rect": rect(e.visible_rect),
            "visible": e.visible,
            "inserted": e.inserted,
            "deleted": e.deleted,
            "carried": e.carried,
            "reloading": e.reloading,
        }),
        RecordedEvent::Skip(e) => json!({
            "event": "skip",
            "op": op_name(e.op),
            "reason": reason_name(e.reason),
        }),
        RecordedEvent::ContentSize(e) => json!({
            "event": "content_size",
            "old": size(e.old),
            "new": size(e.new),
        }),
    }
}

// Non-finite extents (unbounded constraints) serialize as null.
fn size(s: Size) -> Value {
    json!({ "width": s.width, "height": s.height })
}

fn rect(r: Rect) -> Value {
    json!({ "x": r.x0, "y": r.y0, "width": r.width(), "height": r.height() })
}
