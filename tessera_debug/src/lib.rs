// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for tessera diagnostics.
//!
//! This crate provides [`TraceSink`](tessera_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] — in-memory recording behind a shared handle,
//!   so the recording stays readable after the sink is handed to an engine.
//! - [`json::export`] — writes recorded events as JSON lines.

pub mod json;
pub mod pretty;
pub mod recorder;
