// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative view composition over a retained view tree.
//!
//! `tessera_core` turns a description of UI (a [`Provider`](provider::Provider)
//! tree) into a minimal set of live views. It is `no_std` compatible (with
//! `alloc`) and keeps the live views in a struct-of-arrays store with
//! generational handles.
//!
//! # Architecture
//!
//! Every host layout pass runs through the engine, and a backend mirrors the
//! resulting store changes into a native tree:
//!
//! ```text
//!   Provider::layout(constraint) ──► Renderer
//!                                       │
//!                 ┌─────────────────────┘
//!                 ▼
//!   Engine::layout_subviews() ──► Renderer::views(visible rect) ──► Vec<ViewData>
//!        │
//!        ├─ diff by effective key ──► Animator hooks (insert/update/delete/shift)
//!        ├─ retire / dequeue ──────► ReusePool
//!        ▼
//!   ViewStore::evaluate() ──► ViewChanges ──► Presenter::apply()
//! ```
//!
//! **[`provider`]** — The layout and visibility protocol, typed leaf views,
//! spacers, and containers with pluggable layout strategies.
//!
//! **[`engine`]** — The reconciliation engine: reload, relayout and
//! visible-set diffing with re-entrancy guards.
//!
//! **[`animator`]** — Hooks the engine calls at every reconciliation point.
//!
//! **[`reuse`]** — Keyed LIFO pool of retired views.
//!
//! **[`view`]** — Struct-of-arrays view tree with generational handles,
//! scroll metrics, typed content and declarative property modifiers.
//!
//! **[`dirty`]** — Multi-channel dirty tracking via `understory_dirty`.
//!
//! **[`backend`]** — The [`Presenter`](backend::Presenter) trait that
//! platform backends implement.
//!
//! **[`constraint`]** and **[`geometry`]** — Size bounds and axis
//! transposition on top of `kurbo`.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and engine events,
//! with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animator;
pub mod backend;
pub mod constraint;
pub mod dirty;
pub mod engine;
pub mod geometry;
pub mod provider;
pub mod reuse;
pub mod trace;
pub mod view;
