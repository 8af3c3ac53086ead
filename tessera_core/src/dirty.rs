// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants for the view store.
//!
//! The [`ViewStore`](crate::view::ViewStore) uses multi-channel dirty tracking
//! (via [`understory_dirty`]) so that a [`Presenter`](crate::backend::Presenter)
//! only touches native views that actually changed.
//!
//! # Propagation semantics
//!
//! - **Propagating** — [`GEOMETRY`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and has dependency edges
//!   from child to parent. World frames, effective opacity, and effective
//!   hidden state are inherited, so marking a parent marks its subtree.
//!
//! - **Local-only** — [`APPEARANCE`], [`CONTENT`], [`SCROLL`], and [`LAYOUT`]
//!   only report the view that was explicitly marked.
//!
//! - **Structural** — [`TOPOLOGY`] is marked on add/remove/reorder and on
//!   create/destroy. It triggers a traversal-order rebuild during evaluation.

use understory_dirty::Channel;

/// Bounds, center, scale, opacity, or hidden flag changed. Propagates to
/// descendants.
pub const GEOMETRY: Channel = Channel::new(0);

/// A property-modifier backed appearance value changed.
pub const APPEARANCE: Channel = Channel::new(1);

/// Typed view content was replaced or mutated.
pub const CONTENT: Channel = Channel::new(2);

/// Scroll metrics (content size, inset, zoom scale) changed.
pub const SCROLL: Channel = Channel::new(3);

/// The view asked its host to run a layout pass.
pub const LAYOUT: Channel = Channel::new(4);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(5);
