// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained view tree.
//!
//! A *view* is a node in the tree that the [`Engine`](crate::engine::Engine)
//! populates with visible cells. Each view has:
//!
//! - An identity ([`ViewId`]) — a generational handle that becomes stale when
//!   the view is destroyed.
//! - Topology — parent, first-child, and sibling links forming an ordered
//!   tree. Child order is z-order, back to front.
//! - **Local properties** set by callers: bounds, center, scale, opacity,
//!   [`flags`](ViewStore::set_flags), [`appearance`](property), scroll
//!   metrics, and typed content.
//! - **Computed properties** produced by [`evaluate`](ViewStore::evaluate):
//!   world frame, effective opacity, and effective hidden state.
//!
//! Views are stored in struct-of-arrays layout with index-based handles.
//! Platform backends mirror the tree into native views by consuming
//! [`ViewChanges`] through a [`Presenter`](crate::backend::Presenter).

mod evaluate;
mod id;
pub mod property;
mod store;

pub use evaluate::ViewChanges;
pub use id::{INVALID, ViewId};
pub use store::{Children, ScrollMetrics, ViewFlags, ViewStore};
