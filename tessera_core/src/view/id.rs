// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View identity.

use core::fmt;

/// Sentinel value indicating "no view" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a view in a [`ViewStore`](super::ViewStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a view is destroyed and its slot reused. Handles are
/// ordered by slot, then generation, so they can key ordered side tables.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl ViewId {
    /// Returns the raw slot index (for diagnostics and `ViewChanges` lookups).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewId({}@gen{})", self.idx, self.generation)
    }
}
