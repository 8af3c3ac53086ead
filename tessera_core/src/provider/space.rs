// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-size gaps between views.

use alloc::rc::Rc;
use alloc::vec::Vec;

use kurbo::{Rect, Size};

use super::{Provider, Renderer, ViewData};
use crate::constraint::Constraint;

/// A leaf that occupies space but never produces a view.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Space {
    /// Requested size, clamped by the constraint.
    pub size: Size,
}

impl Space {
    /// Creates a spacer of the given size.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self { size }
    }
}

#[derive(Debug)]
struct SpaceRenderer(Size);

impl Renderer for SpaceRenderer {
    fn size(&self) -> Size {
        self.0
    }

    fn views(&self, _rect: Rect) -> Vec<ViewData> {
        Vec::new()
    }
}

impl Provider for Space {
    fn layout(&self, constraint: Constraint) -> Rc<dyn Renderer> {
        Rc::new(SpaceRenderer(constraint.clamp(self.size)))
    }
}
