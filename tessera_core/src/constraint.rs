// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Size bounds passed down through a layout pass.

use kurbo::{Insets, Size};

use crate::geometry::Transpose;

/// Minimum and maximum size a provider may occupy.
///
/// An axis whose maximum is `f64::INFINITY` is unbounded; scrolling
/// containers typically lay out with an unbounded main axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constraint {
    /// Smallest size the provider should report.
    pub min: Size,
    /// Largest size the provider may report.
    pub max: Size,
}

impl Default for Constraint {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Constraint {
    /// Creates a constraint bounded above by `max` with no minimum.
    #[inline]
    #[must_use]
    pub const fn new(max: Size) -> Self {
        Self {
            min: Size::ZERO,
            max,
        }
    }

    /// Creates a constraint that allows exactly `size`.
    #[inline]
    #[must_use]
    pub const fn tight(size: Size) -> Self {
        Self {
            min: size,
            max: size,
        }
    }

    /// Creates a constraint with no upper bound on either axis.
    #[inline]
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(Size::new(f64::INFINITY, f64::INFINITY))
    }

    /// Returns a copy with the maximum width replaced.
    #[inline]
    #[must_use]
    pub const fn with_max_width(mut self, width: f64) -> Self {
        self.max.width = width;
        self
    }

    /// Returns a copy with the maximum height replaced.
    #[inline]
    #[must_use]
    pub const fn with_max_height(mut self, height: f64) -> Self {
        self.max.height = height;
        self
    }

    /// Returns whether the maximum width is finite.
    #[inline]
    #[must_use]
    pub fn has_bounded_width(&self) -> bool {
        self.max.width.is_finite()
    }

    /// Returns whether the maximum height is finite.
    #[inline]
    #[must_use]
    pub fn has_bounded_height(&self) -> bool {
        self.max.height.is_finite()
    }

    /// Clamps `size` into `[min, max]` on each axis.
    #[must_use]
    pub fn clamp(&self, size: Size) -> Size {
        Size::new(
            size.width.max(self.min.width).min(self.max.width),
            size.height.max(self.min.height).min(self.max.height),
        )
    }

    /// Shrinks both bounds by `insets`, never going below zero.
    #[must_use]
    pub fn inset(&self, insets: Insets) -> Self {
        let dx = insets.x0 + insets.x1;
        let dy = insets.y0 + insets.y1;
        let shrink = |s: Size| Size::new((s.width - dx).max(0.0), (s.height - dy).max(0.0));
        Self {
            min: shrink(self.min),
            max: shrink(self.max),
        }
    }
}

impl Transpose for Constraint {
    #[inline]
    fn transposed(self) -> Self {
        Self {
            min: self.min.transposed(),
            max: self.max.transposed(),
        }
    }
}
