// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry helpers on top of `kurbo`.
//!
//! Containers can lay out their children along a swapped axis. Rather than
//! writing every strategy twice, the container runs the strategy in a
//! *transposed* coordinate space and maps the results back with
//! [`Transpose`]. Transposing twice is always the identity.

use kurbo::{Point, Rect, Size, Vec2};

/// Swaps the x and y components of a geometric value.
pub trait Transpose {
    /// Returns `self` with x and y (or width and height) swapped.
    #[must_use]
    fn transposed(self) -> Self;
}

impl Transpose for Size {
    #[inline]
    fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }
}

impl Transpose for Point {
    #[inline]
    fn transposed(self) -> Self {
        Self::new(self.y, self.x)
    }
}

impl Transpose for Vec2 {
    #[inline]
    fn transposed(self) -> Self {
        Self::new(self.y, self.x)
    }
}

impl Transpose for Rect {
    #[inline]
    fn transposed(self) -> Self {
        Self::new(self.y0, self.x0, self.y1, self.x1)
    }
}

/// Returns whether two rectangles overlap with a non-empty area.
///
/// Rectangles that only share an edge do not intersect. Both rectangles are
/// expected to be in the same coordinate space with `x0 <= x1` and
/// `y0 <= y1`.
#[inline]
#[must_use]
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Returns the smallest rectangle anchored at the origin that contains every
/// rectangle in `frames`.
///
/// An empty slice yields [`Size::ZERO`].
#[must_use]
pub fn union_size(frames: &[Rect]) -> Size {
    frames.iter().fold(Rect::ZERO, |acc, r| acc.union(*r)).size()
}
