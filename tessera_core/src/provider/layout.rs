// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Containers that position children with a pluggable strategy.
//!
//! A [`Container`] owns its children and a [`LayoutStrategy`]. Strategies are
//! written for a vertical main axis. Setting [`Container::transposed`] swaps
//! the axes of the incoming constraint, of every child measurement, and of
//! the resulting frames, so one strategy serves both orientations.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect, Size};

use super::{Provider, Renderer, ViewData};
use crate::constraint::Constraint;
use crate::geometry::{Transpose, intersects, union_size};

/// Computes child frames for a [`Container`].
pub trait LayoutStrategy {
    /// Returns one frame per child, in child order.
    ///
    /// `max` is the available size. Children are measured on demand through
    /// `children`; frames for children that are never measured still size
    /// them when the container is rendered.
    fn compute_frames(&self, children: &mut ChildMeasure<'_>, max: Size) -> Vec<Rect>;
}

/// On-demand measurement of a container's children.
///
/// Measuring a child lays it out and keeps the resulting renderer for the
/// container's visibility queries.
pub struct ChildMeasure<'a> {
    children: &'a [Rc<dyn Provider>],
    transposed: bool,
    renderers: Vec<Option<Rc<dyn Renderer>>>,
}

impl fmt::Debug for ChildMeasure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildMeasure")
            .field("len", &self.children.len())
            .field("transposed", &self.transposed)
            .finish_non_exhaustive()
    }
}

impl<'a> ChildMeasure<'a> {
    fn new(children: &'a [Rc<dyn Provider>], transposed: bool) -> Self {
        Self {
            children,
            transposed,
            renderers: alloc::vec![None; children.len()],
        }
    }

    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns whether there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Lays out child `index` with at most `max` and returns its size.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn measure(&mut self, index: usize, max: Size) -> Size {
        let renderer = self.layout_child(index, Constraint::new(max));
        let size = renderer.size();
        self.renderers[index] = Some(renderer);
        if self.transposed {
            size.transposed()
        } else {
            size
        }
    }

    fn layout_child(&self, index: usize, constraint: Constraint) -> Rc<dyn Renderer> {
        let constraint = if self.transposed {
            constraint.transposed()
        } else {
            constraint
        };
        self.children[index].layout(constraint)
    }
}

/// A layout node that positions children with a [`LayoutStrategy`].
#[derive(Clone)]
pub struct Container {
    children: Vec<Rc<dyn Provider>>,
    strategy: Rc<dyn LayoutStrategy>,
    transposed: bool,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("children", &self.children.len())
            .field("transposed", &self.transposed)
            .finish_non_exhaustive()
    }
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new(strategy: impl LayoutStrategy + 'static) -> Self {
        Self {
            children: Vec::new(),
            strategy: Rc::new(strategy),
            transposed: false,
        }
    }

    /// Creates a vertical stack.
    #[must_use]
    pub fn column(spacing: f64) -> Self {
        Self::new(Stack { spacing })
    }

    /// Creates a horizontal stack.
    #[must_use]
    pub fn row(spacing: f64) -> Self {
        Self::new(Stack { spacing }).transposed(true)
    }

    /// Appends a child.
    #[must_use]
    pub fn child(mut self, child: impl Provider + 'static) -> Self {
        self.children.push(Rc::new(child));
        self
    }

    /// Appends an already shared child.
    #[must_use]
    pub fn shared_child(mut self, child: Rc<dyn Provider>) -> Self {
        self.children.push(child);
        self
    }

    /// Appends every child produced by `children`.
    #[must_use]
    pub fn children<P: Provider + 'static>(mut self, children: impl IntoIterator<Item = P>) -> Self {
        self.children
            .extend(children.into_iter().map(|c| Rc::new(c) as Rc<dyn Provider>));
        self
    }

    /// Sets whether the strategy's axes are swapped.
    #[must_use]
    pub fn transposed(mut self, transposed: bool) -> Self {
        self.transposed = transposed;
        self
    }

    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns whether there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Provider for Container {
    fn layout(&self, constraint: Constraint) -> Rc<dyn Renderer> {
        let local = if self.transposed {
            constraint.transposed()
        } else {
            constraint
        };
        let mut measure = ChildMeasure::new(&self.children, self.transposed);
        let frames = self.strategy.compute_frames(&mut measure, local.max);

        let mut children = Vec::with_capacity(frames.len());
        for (index, frame) in frames.into_iter().enumerate().take(self.children.len()) {
            let renderer = match measure.renderers[index].take() {
                Some(renderer) => renderer,
                None => measure.layout_child(index, Constraint::tight(frame.size())),
            };
            let frame = if self.transposed {
                frame.transposed()
            } else {
                frame
            };
            children.push((renderer, frame));
        }
        let frames: Vec<Rect> = children.iter().map(|(_, frame)| *frame).collect();
        Rc::new(ContainerRenderer {
            size: union_size(&frames),
            children,
        })
    }
}

struct ContainerRenderer {
    size: Size,
    children: Vec<(Rc<dyn Renderer>, Rect)>,
}

impl Renderer for ContainerRenderer {
    fn size(&self) -> Size {
        self.size
    }

    fn views(&self, rect: Rect) -> Vec<ViewData> {
        let mut out = Vec::new();
        for (child, frame) in &self.children {
            if !intersects(rect, *frame) {
                continue;
            }
            let origin = frame.origin().to_vec2();
            let local = rect.intersect(*frame) - origin;
            out.extend(child.views(local).into_iter().map(|v| v.offset(origin)));
        }
        out
    }
}

/// Places children one after another along the main axis.
///
/// Every child may use the full cross-axis extent and is unbounded along the
/// main axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stack {
    /// Gap between consecutive children.
    pub spacing: f64,
}

impl LayoutStrategy for Stack {
    fn compute_frames(&self, children: &mut ChildMeasure<'_>, max: Size) -> Vec<Rect> {
        let mut frames = Vec::with_capacity(children.len());
        let mut y = 0.0;
        for i in 0..children.len() {
            let size = children.measure(i, Size::new(max.width, f64::INFINITY));
            frames.push(Rect::from_origin_size(Point::new(0.0, y), size));
            y += size.height + self.spacing;
        }
        frames
    }
}

/// Places children in rows, wrapping when the next child does not fit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Flow {
    /// Gap between children on one line.
    pub spacing: f64,
    /// Gap between lines.
    pub line_spacing: f64,
}

impl LayoutStrategy for Flow {
    fn compute_frames(&self, children: &mut ChildMeasure<'_>, max: Size) -> Vec<Rect> {
        let mut frames = Vec::with_capacity(children.len());
        let (mut x, mut y, mut line_height) = (0.0, 0.0, 0.0_f64);
        for i in 0..children.len() {
            let size = children.measure(i, max);
            if x > 0.0 && x + size.width > max.width {
                x = 0.0;
                y += line_height + self.line_spacing;
                line_height = 0.0;
            }
            frames.push(Rect::from_origin_size(Point::new(x, y), size));
            x += size.width + self.spacing;
            line_height = line_height.max(size.height);
        }
        frames
    }
}

/// A strategy backed by a closure.
#[derive(Clone)]
pub struct Custom(pub Rc<dyn Fn(&mut ChildMeasure<'_>, Size) -> Vec<Rect>>);

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Custom(..)")
    }
}

impl Custom {
    /// Wraps `compute`.
    #[must_use]
    pub fn new(compute: impl Fn(&mut ChildMeasure<'_>, Size) -> Vec<Rect> + 'static) -> Self {
        Self(Rc::new(compute))
    }
}

impl LayoutStrategy for Custom {
    fn compute_frames(&self, children: &mut ChildMeasure<'_>, max: Size) -> Vec<Rect> {
        (self.0)(children, max)
    }
}
