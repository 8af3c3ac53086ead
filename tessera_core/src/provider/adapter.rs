// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf providers that wrap a typed view.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use core::any::{Any, type_name};
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use kurbo::Size;

use super::{LeafRenderer, Provider, Renderer, ViewProvider};
use crate::animator::Animator;
use crate::constraint::Constraint;
use crate::reuse::ReusePool;
use crate::view::property::{Color, Modifiers, PropertyValue};
use crate::view::{ViewId, ViewStore};

static NEXT_KEY: AtomicU64 = AtomicU64::new(0);

fn generated_key() -> String {
    let n = NEXT_KEY.fetch_add(1, Ordering::Relaxed);
    alloc::format!("view-{n}")
}

/// How a leaf resolves its size under a constraint.
#[derive(Clone, Default)]
pub enum Sizing {
    /// A fixed size, clamped by the constraint.
    Fixed(Size),
    /// The constraint's maximum on bounded axes, its minimum otherwise.
    #[default]
    Fill,
    /// A measuring closure, whose result is clamped by the constraint.
    Measure(Rc<dyn Fn(Constraint) -> Size>),
}

impl fmt::Debug for Sizing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(size) => f.debug_tuple("Fixed").field(size).finish(),
            Self::Fill => f.write_str("Fill"),
            Self::Measure(_) => f.write_str("Measure(..)"),
        }
    }
}

impl Sizing {
    /// Resolves this sizing rule under `constraint`.
    #[must_use]
    pub fn resolve(&self, constraint: Constraint) -> Size {
        match self {
            Self::Fixed(size) => constraint.clamp(*size),
            Self::Fill => Size::new(
                if constraint.has_bounded_width() {
                    constraint.max.width
                } else {
                    constraint.min.width
                },
                if constraint.has_bounded_height() {
                    constraint.max.height
                } else {
                    constraint.min.height
                },
            ),
            Self::Measure(measure) => constraint.clamp(measure(constraint)),
        }
    }
}

/// A leaf provider for views whose content is a `V`.
///
/// New views are created holding `V::default()`, or the value produced by
/// the closure given to [`from_fn`](Self::from_fn). They are pooled under the
/// type name of `V` unless reuse is disabled. Each update applies the
/// declared [`Modifiers`] and then the update closure.
pub struct ViewAdapter<V> {
    key: String,
    animator: Option<Rc<dyn Animator>>,
    reuse_key: Option<String>,
    sizing: Sizing,
    modifiers: Modifiers,
    make: Rc<dyn Fn() -> V>,
    update: Option<Rc<dyn Fn(&mut V)>>,
}

impl<V> Clone for ViewAdapter<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            animator: self.animator.clone(),
            reuse_key: self.reuse_key.clone(),
            sizing: self.sizing.clone(),
            modifiers: self.modifiers.clone(),
            make: self.make.clone(),
            update: self.update.clone(),
        }
    }
}

impl<V> fmt::Debug for ViewAdapter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewAdapter")
            .field("key", &self.key)
            .field("reuse_key", &self.reuse_key)
            .field("sizing", &self.sizing)
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

impl<V: Any + Default> Default for ViewAdapter<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Any + Default> ViewAdapter<V> {
    /// Creates an adapter with a generated key.
    #[must_use]
    pub fn new() -> Self {
        Self::with_key(generated_key())
    }

    /// Creates an adapter with an explicit identity key.
    #[must_use]
    pub fn with_key(key: impl Into<String>) -> Self {
        Self::from_fn(key, V::default)
    }
}

impl<V: Any> ViewAdapter<V> {
    /// Creates an adapter whose new views hold the value produced by `make`.
    #[must_use]
    pub fn from_fn(key: impl Into<String>, make: impl Fn() -> V + 'static) -> Self {
        Self {
            key: key.into(),
            animator: None,
            reuse_key: Some(type_name::<V>().to_string()),
            sizing: Sizing::Fill,
            modifiers: Modifiers::new(),
            make: Rc::new(make),
            update: None,
        }
    }

    /// Returns the identity key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Sets the identity key.
    #[must_use]
    pub fn id(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Sets the per-item animator.
    #[must_use]
    pub fn animator(mut self, animator: Rc<dyn Animator>) -> Self {
        self.animator = Some(animator);
        self
    }

    /// Pools views under `reuse_key` instead of the type name.
    #[must_use]
    pub fn reuse_key(mut self, reuse_key: impl Into<String>) -> Self {
        self.reuse_key = Some(reuse_key.into());
        self
    }

    /// Disables pooling: every view is freshly created.
    #[must_use]
    pub fn without_reuse(mut self) -> Self {
        self.reuse_key = None;
        self
    }

    /// Sets the sizing rule.
    #[must_use]
    pub fn sizing(mut self, sizing: Sizing) -> Self {
        self.sizing = sizing;
        self
    }

    /// Uses a fixed size.
    #[must_use]
    pub fn size(self, size: Size) -> Self {
        self.sizing(Sizing::Fixed(size))
    }

    /// Uses a measuring closure.
    #[must_use]
    pub fn measure(self, measure: impl Fn(Constraint) -> Size + 'static) -> Self {
        self.sizing(Sizing::Measure(Rc::new(measure)))
    }

    /// Sets the closure that configures the content on every update.
    #[must_use]
    pub fn update(mut self, update: impl Fn(&mut V) + 'static) -> Self {
        self.update = Some(Rc::new(update));
        self
    }

    /// Declares a property value.
    #[must_use]
    pub fn modifier(mut self, value: PropertyValue) -> Self {
        self.modifiers.set(value);
        self
    }

    /// Declares the view's opacity.
    #[must_use]
    pub fn opacity(self, opacity: f64) -> Self {
        self.modifier(PropertyValue::Opacity(opacity))
    }

    /// Declares the view's hidden flag.
    #[must_use]
    pub fn hidden(self, hidden: bool) -> Self {
        self.modifier(PropertyValue::Hidden(hidden))
    }

    /// Declares the background fill.
    #[must_use]
    pub fn background(self, color: Color) -> Self {
        self.modifier(PropertyValue::Background(Some(color)))
    }

    /// Declares the corner radius.
    #[must_use]
    pub fn corner_radius(self, radius: f64) -> Self {
        self.modifier(PropertyValue::CornerRadius(radius))
    }

    /// Declares a border.
    #[must_use]
    pub fn border(self, width: f64, color: Color) -> Self {
        self.modifier(PropertyValue::BorderWidth(width))
            .modifier(PropertyValue::BorderColor(Some(color)))
    }
}

impl<V: Any> ViewProvider for ViewAdapter<V> {
    fn reuse_key(&self) -> Option<&str> {
        self.reuse_key.as_deref()
    }

    fn make_view(&self, views: &mut ViewStore, pool: &mut ReusePool) -> ViewId {
        let create = |views: &mut ViewStore| views.create_view_with((self.make)());
        match &self.reuse_key {
            Some(key) => pool.dequeue(views, key, create),
            None => create(views),
        }
    }

    fn update_view(&self, views: &mut ViewStore, view: ViewId) {
        if !views.has_content::<V>(view) {
            return;
        }
        self.modifiers.apply(views, view);
        if let Some(update) = &self.update
            && let Some(content) = views.content_mut::<V>(view)
        {
            update(content);
        }
    }
}

impl<V: Any> Provider for ViewAdapter<V> {
    fn layout(&self, constraint: Constraint) -> Rc<dyn Renderer> {
        Rc::new(LeafRenderer {
            key: self.key.clone(),
            size: self.sizing.resolve(constraint),
            provider: Rc::new(self.clone()),
            animator: self.animator.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Label {
        text: String,
    }

    #[test]
    fn fixed_size_is_clamped() {
        let adapter = ViewAdapter::<Label>::new().size(Size::new(500.0, 20.0));
        let r = adapter.layout(Constraint::new(Size::new(300.0, f64::INFINITY)));
        assert_eq!(r.size(), Size::new(300.0, 20.0));
    }

    #[test]
    fn fill_uses_bounded_max() {
        let adapter = ViewAdapter::<Label>::new();
        let r = adapter.layout(Constraint::new(Size::new(300.0, f64::INFINITY)));
        assert_eq!(r.size(), Size::new(300.0, 0.0));
    }

    #[test]
    fn measure_receives_constraint() {
        let adapter = ViewAdapter::<Label>::new().measure(|c| Size::new(c.max.width / 2.0, 44.0));
        let r = adapter.layout(Constraint::new(Size::new(200.0, 100.0)));
        assert_eq!(r.size(), Size::new(100.0, 44.0));
    }

    #[test]
    fn leaf_is_visible_only_when_intersecting() {
        let adapter = ViewAdapter::<Label>::with_key("a").size(Size::new(10.0, 10.0));
        let r = adapter.layout(Constraint::default());
        let hits = r.views(Rect::new(5.0, 5.0, 50.0, 50.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "a");
        assert_eq!(hits[0].frame, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(r.views(Rect::new(20.0, 20.0, 30.0, 30.0)).is_empty());
    }

    #[test]
    fn reuse_key_defaults_to_type_name() {
        let adapter = ViewAdapter::<Label>::new();
        assert_eq!(
            ViewProvider::reuse_key(&adapter),
            Some(type_name::<Label>())
        );
        assert_eq!(ViewProvider::reuse_key(&adapter.without_reuse()), None);
    }

    #[test]
    fn update_applies_modifiers_and_closure() {
        let mut views = ViewStore::new();
        let mut pool = ReusePool::new();
        let adapter = ViewAdapter::<Label>::new()
            .opacity(0.5)
            .update(|label: &mut Label| label.text = "hello".to_string());
        let view = adapter.make_view(&mut views, &mut pool);
        adapter.update_view(&mut views, view);
        assert_eq!(views.opacity(view), 0.5);
        assert_eq!(views.content::<Label>(view).map(|l| l.text.as_str()), Some("hello"));
    }

    #[test]
    fn update_skips_mismatched_view_type() {
        let mut views = ViewStore::new();
        let other = views.create_view_with(7_u32);
        let adapter = ViewAdapter::<Label>::new().opacity(0.5);
        adapter.update_view(&mut views, other);
        assert_eq!(views.opacity(other), 1.0);
    }

    #[test]
    fn make_view_dequeues_pooled_views() {
        let mut views = ViewStore::new();
        let mut pool = ReusePool::new();
        let adapter = ViewAdapter::<Label>::new();
        let first = adapter.make_view(&mut views, &mut pool);
        pool.enqueue(&mut views, first);
        let second = adapter.make_view(&mut views, &mut pool);
        assert_eq!(first, second);

        let fresh = adapter.clone().without_reuse();
        let third = fresh.make_view(&mut views, &mut pool);
        assert_ne!(third, second);
        assert!(views.has_content::<Label>(third));
    }
}
