// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative property modifiers with automatic restore.
//!
//! A leaf provider declares a set of [`Modifiers`], the property values it
//! wants on its view. Reused views may have been configured by a different
//! provider, so applying modifiers is a two-step rebind:
//!
//! 1. Every property this view had modified before but which is no longer
//!    declared is restored to the value it had before its first modification.
//! 2. Every declared property is written. The pre-mutation value is captured
//!    the first time a key is written, so repeated updates keep the true
//!    original.
//!
//! The captured originals live in a per-view side table owned by the
//! [`ViewStore`]; views never carry hidden state of their own.

use alloc::collections::BTreeMap;

use super::id::ViewId;
use super::store::ViewStore;

/// A straight-alpha RGBA color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red component (0.0–1.0).
    pub r: f32,
    /// Green component (0.0–1.0).
    pub g: f32,
    /// Blue component (0.0–1.0).
    pub b: f32,
    /// Alpha component (0.0–1.0).
    pub a: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from its components.
    #[inline]
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Identifies a property that can be set through [`Modifiers`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    /// View opacity.
    Opacity,
    /// Hidden flag.
    Hidden,
    /// Background fill.
    Background,
    /// Corner radius applied to background and border.
    CornerRadius,
    /// Border stroke width.
    BorderWidth,
    /// Border stroke color.
    BorderColor,
}

/// A value for one [`PropertyKey`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
    /// See [`PropertyKey::Opacity`].
    Opacity(f64),
    /// See [`PropertyKey::Hidden`].
    Hidden(bool),
    /// See [`PropertyKey::Background`].
    Background(Option<Color>),
    /// See [`PropertyKey::CornerRadius`].
    CornerRadius(f64),
    /// See [`PropertyKey::BorderWidth`].
    BorderWidth(f64),
    /// See [`PropertyKey::BorderColor`].
    BorderColor(Option<Color>),
}

impl PropertyValue {
    /// Returns the key this value is stored under.
    #[must_use]
    pub const fn key(&self) -> PropertyKey {
        match self {
            Self::Opacity(_) => PropertyKey::Opacity,
            Self::Hidden(_) => PropertyKey::Hidden,
            Self::Background(_) => PropertyKey::Background,
            Self::CornerRadius(_) => PropertyKey::CornerRadius,
            Self::BorderWidth(_) => PropertyKey::BorderWidth,
            Self::BorderColor(_) => PropertyKey::BorderColor,
        }
    }
}

/// Per-view appearance values that are only reachable through property keys.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Appearance {
    /// Background fill, if any.
    pub background: Option<Color>,
    /// Corner radius.
    pub corner_radius: f64,
    /// Border stroke width.
    pub border_width: f64,
    /// Border stroke color, if any.
    pub border_color: Option<Color>,
}

/// An ordered set of declared property values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Modifiers {
    values: BTreeMap<PropertyKey, PropertyValue>,
}

impl Modifiers {
    /// Creates an empty modifier set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `value`, replacing any earlier value for the same key.
    pub fn set(&mut self, value: PropertyValue) {
        self.values.insert(value.key(), value);
    }

    /// Removes the declaration for `key`.
    pub fn remove(&mut self, key: PropertyKey) {
        self.values.remove(&key);
    }

    /// Returns the declared value for `key`.
    #[must_use]
    pub fn get(&self, key: PropertyKey) -> Option<PropertyValue> {
        self.values.get(&key).copied()
    }

    /// Returns whether no property is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Applies the declared values to `view`, restoring properties that were
    /// modified earlier but are no longer declared.
    ///
    /// # Panics
    ///
    /// Panics if `view` is stale.
    pub fn apply(&self, views: &mut ViewStore, view: ViewId) {
        let resets = views.take_property_resets(view);
        let mut kept = BTreeMap::new();
        for (key, original) in resets {
            if self.values.contains_key(&key) {
                kept.insert(key, original);
            } else {
                views.set_property(view, original);
            }
        }
        for (key, value) in &self.values {
            if !kept.contains_key(key) {
                kept.insert(*key, views.property(view, *key));
            }
            views.set_property(view, *value);
        }
        views.put_property_resets(view, kept);
    }
}
