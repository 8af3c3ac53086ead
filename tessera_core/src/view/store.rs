// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays view storage with allocation, topology, geometry, and
//! property management.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::any::Any;
use core::iter::FusedIterator;

use kurbo::{Affine, Insets, Point, Rect, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, ViewId};
use super::property::{Appearance, PropertyKey, PropertyValue};
use crate::dirty;

/// Per-view boolean flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ViewFlags {
    /// Whether the view (and its subtree) is hidden.
    pub hidden: bool,
}

/// Scrolling metrics of a view that hosts scrollable content.
///
/// Plain views keep the defaults; they only matter for views that host an
/// [`Engine`](crate::engine::Engine).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    /// Size of the scrollable content.
    pub content_size: Size,
    /// Insets around the content (safe areas, toolbars).
    pub content_inset: Insets,
    /// Current zoom scale.
    pub zoom_scale: f64,
}

impl Default for ScrollMetrics {
    fn default() -> Self {
        Self {
            content_size: Size::ZERO,
            content_inset: Insets::ZERO,
            zoom_scale: 1.0,
        }
    }
}

/// Struct-of-arrays storage for a retained view tree.
///
/// Views are addressed by [`ViewId`] handles. Each view occupies a slot in
/// parallel arrays; destroyed views are recycled via a free list, and
/// generation counters prevent stale handle access.
///
/// # Geometry
///
/// A view's geometry follows the usual retained-toolkit model:
///
/// - `bounds` is the view's own coordinate space. Its origin is the scroll
///   offset for scrolling views and zero otherwise.
/// - `center` positions the view in its parent's bounds space.
/// - `scale` is a uniform scale about the center (used for zooming).
///
/// The frame is derived from these three values.
#[derive(Debug)]
pub struct ViewStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) bounds: Vec<Rect>,
    pub(crate) center: Vec<Point>,
    pub(crate) scale: Vec<f64>,
    pub(crate) opacity: Vec<f64>,
    pub(crate) flags: Vec<ViewFlags>,
    pub(crate) appearance: Vec<Appearance>,
    pub(crate) scroll: Vec<ScrollMetrics>,
    pub(crate) content: Vec<Option<Box<dyn Any>>>,
    pub(crate) property_resets: Vec<BTreeMap<PropertyKey, PropertyValue>>,

    // -- Computed properties (written by evaluate) --
    pub(crate) world_transform: Vec<Affine>,
    pub(crate) effective_opacity: Vec<f64>,
    pub(crate) effective_hidden: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStore {
    /// Creates an empty view store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            bounds: Vec::new(),
            center: Vec::new(),
            scale: Vec::new(),
            opacity: Vec::new(),
            flags: Vec::new(),
            appearance: Vec::new(),
            scroll: Vec::new(),
            content: Vec::new(),
            property_resets: Vec::new(),
            world_transform: Vec::new(),
            effective_opacity: Vec::new(),
            effective_hidden: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new empty view and returns its handle.
    ///
    /// The view starts with zero bounds at the origin, scale 1, full opacity,
    /// default appearance, no content, and no parent.
    pub fn create_view(&mut self) -> ViewId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = INVALID;
            self.first_child[idx as usize] = INVALID;
            self.next_sibling[idx as usize] = INVALID;
            self.prev_sibling[idx as usize] = INVALID;
            self.bounds[idx as usize] = Rect::ZERO;
            self.center[idx as usize] = Point::ZERO;
            self.scale[idx as usize] = 1.0;
            self.opacity[idx as usize] = 1.0;
            self.flags[idx as usize] = ViewFlags::default();
            self.appearance[idx as usize] = Appearance::default();
            self.scroll[idx as usize] = ScrollMetrics::default();
            self.content[idx as usize] = None;
            self.property_resets[idx as usize].clear();
            self.world_transform[idx as usize] = Affine::IDENTITY;
            self.effective_opacity[idx as usize] = 1.0;
            self.effective_hidden[idx as usize] = false;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.bounds.push(Rect::ZERO);
            self.center.push(Point::ZERO);
            self.scale.push(1.0);
            self.opacity.push(1.0);
            self.flags.push(ViewFlags::default());
            self.appearance.push(Appearance::default());
            self.scroll.push(ScrollMetrics::default());
            self.content.push(None);
            self.property_resets.push(BTreeMap::new());
            self.world_transform.push(Affine::IDENTITY);
            self.effective_opacity.push(1.0);
            self.effective_hidden.push(false);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);

        ViewId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Creates a new view holding typed `content`.
    pub fn create_view_with<V: Any>(&mut self, content: V) -> ViewId {
        let id = self.create_view();
        self.content[id.idx as usize] = Some(Box::new(content));
        self.dirty.mark(id.idx, dirty::CONTENT);
        id
    }

    /// Destroys a view, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the view has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_view(&mut self, id: ViewId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy view with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        self.dirty.remove_key(idx);
        self.content[idx as usize] = None;
        self.property_resets[idx as usize].clear();

        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live view.
    #[must_use]
    pub fn is_alive(&self, id: ViewId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Adds `child` as the last (frontmost) child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: ViewId, child: ViewId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
        self.link_last(parent.idx, child.idx);
    }

    /// Inserts `child` into `parent`'s children at position `index`
    /// (0 = backmost). Indices past the end append.
    ///
    /// If `child` is attached elsewhere it is moved. If it is already at
    /// `index` under `parent` nothing changes and no dirty state is marked.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or if `child == parent`.
    pub fn insert_child_at(&mut self, parent: ViewId, child: ViewId, index: usize) {
        self.validate(parent);
        self.validate(child);
        assert!(parent != child, "a view cannot be its own child");
        let p = parent.idx;
        let c = child.idx;

        if self.parent[c as usize] == p && self.index_in_parent(c) == index {
            return;
        }
        if self.parent[c as usize] != INVALID {
            self.detach(c);
        }

        // Find the sibling currently occupying `index`.
        let mut sibling = self.first_child[p as usize];
        let mut i = 0;
        while sibling != INVALID && i < index {
            sibling = self.next_sibling[sibling as usize];
            i += 1;
        }
        if sibling == INVALID {
            self.link_last(p, c);
            return;
        }

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = sibling;
        self.prev_sibling[c as usize] = self.prev_sibling[sibling as usize];
        if self.prev_sibling[sibling as usize] != INVALID {
            self.next_sibling[self.prev_sibling[sibling as usize] as usize] = c;
        } else {
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[sibling as usize] = c;

        let _ = self.dirty.add_dependency(c, p, dirty::GEOMETRY);
        self.dirty.mark_with(c, dirty::GEOMETRY, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `view` from its parent. Views without a parent are left alone.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_from_parent(&mut self, view: ViewId) {
        self.validate(view);
        if self.parent[view.idx as usize] != INVALID {
            self.detach(view.idx);
        }
    }

    /// Returns the parent of a view, if any.
    #[must_use]
    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.validate(id);
        self.handle(self.parent[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a view, back to front.
    #[must_use]
    pub fn children(&self, id: ViewId) -> Children<'_> {
        self.validate(id);
        Children {
            next_sibling: &self.next_sibling,
            generation: &self.generation,
            next: self.first_child[id.idx as usize],
        }
    }

    /// Returns the handles of views that have no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<ViewId> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx))
            .map(|idx| ViewId {
                idx,
                generation: self.generation[idx as usize],
            })
            .collect()
    }

    // -- Geometry --

    /// Returns the bounds of a view.
    #[must_use]
    pub fn bounds(&self, id: ViewId) -> Rect {
        self.validate(id);
        self.bounds[id.idx as usize]
    }

    /// Returns the center of a view in its parent's coordinate space.
    #[must_use]
    pub fn center(&self, id: ViewId) -> Point {
        self.validate(id);
        self.center[id.idx as usize]
    }

    /// Returns the scale of a view.
    #[must_use]
    pub fn scale(&self, id: ViewId) -> f64 {
        self.validate(id);
        self.scale[id.idx as usize]
    }

    /// Returns the frame of a view in its parent's coordinate space.
    #[must_use]
    pub fn frame(&self, id: ViewId) -> Rect {
        self.validate(id);
        let idx = id.idx as usize;
        let size = self.bounds[idx].size() * self.scale[idx];
        Rect::from_center_size(self.center[idx], size)
    }

    /// Sets the bounds of a view.
    pub fn set_bounds(&mut self, id: ViewId, bounds: Rect) {
        self.validate(id);
        self.bounds[id.idx as usize] = bounds;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Moves the bounds origin (the scroll offset) without changing its size.
    pub fn set_bounds_origin(&mut self, id: ViewId, origin: Point) {
        let size = self.bounds(id).size();
        self.set_bounds(id, Rect::from_origin_size(origin, size));
    }

    /// Resizes the bounds while keeping their origin.
    pub fn set_size(&mut self, id: ViewId, size: Size) {
        let origin = self.bounds(id).origin();
        self.set_bounds(id, Rect::from_origin_size(origin, size));
    }

    /// Sets the center of a view.
    pub fn set_center(&mut self, id: ViewId, center: Point) {
        self.validate(id);
        self.center[id.idx as usize] = center;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Sets the scale of a view about its center.
    pub fn set_scale(&mut self, id: ViewId, scale: f64) {
        self.validate(id);
        self.scale[id.idx as usize] = scale;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Positions a view so its frame equals `frame`, taking its scale into
    /// account.
    pub fn set_frame(&mut self, id: ViewId, frame: Rect) {
        let scale = self.scale(id);
        let size = if scale == 0.0 {
            Size::ZERO
        } else {
            frame.size() / scale
        };
        self.set_size(id, size);
        self.set_center(id, frame.center());
    }

    /// Returns the transform from slot `idx`'s coordinate space into its
    /// parent's.
    pub(super) fn local_to_parent(&self, idx: u32) -> Affine {
        let i = idx as usize;
        Affine::translate(self.center[i].to_vec2())
            * Affine::scale(self.scale[i])
            * Affine::translate(-self.bounds[i].center().to_vec2())
    }

    /// Returns the transform from slot `idx`'s coordinate space into the space of
    /// its root view, walking the current ancestry.
    fn local_to_root(&self, idx: u32) -> Affine {
        let mut xf = Affine::IDENTITY;
        let mut cur = idx;
        while cur != INVALID {
            xf = self.local_to_parent(cur) * xf;
            cur = self.parent[cur as usize];
        }
        xf
    }

    /// Converts `rect` from `from`'s coordinate space into `to`'s.
    ///
    /// Both views are mapped through their root; views in different trees are
    /// treated as if their roots shared an origin.
    #[must_use]
    pub fn convert_rect(&self, rect: Rect, from: ViewId, to: ViewId) -> Rect {
        self.validate(from);
        self.validate(to);
        let xf = self.local_to_root(to.idx).inverse() * self.local_to_root(from.idx);
        xf.transform_rect_bbox(rect)
    }

    // -- Scroll metrics --

    /// Returns the scroll metrics of a view.
    #[must_use]
    pub fn scroll_metrics(&self, id: ViewId) -> ScrollMetrics {
        self.validate(id);
        self.scroll[id.idx as usize]
    }

    /// Sets the scrollable content size of a view.
    pub fn set_content_size(&mut self, id: ViewId, size: Size) {
        self.validate(id);
        self.scroll[id.idx as usize].content_size = size;
        self.dirty.mark(id.idx, dirty::SCROLL);
    }

    /// Sets the content inset of a view.
    pub fn set_content_inset(&mut self, id: ViewId, inset: Insets) {
        self.validate(id);
        self.scroll[id.idx as usize].content_inset = inset;
        self.dirty.mark(id.idx, dirty::SCROLL);
    }

    /// Sets the zoom scale of a view.
    ///
    /// This only records the metric. Whoever implements zooming applies the
    /// matching [`set_scale`](Self::set_scale) to the zoomed content view.
    pub fn set_zoom_scale(&mut self, id: ViewId, zoom_scale: f64) {
        self.validate(id);
        self.scroll[id.idx as usize].zoom_scale = zoom_scale;
        self.dirty.mark(id.idx, dirty::SCROLL);
    }

    // -- Layout requests --

    /// Records that `id` wants its host to run a layout pass.
    ///
    /// Requests surface as [`ViewChanges::layout_requests`](super::ViewChanges::layout_requests).
    pub fn set_needs_layout(&mut self, id: ViewId) {
        self.validate(id);
        self.dirty.mark(id.idx, dirty::LAYOUT);
    }

    // -- Visual properties --

    /// Returns the local opacity of a view.
    #[must_use]
    pub fn opacity(&self, id: ViewId) -> f64 {
        self.validate(id);
        self.opacity[id.idx as usize]
    }

    /// Sets the local opacity of a view.
    pub fn set_opacity(&mut self, id: ViewId, opacity: f64) {
        self.validate(id);
        self.opacity[id.idx as usize] = opacity;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Returns the flags of a view.
    #[must_use]
    pub fn flags(&self, id: ViewId) -> ViewFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Sets the flags of a view.
    pub fn set_flags(&mut self, id: ViewId, flags: ViewFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Returns the appearance of a view.
    #[must_use]
    pub fn appearance(&self, id: ViewId) -> Appearance {
        self.validate(id);
        self.appearance[id.idx as usize]
    }

    /// Returns the current value of a keyed property.
    #[must_use]
    pub fn property(&self, id: ViewId, key: PropertyKey) -> PropertyValue {
        self.validate(id);
        let i = id.idx as usize;
        let a = &self.appearance[i];
        match key {
            PropertyKey::Opacity => PropertyValue::Opacity(self.opacity[i]),
            PropertyKey::Hidden => PropertyValue::Hidden(self.flags[i].hidden),
            PropertyKey::Background => PropertyValue::Background(a.background),
            PropertyKey::CornerRadius => PropertyValue::CornerRadius(a.corner_radius),
            PropertyKey::BorderWidth => PropertyValue::BorderWidth(a.border_width),
            PropertyKey::BorderColor => PropertyValue::BorderColor(a.border_color),
        }
    }

    /// Writes a keyed property, marking the matching dirty channel.
    pub fn set_property(&mut self, id: ViewId, value: PropertyValue) {
        self.validate(id);
        let i = id.idx as usize;
        match value {
            PropertyValue::Opacity(v) => return self.set_opacity(id, v),
            PropertyValue::Hidden(hidden) => return self.set_flags(id, ViewFlags { hidden }),
            PropertyValue::Background(v) => self.appearance[i].background = v,
            PropertyValue::CornerRadius(v) => self.appearance[i].corner_radius = v,
            PropertyValue::BorderWidth(v) => self.appearance[i].border_width = v,
            PropertyValue::BorderColor(v) => self.appearance[i].border_color = v,
        }
        self.dirty.mark(id.idx, dirty::APPEARANCE);
    }

    pub(crate) fn take_property_resets(
        &mut self,
        id: ViewId,
    ) -> BTreeMap<PropertyKey, PropertyValue> {
        self.validate(id);
        core::mem::take(&mut self.property_resets[id.idx as usize])
    }

    pub(crate) fn put_property_resets(
        &mut self,
        id: ViewId,
        resets: BTreeMap<PropertyKey, PropertyValue>,
    ) {
        self.validate(id);
        self.property_resets[id.idx as usize] = resets;
    }

    // -- Typed content --

    /// Returns whether the view's content is of type `V`.
    #[must_use]
    pub fn has_content<V: Any>(&self, id: ViewId) -> bool {
        self.validate(id);
        self.content[id.idx as usize]
            .as_ref()
            .is_some_and(|c| c.is::<V>())
    }

    /// Returns the view's content if it is of type `V`.
    #[must_use]
    pub fn content<V: Any>(&self, id: ViewId) -> Option<&V> {
        self.validate(id);
        self.content[id.idx as usize].as_ref()?.downcast_ref()
    }

    /// Returns the view's content mutably if it is of type `V`, marking the
    /// content channel dirty.
    ///
    /// A type mismatch returns `None` and marks nothing.
    pub fn content_mut<V: Any>(&mut self, id: ViewId) -> Option<&mut V> {
        if !self.has_content::<V>(id) {
            return None;
        }
        self.dirty.mark(id.idx, dirty::CONTENT);
        self.content[id.idx as usize].as_mut()?.downcast_mut()
    }

    /// Replaces the view's content.
    pub fn set_content<V: Any>(&mut self, id: ViewId, content: V) {
        self.validate(id);
        self.content[id.idx as usize] = Some(Box::new(content));
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    // -- Computed properties --

    /// Returns the frame of a view in its root's coordinate space.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn world_frame(&self, id: ViewId) -> Rect {
        self.validate(id);
        self.world_frame_at(id.idx)
    }

    /// Returns the computed effective opacity of a view.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_opacity(&self, id: ViewId) -> f64 {
        self.validate(id);
        self.effective_opacity[id.idx as usize]
    }

    /// Returns whether the view is effectively hidden (including by an
    /// ancestor's hidden flag).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_hidden(&self, id: ViewId) -> bool {
        self.validate(id);
        self.effective_hidden[id.idx as usize]
    }

    // -- Raw-index accessors for backends --
    //
    // These accept raw slot indices (as found in `ViewChanges`) rather than
    // `ViewId` handles, skipping generation validation.

    /// Returns the world frame at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_frame_at(&self, idx: u32) -> Rect {
        self.check_slot(idx);
        self.world_transform[idx as usize].transform_rect_bbox(self.bounds[idx as usize])
    }

    /// Returns the effective opacity at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_opacity_at(&self, idx: u32) -> f64 {
        self.check_slot(idx);
        self.effective_opacity[idx as usize]
    }

    /// Returns whether the view at raw slot `idx` is effectively hidden.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_hidden_at(&self, idx: u32) -> bool {
        self.check_slot(idx);
        self.effective_hidden[idx as usize]
    }

    /// Returns the appearance at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn appearance_at(&self, idx: u32) -> Appearance {
        self.check_slot(idx);
        self.appearance[idx as usize]
    }

    /// Returns the scroll metrics at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn scroll_metrics_at(&self, idx: u32) -> ScrollMetrics {
        self.check_slot(idx);
        self.scroll[idx as usize]
    }

    /// Returns the raw content at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn content_at(&self, idx: u32) -> Option<&dyn Any> {
        self.check_slot(idx);
        self.content[idx as usize].as_deref()
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: ViewId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale ViewId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn check_slot(&self, idx: u32) {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
    }

    fn handle(&self, idx: u32) -> Option<ViewId> {
        (idx != INVALID).then(|| ViewId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Returns the position of `idx` among its siblings.
    fn index_in_parent(&self, idx: u32) -> usize {
        let mut n = 0;
        let mut prev = self.prev_sibling[idx as usize];
        while prev != INVALID {
            n += 1;
            prev = self.prev_sibling[prev as usize];
        }
        n
    }

    /// Appends `c` as the last child of `p` and marks dirty state.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        let _ = self.dirty.add_dependency(c, p, dirty::GEOMETRY);
        self.dirty.mark_with(c, dirty::GEOMETRY, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Unlinks `c` from its parent and drops the dependency edge.
    fn detach(&mut self, c: u32) {
        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::GEOMETRY);
        self.dirty.mark_with(c, dirty::GEOMETRY, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

/// Iterator over the direct children of a view, back to front.
///
/// Returned by [`ViewStore::children`]. Borrows only the sibling links and
/// generation counters of the store.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    next_sibling: &'a [u32],
    generation: &'a [u32],
    next: u32,
}

impl Iterator for Children<'_> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        let idx = self.next;
        let slot = idx as usize;
        // `INVALID` ends the chain: it is never a valid slot.
        let generation = *self.generation.get(slot)?;
        self.next = self.next_sibling[slot];
        Some(ViewId { idx, generation })
    }
}

impl FusedIterator for Children<'_> {}
