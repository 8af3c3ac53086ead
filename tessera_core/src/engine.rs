// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reconciliation engine.
//!
//! An [`Engine`] binds a component (a [`Provider`]) to a host view. On every
//! host layout pass it decides between three levels of work:
//!
//! - **reload** — lay the component out again, update the content size,
//!   optionally adjust the scroll offset, then reconcile. Views that stay
//!   visible are refreshed and receive a `shift` hook.
//! - **invalidate layout** — lay out again without refreshing the content of
//!   views that stay visible. Used when only the host's size changed.
//! - **load cells** — reconcile the visible set against the current
//!   renderer. Used for scrolling.
//!
//! Reconciliation diffs the previous visible set against the renderer's
//! answer for the visible rectangle. Effective keys decide identity: a view
//! whose key is still visible is carried over to its new position, views
//! whose key vanished are handed to the animator's `delete` hook and
//! retired to the [`ReusePool`], and new keys get a dequeued or freshly made
//! view. Every visible view finally gets an `update` hook and is placed at
//! its index among the content view's children.
//!
//! Both passes are guarded against re-entrancy. A nested call made from an
//! animator hook returns immediately.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect, Size, Vec2};

use crate::animator::{Animator, DefaultAnimator, HostCx};
use crate::constraint::Constraint;
use crate::provider::{Provider, Renderer, ViewData};
use crate::reuse::ReusePool;
use crate::trace::{EngineOp, LoadCellsEvent, ReloadEvent, SkipReason, TraceSink, Tracer};
use crate::view::{ViewId, ViewStore};

/// Configuration for an [`Engine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Center the content view horizontally while it is narrower than the
    /// host.
    pub center_content_horizontally: bool,
    /// Center the content view vertically while it is shorter than the host.
    pub center_content_vertically: bool,
}

impl EngineConfig {
    /// Vertically scrolling lists: content is centered horizontally only.
    #[must_use]
    pub const fn list() -> Self {
        Self {
            center_content_horizontally: true,
            center_content_vertically: false,
        }
    }

    /// Zoomable content: centered on both axes.
    #[must_use]
    pub const fn centered() -> Self {
        Self {
            center_content_horizontally: true,
            center_content_vertically: true,
        }
    }

    /// Content pinned to the top-left corner.
    #[must_use]
    pub const fn pinned() -> Self {
        Self {
            center_content_horizontally: false,
            center_content_vertically: false,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::list()
    }
}

/// Drives a component into the subtree of one host view.
pub struct Engine {
    host: ViewId,
    content_view: Option<ViewId>,
    component: Option<Rc<dyn Provider>>,
    animator: Rc<dyn Animator>,
    renderer: Option<Rc<dyn Renderer>>,
    config: EngineConfig,

    needs_reload: bool,
    needs_load_cells: bool,
    is_reloading: bool,
    is_loading_cells: bool,
    skip_layout: bool,
    reload_count: u64,

    // Index-aligned: one entry per visible item.
    visible_keys: Vec<String>,
    visible_view_data: Vec<ViewData>,
    visible_views: Vec<ViewId>,

    last_load_bounds: Rect,
    content_offset_change: Vec2,
    content_size: Size,

    tracer: Tracer,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("host", &self.host)
            .field("content_view", &self.content_view)
            .field("has_component", &self.component.is_some())
            .field("config", &self.config)
            .field("needs_reload", &self.needs_reload)
            .field("needs_load_cells", &self.needs_load_cells)
            .field("reload_count", &self.reload_count)
            .field("visible_keys", &self.visible_keys)
            .field("content_size", &self.content_size)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine hosted by `host` with the default configuration.
    #[must_use]
    pub fn new(host: ViewId) -> Self {
        Self::with_config(host, EngineConfig::default())
    }

    /// Creates an engine hosted by `host`.
    #[must_use]
    pub fn with_config(host: ViewId, config: EngineConfig) -> Self {
        Self {
            host,
            content_view: None,
            component: None,
            animator: Rc::new(DefaultAnimator),
            renderer: None,
            config,
            needs_reload: true,
            needs_load_cells: false,
            is_reloading: false,
            is_loading_cells: false,
            skip_layout: false,
            reload_count: 0,
            visible_keys: Vec::new(),
            visible_view_data: Vec::new(),
            visible_views: Vec::new(),
            last_load_bounds: Rect::ZERO,
            content_offset_change: Vec2::ZERO,
            content_size: Size::ZERO,
            tracer: Tracer::none(),
        }
    }

    /// Installs a trace sink. Events are only delivered with the `trace`
    /// feature enabled.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    // -- Configuration --

    /// Returns the host view.
    #[must_use]
    pub fn host(&self) -> ViewId {
        self.host
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Returns the attached component.
    #[must_use]
    pub fn component(&self) -> Option<&Rc<dyn Provider>> {
        self.component.as_ref()
    }

    /// Attaches a component and schedules a reload.
    pub fn set_component(&mut self, views: &mut ViewStore, component: Rc<dyn Provider>) {
        self.component = Some(component);
        self.set_needs_reload(views);
    }

    /// Detaches the component and schedules a reload.
    ///
    /// Views stay where they are until a component is attached again.
    pub fn take_component(&mut self, views: &mut ViewStore) -> Option<Rc<dyn Provider>> {
        let component = self.component.take();
        self.set_needs_reload(views);
        component
    }

    /// Returns the engine-wide animator.
    #[must_use]
    pub fn animator(&self) -> &Rc<dyn Animator> {
        &self.animator
    }

    /// Replaces the engine-wide animator and schedules a reload.
    pub fn set_animator(&mut self, views: &mut ViewStore, animator: Rc<dyn Animator>) {
        self.animator = animator;
        self.set_needs_reload(views);
    }

    /// Returns the view that visible views are inserted into, if distinct
    /// from the host.
    #[must_use]
    pub fn content_view(&self) -> Option<ViewId> {
        self.content_view
    }

    /// Replaces the content view.
    ///
    /// The old content view is detached from the host and the new one is
    /// appended to the host's children.
    pub fn set_content_view(&mut self, views: &mut ViewStore, content_view: Option<ViewId>) {
        if let Some(old) = self.content_view.take()
            && views.is_alive(old)
        {
            views.remove_from_parent(old);
        }
        if let Some(new) = content_view {
            views.remove_from_parent(new);
            views.add_child(self.host, new);
        }
        self.content_view = content_view;
    }

    // -- State --

    /// Returns whether a reload is scheduled.
    #[must_use]
    pub fn needs_reload(&self) -> bool {
        self.needs_reload
    }

    /// Returns whether a visible-set reconciliation is scheduled.
    #[must_use]
    pub fn needs_load_cells(&self) -> bool {
        self.needs_load_cells
    }

    /// Returns whether a reload is running.
    #[must_use]
    pub fn is_reloading(&self) -> bool {
        self.is_reloading
    }

    /// Returns whether a reconciliation is running.
    #[must_use]
    pub fn is_loading_cells(&self) -> bool {
        self.is_loading_cells
    }

    /// Returns the number of completed reloads.
    #[must_use]
    pub fn reload_count(&self) -> u64 {
        self.reload_count
    }

    /// Returns whether at least one reload completed.
    #[must_use]
    pub fn has_reloaded(&self) -> bool {
        self.reload_count > 0
    }

    /// Returns the current layout pass result.
    #[must_use]
    pub fn renderer(&self) -> Option<&Rc<dyn Renderer>> {
        self.renderer.as_ref()
    }

    /// Returns the effective keys of the visible items.
    #[must_use]
    pub fn visible_keys(&self) -> &[String] {
        &self.visible_keys
    }

    /// Returns the view data of the visible items.
    #[must_use]
    pub fn visible_view_data(&self) -> &[ViewData] {
        &self.visible_view_data
    }

    /// Returns the live views of the visible items.
    #[must_use]
    pub fn visible_views(&self) -> &[ViewId] {
        &self.visible_views
    }

    /// Returns the live view bound to the effective key `key`.
    #[must_use]
    pub fn view_for_key(&self, key: &str) -> Option<ViewId> {
        self.visible_keys
            .iter()
            .position(|k| k == key)
            .map(|i| self.visible_views[i])
    }

    /// Returns the host bounds recorded by the last reconciliation.
    #[must_use]
    pub fn last_load_bounds(&self) -> Rect {
        self.last_load_bounds
    }

    /// Returns the scroll offset change applied by the last reload.
    #[must_use]
    pub fn content_offset_change(&self) -> Vec2 {
        self.content_offset_change
    }

    /// Returns the content size (renderer size times zoom scale).
    #[must_use]
    pub fn content_size(&self) -> Size {
        self.content_size
    }

    // -- Scheduling --

    /// Schedules a reload and asks the host for a layout pass.
    pub fn set_needs_reload(&mut self, views: &mut ViewStore) {
        self.needs_reload = true;
        views.set_needs_layout(self.host);
    }

    /// Schedules a reconciliation and asks the host for a layout pass.
    pub fn set_needs_load_cells(&mut self, views: &mut ViewStore) {
        self.needs_load_cells = true;
        views.set_needs_layout(self.host);
    }

    /// Drops the current renderer and schedules a reconciliation, which will
    /// lay the component out again.
    pub fn set_needs_invalidate_layout(&mut self, views: &mut ViewStore) {
        self.renderer = None;
        self.set_needs_load_cells(views);
    }

    /// Adopts a component together with a renderer computed elsewhere.
    ///
    /// The next reload skips layout and reconciles against `renderer`.
    pub fn update_with_existing(
        &mut self,
        views: &mut ViewStore,
        component: Rc<dyn Provider>,
        renderer: Rc<dyn Renderer>,
    ) {
        self.set_component(views, component);
        self.renderer = Some(renderer);
        self.skip_layout = true;
    }

    /// Returns the size the component would occupy within `size`.
    #[must_use]
    pub fn size_that_fits(&self, size: Size) -> Size {
        self.component
            .as_ref()
            .map_or(Size::ZERO, |c| c.layout(Constraint::new(size)).size())
    }

    // -- Passes --

    /// Runs the work the host's current state calls for.
    ///
    /// A scheduled reload wins. Otherwise a size change relays out and any
    /// other bounds change (scrolling) or a scheduled reconciliation only
    /// reconciles. Afterwards the content view is sized to the content and
    /// centered.
    pub fn layout_subviews(&mut self, views: &mut ViewStore, pool: &mut ReusePool) {
        let bounds = views.bounds(self.host);
        if self.needs_reload {
            self.reload_data(views, pool);
        } else if bounds.size() != self.last_load_bounds.size() {
            self.invalidate_layout(views, pool);
        } else if bounds != self.last_load_bounds || self.needs_load_cells {
            self.load_cells(views, pool);
        }
        self.place_content_view(views, self.content_size);
    }

    /// Centers the content view within the host's inset bounds, per the
    /// configuration, on axes where it is smaller.
    pub fn ensure_content_centered(&self, views: &mut ViewStore) {
        if let Some(content_view) = self.content_view {
            self.place_content_view(views, views.frame(content_view).size());
        }
    }

    fn place_content_view(&self, views: &mut ViewStore, size: Size) {
        let Some(content_view) = self.content_view else {
            return;
        };
        let available = self.adjusted_size(views);
        let x = if self.config.center_content_horizontally && size.width < available.width {
            (available.width - size.width) * 0.5
        } else {
            0.0
        };
        let y = if self.config.center_content_vertically && size.height < available.height {
            (available.height - size.height) * 0.5
        } else {
            0.0
        };
        let frame = Rect::from_origin_size(Point::new(x, y), size);
        if views.frame(content_view) != frame {
            views.set_frame(content_view, frame);
        }
    }

    /// Lays the component out again and reconciles the visible set.
    ///
    /// Does nothing without a component or while a reload is running.
    pub fn reload_data(&mut self, views: &mut ViewStore, pool: &mut ReusePool) {
        self.reload(views, pool, |_, _| None);
    }

    /// Like [`reload_data`](Self::reload_data), but moves the scroll offset
    /// to the point returned by `adjust_offset` after layout.
    ///
    /// Views that stay visible receive a `shift` hook with the resulting
    /// offset change.
    pub fn reload_data_with(
        &mut self,
        views: &mut ViewStore,
        pool: &mut ReusePool,
        adjust_offset: impl FnOnce(&Self, &ViewStore) -> Point,
    ) {
        self.reload(views, pool, |engine, views| {
            Some(adjust_offset(engine, views))
        });
    }

    /// Lays the component out again without refreshing the content of views
    /// that stay visible.
    ///
    /// Does nothing while a pass is running or before the first reload.
    pub fn invalidate_layout(&mut self, views: &mut ViewStore, pool: &mut ReusePool) {
        if self.is_loading_cells || self.is_reloading {
            self.tracer
                .skip(EngineOp::InvalidateLayout, SkipReason::Reentrant);
            return;
        }
        if !self.has_reloaded() {
            self.tracer
                .skip(EngineOp::InvalidateLayout, SkipReason::NotLoaded);
            return;
        }
        self.renderer = None;
        self.load_cells(views, pool);
    }

    fn reload(
        &mut self,
        views: &mut ViewStore,
        pool: &mut ReusePool,
        adjust_offset: impl FnOnce(&Self, &ViewStore) -> Option<Point>,
    ) {
        let Some(component) = self.component.clone() else {
            self.tracer.skip(EngineOp::Reload, SkipReason::NoComponent);
            return;
        };
        if self.is_reloading {
            self.tracer.skip(EngineOp::Reload, SkipReason::Reentrant);
            return;
        }
        self.is_reloading = true;

        if !self.skip_layout {
            let constraint = self.layout_constraint(views);
            let renderer = component.layout(constraint);
            let content_size = renderer.size() * self.zoom_scale(views);
            self.renderer = Some(renderer);
            self.update_content_size(views, content_size);

            let old_offset = self.content_offset(views);
            if let Some(offset) = adjust_offset(self, views) {
                views.set_bounds_origin(self.host, offset);
            }
            self.content_offset_change = self.content_offset(views) - old_offset;
            self.tracer.reload(&ReloadEvent {
                reload_count: self.reload_count + 1,
                constraint_max: constraint.max,
                content_size,
                offset_change: self.content_offset_change,
            });
        }

        self.load_cells(views, pool);

        self.reload_count += 1;
        self.needs_reload = false;
        self.is_reloading = false;
        self.skip_layout = false;
    }

    /// Reconciles the visible set against the current renderer, laying the
    /// component out first if there is none.
    ///
    /// Does nothing without a component or while a reconciliation is
    /// running.
    pub fn load_cells(&mut self, views: &mut ViewStore, pool: &mut ReusePool) {
        let Some(component) = self.component.clone() else {
            self.tracer.skip(EngineOp::LoadCells, SkipReason::NoComponent);
            return;
        };
        if self.is_loading_cells {
            self.tracer.skip(EngineOp::LoadCells, SkipReason::Reentrant);
            return;
        }
        self.is_loading_cells = true;

        let renderer = match &self.renderer {
            Some(renderer) => Rc::clone(renderer),
            None => {
                let renderer = component.layout(self.layout_constraint(views));
                self.renderer = Some(Rc::clone(&renderer));
                let content_size = renderer.size() * self.zoom_scale(views);
                self.update_content_size(views, content_size);
                renderer
            }
        };

        let animator = Rc::clone(&self.animator);
        self.with_cx(views, pool, |cx| animator.will_update(cx));

        let bounds = views.bounds(self.host);
        let visible_rect = match self.content_view {
            Some(content_view) => views.convert_rect(bounds, self.host, content_view),
            None => bounds,
        };
        let new_data = renderer.views(visible_rect);
        // Some renderers resize themselves while answering a visibility query.
        let content_size = renderer.size() * self.zoom_scale(views);
        self.update_content_size(views, content_size);

        let (new_keys, key_index) = effective_keys(&new_data);

        // The previous pass stays readable from hooks until the new one is
        // stored below.
        let mut slots: Vec<Option<ViewId>> = alloc::vec![None; new_data.len()];
        let mut retired = Vec::new();
        let previous = self
            .visible_keys
            .iter()
            .zip(&self.visible_view_data)
            .zip(&self.visible_views);
        for ((key, data), &view) in previous {
            if let Some(&index) = key_index.get(key) {
                slots[index] = Some(view);
            } else {
                retired.push((view, self.animator_for(data), data.frame));
            }
        }
        let deleted = retired.len();
        let carried = self.visible_views.len() - deleted;
        for (view, animator, frame) in retired {
            self.with_cx(views, pool, |cx| animator.delete(cx, view, frame));
            pool.enqueue(views, view);
        }

        let reloading = self.is_reloading;
        let mut new_views = Vec::with_capacity(new_data.len());
        let mut inserted = 0;
        for (index, (data, slot)) in new_data.iter().zip(slots).enumerate() {
            let animator = self.animator_for(data);
            let frame = data.frame;
            let view = match slot {
                Some(view) => {
                    if reloading {
                        data.provider.update_view(views, view);
                        let delta = self.content_offset_change;
                        self.with_cx(views, pool, |cx| animator.shift(cx, delta, view, frame));
                    }
                    view
                }
                None => {
                    let view = data.provider.make_view(views, pool);
                    data.provider.update_view(views, view);
                    views.set_size(view, frame.size());
                    views.set_center(view, frame.center());
                    self.with_cx(views, pool, |cx| animator.insert(cx, view, frame));
                    inserted += 1;
                    view
                }
            };
            self.with_cx(views, pool, |cx| animator.update(cx, view, frame));
            let parent = self.content_view.unwrap_or(self.host);
            views.insert_child_at(parent, view, index);
            new_views.push(view);
        }

        self.tracer.load_cells(&LoadCellsEvent {
            visible_rect,
            visible: new_data.len(),
            inserted,
            deleted,
            carried,
            reloading,
        });

        self.visible_keys = new_keys;
        self.visible_view_data = new_data;
        self.visible_views = new_views;
        self.last_load_bounds = views.bounds(self.host);

        self.needs_load_cells = false;
        self.is_loading_cells = false;
    }

    // -- Host queries --

    fn content_offset(&self, views: &ViewStore) -> Point {
        views.bounds(self.host).origin()
    }

    fn layout_constraint(&self, views: &ViewStore) -> Constraint {
        let inset = views.scroll_metrics(self.host).content_inset;
        Constraint::new(views.bounds(self.host).size()).inset(inset)
    }

    fn adjusted_size(&self, views: &ViewStore) -> Size {
        self.layout_constraint(views).max
    }

    fn zoom_scale(&self, views: &ViewStore) -> f64 {
        views.scroll_metrics(self.host).zoom_scale
    }

    fn update_content_size(&mut self, views: &mut ViewStore, size: Size) {
        if size == self.content_size {
            return;
        }
        self.tracer.content_size(self.content_size, size);
        self.content_size = size;
        views.set_content_size(self.host, size);
    }

    fn animator_for(&self, data: &ViewData) -> Rc<dyn Animator> {
        data.animator
            .clone()
            .unwrap_or_else(|| Rc::clone(&self.animator))
    }

    fn with_cx(
        &mut self,
        views: &mut ViewStore,
        pool: &mut ReusePool,
        hook: impl FnOnce(&mut HostCx<'_>),
    ) {
        hook(&mut HostCx {
            engine: self,
            views,
            pool,
        });
    }
}

/// Assigns every item a unique key: the first claim of a declared key keeps
/// it, later claims get the smallest numeric suffix (from 1) not yet taken.
fn effective_keys(data: &[ViewData]) -> (Vec<String>, BTreeMap<String, usize>) {
    let mut keys = Vec::with_capacity(data.len());
    let mut index = BTreeMap::new();
    for (i, item) in data.iter().enumerate() {
        let mut key = item.key.clone();
        let mut count = 1_u64;
        while index.contains_key(&key) {
            key = alloc::format!("{}{count}", item.key);
            count += 1;
        }
        index.insert(key.clone(), i);
        keys.push(key);
    }
    (keys, index)
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    use kurbo::Insets;

    use super::*;
    use crate::provider::{Container, Space, ViewAdapter};

    #[derive(Debug, Default)]
    struct Row {
        refreshed: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Hook {
        WillUpdate,
        Insert(ViewId, Rect),
        Update(ViewId, Rect),
        Delete(ViewId),
        Shift(ViewId, Vec2),
    }

    #[derive(Default)]
    struct RecordingAnimator {
        log: Rc<RefCell<Vec<Hook>>>,
    }

    impl Animator for RecordingAnimator {
        fn will_update(&self, _cx: &mut HostCx<'_>) {
            self.log.borrow_mut().push(Hook::WillUpdate);
        }
        fn insert(&self, _cx: &mut HostCx<'_>, view: ViewId, frame: Rect) {
            self.log.borrow_mut().push(Hook::Insert(view, frame));
        }
        fn update(&self, cx: &mut HostCx<'_>, view: ViewId, frame: Rect) {
            self.log.borrow_mut().push(Hook::Update(view, frame));
            DefaultAnimator.update(cx, view, frame);
        }
        fn delete(&self, _cx: &mut HostCx<'_>, view: ViewId, _frame: Rect) {
            self.log.borrow_mut().push(Hook::Delete(view));
        }
        fn shift(&self, _cx: &mut HostCx<'_>, delta: Vec2, view: ViewId, _frame: Rect) {
            self.log.borrow_mut().push(Hook::Shift(view, delta));
        }
    }

    struct Harness {
        views: ViewStore,
        pool: ReusePool,
        host: ViewId,
        engine: Engine,
        log: Rc<RefCell<Vec<Hook>>>,
    }

    impl Harness {
        fn new(size: Size) -> Self {
            let mut views = ViewStore::new();
            let host = views.create_view();
            views.set_frame(host, Rect::from_origin_size(Point::ZERO, size));
            let mut engine = Engine::new(host);
            let log = Rc::new(RefCell::new(Vec::new()));
            engine.set_animator(
                &mut views,
                Rc::new(RecordingAnimator {
                    log: Rc::clone(&log),
                }),
            );
            Self {
                views,
                pool: ReusePool::new(),
                host,
                engine,
                log,
            }
        }

        fn set_component(&mut self, component: impl Provider + 'static) {
            self.engine.set_component(&mut self.views, Rc::new(component));
        }

        fn layout(&mut self) {
            self.engine.layout_subviews(&mut self.views, &mut self.pool);
        }

        fn scroll_to(&mut self, y: f64) {
            self.views.set_bounds_origin(self.host, Point::new(0.0, y));
        }

        fn take_log(&self) -> Vec<Hook> {
            core::mem::take(&mut *self.log.borrow_mut())
        }

        fn keys(&self) -> Vec<&str> {
            self.engine.visible_keys().iter().map(String::as_str).collect()
        }
    }

    fn row(key: &str, height: f64) -> ViewAdapter<Row> {
        ViewAdapter::with_key(key)
            .size(Size::new(320.0, height))
            .update(|row: &mut Row| row.refreshed += 1)
    }

    fn list(keys: &[&str], height: f64) -> Container {
        Container::column(0.0).children(keys.iter().map(|k| row(k, height)))
    }

    fn count(log: &[Hook], pred: impl Fn(&Hook) -> bool) -> usize {
        log.iter().filter(|h| pred(h)).count()
    }

    #[test]
    fn duplicate_keys_get_numeric_suffixes() {
        let mut h = Harness::new(Size::new(320.0, 480.0));
        h.set_component(list(&["a", "a", "a", "b"], 50.0));
        h.layout();
        assert_eq!(h.keys(), vec!["a", "a1", "a2", "b"]);
    }

    #[test]
    fn suffixes_skip_declared_keys() {
        let mut h = Harness::new(Size::new(320.0, 480.0));
        h.set_component(list(&["a1", "a", "a"], 50.0));
        h.layout();
        assert_eq!(h.keys(), vec!["a1", "a", "a2"]);
    }

    #[test]
    fn scrolling_carries_over_identity() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        h.set_component(list(&["A", "B", "C", "D"], 100.0));
        h.layout();
        assert_eq!(h.keys(), vec!["A", "B", "C"]);
        let a = h.engine.view_for_key("A").unwrap();
        let b = h.engine.view_for_key("B").unwrap();
        let c = h.engine.view_for_key("C").unwrap();
        h.take_log();

        h.scroll_to(100.0);
        h.layout();
        assert_eq!(h.keys(), vec!["B", "C", "D"]);
        assert_eq!(h.engine.view_for_key("B"), Some(b));
        assert_eq!(h.engine.view_for_key("C"), Some(c));
        let d = h.engine.view_for_key("D").unwrap();

        let log = h.take_log();
        assert_eq!(count(&log, |e| matches!(e, Hook::Delete(_))), 1);
        assert!(log.contains(&Hook::Delete(a)));
        assert_eq!(count(&log, |e| matches!(e, Hook::Insert(..))), 1);
        assert!(log.contains(&Hook::Insert(d, Rect::new(0.0, 300.0, 320.0, 400.0))));
        assert!(!log.iter().any(|e| matches!(e, Hook::Shift(..))));
        // The retired view is dequeued for the new key.
        assert_eq!(d, a);
        assert_eq!(h.engine.reload_count(), 1);
    }

    #[test]
    fn visible_views_are_ordered_children_of_the_host() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        h.set_component(list(&["A", "B", "C", "D"], 100.0));
        h.layout();
        h.scroll_to(100.0);
        h.layout();
        let children: Vec<ViewId> = h.views.children(h.host).collect();
        assert_eq!(children, h.engine.visible_views());
        assert_eq!(
            h.views.frame(h.engine.visible_views()[0]),
            Rect::new(0.0, 100.0, 320.0, 200.0)
        );
    }

    #[test]
    fn unchanged_load_cells_only_updates() {
        let mut h = Harness::new(Size::new(320.0, 480.0));
        h.set_component(Container::column(0.0).child(
            ViewAdapter::<Row>::with_key("x").size(Size::new(10.0, 10.0)),
        ));
        h.layout();
        let x = h.engine.view_for_key("x").unwrap();
        h.take_log();

        h.engine.load_cells(&mut h.views, &mut h.pool);
        assert_eq!(
            h.take_log(),
            vec![
                Hook::WillUpdate,
                Hook::Update(x, Rect::new(0.0, 0.0, 10.0, 10.0))
            ]
        );
    }

    #[test]
    fn reload_refreshes_and_shifts_carried_views() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        h.set_component(list(&["A", "B", "C", "D", "E"], 100.0));
        h.layout();
        let b = h.engine.view_for_key("B").unwrap();
        assert_eq!(h.views.content::<Row>(b).map(|r| r.refreshed), Some(1));
        h.take_log();

        h.engine
            .reload_data_with(&mut h.views, &mut h.pool, |_, _| Point::new(0.0, 50.0));
        assert_eq!(h.engine.content_offset_change(), Vec2::new(0.0, 50.0));
        assert_eq!(h.keys(), vec!["A", "B", "C", "D"]);
        assert_eq!(h.views.content::<Row>(b).map(|r| r.refreshed), Some(2));
        let log = h.take_log();
        assert_eq!(count(&log, |e| matches!(e, Hook::Shift(..))), 3);
        assert!(log.contains(&Hook::Shift(b, Vec2::new(0.0, 50.0))));
        assert_eq!(h.engine.reload_count(), 2);
    }

    #[test]
    fn scrolling_does_not_refresh_carried_views() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        h.set_component(list(&["A", "B", "C", "D"], 100.0));
        h.layout();
        let b = h.engine.view_for_key("B").unwrap();
        h.scroll_to(50.0);
        h.layout();
        assert_eq!(h.views.content::<Row>(b).map(|r| r.refreshed), Some(1));
    }

    struct ReentrantAnimator {
        nested_reloads: Rc<Cell<u32>>,
    }

    impl Animator for ReentrantAnimator {
        fn insert(&self, cx: &mut HostCx<'_>, _view: ViewId, _frame: Rect) {
            let before = cx.engine.reload_count();
            cx.engine.reload_data(cx.views, cx.pool);
            cx.engine.load_cells(cx.views, cx.pool);
            cx.engine.invalidate_layout(cx.views, cx.pool);
            if cx.engine.reload_count() == before {
                self.nested_reloads.set(self.nested_reloads.get() + 1);
            }
        }
    }

    #[test]
    fn nested_passes_from_hooks_are_dropped() {
        let mut h = Harness::new(Size::new(320.0, 480.0));
        let dropped = Rc::new(Cell::new(0));
        h.engine.set_animator(
            &mut h.views,
            Rc::new(ReentrantAnimator {
                nested_reloads: Rc::clone(&dropped),
            }),
        );
        h.set_component(list(&["a", "b"], 50.0));
        h.layout();

        assert_eq!(dropped.get(), 2, "every nested call was a no-op");
        assert_eq!(h.engine.reload_count(), 1);
        assert_eq!(h.engine.visible_views().len(), 2);
        assert_eq!(h.views.children(h.host).count(), 2);
        assert!(!h.engine.is_reloading());
        assert!(!h.engine.is_loading_cells());
    }

    #[test]
    fn content_size_scales_with_zoom() {
        let mut h = Harness::new(Size::new(320.0, 480.0));
        h.views.set_zoom_scale(h.host, 2.0);
        h.set_component(Space::new(Size::new(100.0, 300.0)));
        h.engine.reload_data(&mut h.views, &mut h.pool);
        assert_eq!(h.engine.content_size(), Size::new(200.0, 600.0));
        assert_eq!(
            h.views.scroll_metrics(h.host).content_size,
            Size::new(200.0, 600.0)
        );
        assert!(h.engine.visible_views().is_empty());
    }

    #[test]
    fn content_size_change_reaches_presenters() {
        let mut h = Harness::new(Size::new(320.0, 480.0));
        let _ = h.views.evaluate();
        h.set_component(Space::new(Size::new(100.0, 300.0)));
        h.layout();
        let changes = h.views.evaluate();
        assert!(changes.scroll.contains(&h.host.index()));
    }

    #[test]
    fn layout_is_constrained_by_insets() {
        let mut h = Harness::new(Size::new(320.0, 480.0));
        h.views
            .set_content_inset(h.host, Insets::new(10.0, 20.0, 10.0, 0.0));
        h.set_component(ViewAdapter::<Row>::with_key("fill"));
        h.layout();
        assert_eq!(h.engine.content_size(), Size::new(300.0, 460.0));
    }

    #[test]
    fn dispatch_follows_bounds_changes() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        h.set_component(list(&["A", "B", "C", "D"], 100.0));
        assert!(h.engine.needs_reload());
        h.layout();
        assert_eq!(h.engine.reload_count(), 1);
        assert!(!h.engine.needs_reload());
        let first = Rc::clone(h.engine.renderer().unwrap());

        // Pure scroll: reconcile against the same renderer.
        h.scroll_to(40.0);
        h.layout();
        assert_eq!(h.engine.reload_count(), 1);
        assert!(Rc::ptr_eq(&first, h.engine.renderer().unwrap()));
        assert_eq!(h.engine.last_load_bounds().origin(), Point::new(0.0, 40.0));

        // Resize: relayout without a reload.
        h.views.set_size(h.host, Size::new(320.0, 400.0));
        h.layout();
        assert_eq!(h.engine.reload_count(), 1);
        assert!(!Rc::ptr_eq(&first, h.engine.renderer().unwrap()));

        // Nothing changed: nothing runs.
        h.take_log();
        h.layout();
        assert!(h.take_log().is_empty());

        // Scheduled reconciliation.
        h.engine.set_needs_load_cells(&mut h.views);
        h.layout();
        assert!(h.take_log().contains(&Hook::WillUpdate));
        assert!(!h.engine.needs_load_cells());

        h.engine.set_needs_reload(&mut h.views);
        h.layout();
        assert_eq!(h.engine.reload_count(), 2);
    }

    #[test]
    fn set_needs_invalidate_layout_drops_renderer() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        h.set_component(list(&["A"], 100.0));
        h.layout();
        let _ = h.views.evaluate();
        h.engine.set_needs_invalidate_layout(&mut h.views);
        assert!(h.engine.renderer().is_none());
        assert!(h.views.evaluate().layout_requests.contains(&h.host.index()));
        h.layout();
        assert!(h.engine.renderer().is_some());
        assert_eq!(h.engine.reload_count(), 1);
    }

    #[test]
    fn without_component_nothing_happens() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        h.engine.reload_data(&mut h.views, &mut h.pool);
        h.engine.load_cells(&mut h.views, &mut h.pool);
        assert!(h.engine.needs_reload(), "skipped reloads stay scheduled");
        assert_eq!(h.engine.reload_count(), 0);
        assert!(h.take_log().is_empty());
        assert_eq!(h.engine.size_that_fits(Size::new(10.0, 10.0)), Size::ZERO);
    }

    #[test]
    fn invalidate_layout_requires_a_reload() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        h.set_component(list(&["A"], 100.0));
        h.engine.invalidate_layout(&mut h.views, &mut h.pool);
        assert!(h.engine.renderer().is_none());
        assert!(h.engine.visible_views().is_empty());
    }

    struct Growing {
        height: Rc<Cell<f64>>,
    }

    struct GrowingRenderer {
        height: Rc<Cell<f64>>,
    }

    impl Provider for Growing {
        fn layout(&self, _constraint: Constraint) -> Rc<dyn Renderer> {
            Rc::new(GrowingRenderer {
                height: Rc::clone(&self.height),
            })
        }
    }

    impl Renderer for GrowingRenderer {
        fn size(&self) -> Size {
            Size::new(320.0, self.height.get())
        }

        fn views(&self, rect: Rect) -> Vec<ViewData> {
            self.height.set(self.height.get().max(rect.y1 + 100.0));
            Vec::new()
        }
    }

    #[test]
    fn lazily_resized_renderers_update_content_size() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        h.set_component(Growing {
            height: Rc::new(Cell::new(0.0)),
        });
        h.layout();
        assert_eq!(h.engine.content_size(), Size::new(320.0, 400.0));

        h.scroll_to(200.0);
        h.layout();
        assert_eq!(h.engine.content_size(), Size::new(320.0, 600.0));
    }

    #[test]
    fn content_view_hosts_cells_and_is_centered() {
        let mut h = Harness::new(Size::new(320.0, 480.0));
        let content = h.views.create_view();
        h.engine.set_content_view(&mut h.views, Some(content));
        assert_eq!(h.views.parent(content), Some(h.host));

        h.set_component(
            Container::column(0.0)
                .child(ViewAdapter::<Row>::with_key("a").size(Size::new(100.0, 100.0)))
                .child(ViewAdapter::<Row>::with_key("b").size(Size::new(100.0, 200.0))),
        );
        h.layout();
        assert_eq!(h.engine.content_size(), Size::new(100.0, 300.0));
        assert_eq!(h.views.frame(content), Rect::new(110.0, 0.0, 210.0, 300.0));
        assert_eq!(h.views.children(content).count(), 2);

        h.engine.set_config(EngineConfig::centered());
        h.engine.ensure_content_centered(&mut h.views);
        assert_eq!(h.views.frame(content), Rect::new(110.0, 90.0, 210.0, 390.0));

        h.engine.set_content_view(&mut h.views, None);
        assert_eq!(h.views.parent(content), None);
    }

    #[test]
    fn update_with_existing_skips_layout() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        let component: Rc<dyn Provider> = Rc::new(list(&["A", "B"], 100.0));
        let renderer = component.layout(Constraint::new(Size::new(320.0, 300.0)));
        h.engine
            .update_with_existing(&mut h.views, Rc::clone(&component), Rc::clone(&renderer));
        h.layout();
        assert!(Rc::ptr_eq(&renderer, h.engine.renderer().unwrap()));
        assert_eq!(h.keys(), vec!["A", "B"]);
        assert_eq!(h.engine.content_size(), Size::new(320.0, 200.0));

        h.engine.reload_data(&mut h.views, &mut h.pool);
        assert!(!Rc::ptr_eq(&renderer, h.engine.renderer().unwrap()));
    }

    #[test]
    fn size_that_fits_lays_out_the_component() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        h.set_component(list(&["A", "B"], 100.0));
        assert_eq!(
            h.engine.size_that_fits(Size::new(400.0, f64::INFINITY)),
            Size::new(320.0, 200.0)
        );
    }

    #[test]
    fn item_animator_overrides_engine_animator() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        let item_log = Rc::new(RefCell::new(Vec::new()));
        let item_animator: Rc<dyn Animator> = Rc::new(RecordingAnimator {
            log: Rc::clone(&item_log),
        });
        h.set_component(
            Container::column(0.0)
                .child(row("plain", 50.0))
                .child(row("special", 50.0).animator(item_animator)),
        );
        h.layout();
        let special = h.engine.view_for_key("special").unwrap();
        assert!(
            item_log
                .borrow()
                .iter()
                .all(|e| matches!(e, Hook::Insert(v, _) | Hook::Update(v, _) if *v == special))
        );
        assert_eq!(item_log.borrow().len(), 2);
        assert_eq!(count(&h.take_log(), |e| matches!(e, Hook::Insert(..))), 1);
    }

    #[test]
    fn removed_items_are_pooled() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        h.set_component(list(&["A", "B"], 100.0));
        h.layout();
        let b = h.engine.view_for_key("B").unwrap();

        h.set_component(list(&["A"], 100.0));
        h.layout();
        assert_eq!(h.keys(), vec!["A"]);
        assert_eq!(h.views.parent(b), None);
        assert_eq!(h.pool.queued(core::any::type_name::<Row>()), 1);
        assert!(h.take_log().contains(&Hook::Delete(b)));
    }

    #[test]
    fn views_made_without_reuse_are_freed_when_scrolled_away() {
        let mut h = Harness::new(Size::new(100.0, 100.0));
        h.set_component(Container::column(0.0).children((0..100).map(|i| {
            ViewAdapter::<Row>::with_key(alloc::format!("row-{i}"))
                .size(Size::new(100.0, 50.0))
                .without_reuse()
        })));
        h.layout();
        for step in 1..=90 {
            h.scroll_to(f64::from(step) * 50.0);
            h.layout();
        }
        assert_eq!(h.keys(), vec!["row-90", "row-91"]);
        assert_eq!(h.views.roots(), [h.host]);
        assert_eq!(h.views.children(h.host).count(), 2);
    }

    struct VisibleCountAnimator {
        seen: Rc<RefCell<Vec<(&'static str, usize)>>>,
    }

    impl Animator for VisibleCountAnimator {
        fn insert(&self, cx: &mut HostCx<'_>, _view: ViewId, _frame: Rect) {
            let count = cx.engine.visible_views().len();
            self.seen.borrow_mut().push(("insert", count));
        }
        fn delete(&self, cx: &mut HostCx<'_>, view: ViewId, _frame: Rect) {
            assert_eq!(cx.engine.view_for_key("A"), Some(view));
            let count = cx.engine.visible_views().len();
            self.seen.borrow_mut().push(("delete", count));
        }
    }

    #[test]
    fn hooks_see_the_previous_visible_set() {
        let mut h = Harness::new(Size::new(320.0, 300.0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        h.engine.set_animator(
            &mut h.views,
            Rc::new(VisibleCountAnimator {
                seen: Rc::clone(&seen),
            }),
        );
        h.set_component(list(&["A", "B", "C", "D"], 100.0));
        h.layout();
        assert_eq!(*seen.borrow(), [("insert", 0); 3]);
        seen.borrow_mut().clear();

        h.scroll_to(100.0);
        h.layout();
        assert_eq!(*seen.borrow(), [("delete", 3), ("insert", 3)]);
        assert_eq!(h.engine.visible_views().len(), 3);
    }

    #[test]
    fn effective_keys_are_unique_and_indexed() {
        let provider: Rc<dyn crate::provider::ViewProvider> =
            Rc::new(ViewAdapter::<Row>::with_key("k"));
        let data: Vec<ViewData> = ["k", "k", "k1"]
            .iter()
            .map(|k| ViewData::new(k.to_string(), Rect::ZERO, Rc::clone(&provider)))
            .collect();
        let (keys, index) = effective_keys(&data);
        assert_eq!(keys, vec!["k", "k1", "k11"]);
        assert_eq!(index["k11"], 2);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn trace_sink_sees_passes() {
        #[derive(Default)]
        struct Counts {
            reloads: Vec<u64>,
            loads: Vec<(usize, usize)>,
        }
        struct Sink(Rc<RefCell<Counts>>);
        impl TraceSink for Sink {
            fn on_reload(&mut self, e: &ReloadEvent) {
                self.0.borrow_mut().reloads.push(e.reload_count);
            }
            fn on_load_cells(&mut self, e: &LoadCellsEvent) {
                self.0.borrow_mut().loads.push((e.inserted, e.deleted));
            }
        }

        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut h = Harness::new(Size::new(320.0, 300.0));
        h.engine.set_trace_sink(Box::new(Sink(Rc::clone(&counts))));
        h.set_component(list(&["A", "B", "C", "D"], 100.0));
        h.layout();
        h.scroll_to(100.0);
        h.layout();
        assert_eq!(counts.borrow().reloads, vec![1]);
        assert_eq!(counts.borrow().loads, vec![(3, 0), (1, 1)]);
    }
}
