// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scrolls a long list through the reconciliation engine.
//!
//! A thousand rows are laid out once. The host then scrolls down in steps and
//! back up, resizes once, and finally reloads with a new row order. Engine
//! events go to a [`PrettyPrintSink`] on stdout and to a [`RecorderSink`],
//! which is exported as JSON lines at the end. A small presenter mirrors the
//! view store the way a platform backend would.
//!
//! Run with: `cargo run -p scroll_demo`

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use kurbo::{Point, Rect, Size};
use tessera_core::backend::Presenter;
use tessera_core::engine::Engine;
use tessera_core::provider::{Container, ViewAdapter};
use tessera_core::reuse::ReusePool;
use tessera_core::trace::{ContentSizeEvent, LoadCellsEvent, ReloadEvent, SkipEvent, TraceSink};
use tessera_core::view::property::Color;
use tessera_core::view::{ViewChanges, ViewStore};
use tessera_debug::pretty::PrettyPrintSink;
use tessera_debug::recorder::RecorderSink;

const ROW_COUNT: usize = 1000;
const ROW_HEIGHT: f64 = 44.0;
const VIEWPORT: Size = Size::new(375.0, 667.0);
const SCROLL_STEP: f64 = 180.0;
const SCROLL_STEPS: usize = 40;

/// Typed content of a row view.
#[derive(Debug, Default)]
struct Label {
    text: String,
}

/// Forwards every event to two sinks.
struct Tee<A, B>(A, B);

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    fn on_reload(&mut self, e: &ReloadEvent) {
        self.0.on_reload(e);
        self.1.on_reload(e);
    }

    fn on_load_cells(&mut self, e: &LoadCellsEvent) {
        self.0.on_load_cells(e);
        self.1.on_load_cells(e);
    }

    fn on_skip(&mut self, e: &SkipEvent) {
        self.0.on_skip(e);
        self.1.on_skip(e);
    }

    fn on_content_size(&mut self, e: &ContentSizeEvent) {
        self.0.on_content_size(e);
        self.1.on_content_size(e);
    }
}

/// Mirrors the store into a map of "native" views, counting operations.
#[derive(Default)]
struct CountingPresenter {
    native: BTreeMap<u32, Rect>,
    created: usize,
    destroyed: usize,
    moved: usize,
    content_updates: usize,
}

impl Presenter for CountingPresenter {
    fn apply(&mut self, views: &ViewStore, changes: &ViewChanges) {
        for &idx in &changes.removed {
            self.native.remove(&idx);
            self.destroyed += 1;
        }
        self.created += changes.added.len();
        for &idx in &changes.geometry {
            self.native.insert(idx, views.world_frame_at(idx));
            self.moved += 1;
        }
        self.content_updates += changes.content.len();
        for &idx in &changes.scroll {
            let metrics = views.scroll_metrics_at(idx);
            println!(
                "[present] scroll extent of #{idx} is now {:.0}x{:.0}",
                metrics.content_size.width, metrics.content_size.height
            );
        }
    }
}

fn rows(order: impl Iterator<Item = usize>) -> Container {
    Container::column(0.0).children(order.map(|i| {
        let shade: f32 = if i % 2 == 0 { 0.96 } else { 1.0 };
        ViewAdapter::<Label>::with_key(format!("row-{i}"))
            .size(Size::new(VIEWPORT.width, ROW_HEIGHT))
            .background(Color::rgba(shade, shade, shade, 1.0))
            .update(move |label: &mut Label| label.text = format!("Row {i}"))
    }))
}

fn frame(
    engine: &mut Engine,
    views: &mut ViewStore,
    pool: &mut ReusePool,
    presenter: &mut CountingPresenter,
) {
    engine.layout_subviews(views, pool);
    let changes = views.evaluate();
    presenter.apply(views, &changes);
}

fn main() -> std::io::Result<()> {
    let mut views = ViewStore::new();
    let mut pool = ReusePool::new();
    let mut presenter = CountingPresenter::default();

    let host = views.create_view();
    views.set_frame(host, Rect::from_origin_size(Point::ZERO, VIEWPORT));

    let recorder = RecorderSink::new();
    let mut engine = Engine::new(host);
    engine.set_trace_sink(Box::new(Tee(
        PrettyPrintSink::new(Box::new(std::io::stdout())),
        recorder.clone(),
    )));
    engine.set_component(&mut views, Rc::new(rows(0..ROW_COUNT)));
    frame(&mut engine, &mut views, &mut pool, &mut presenter);

    for step in 1..=SCROLL_STEPS {
        views.set_bounds_origin(host, Point::new(0.0, step as f64 * SCROLL_STEP));
        frame(&mut engine, &mut views, &mut pool, &mut presenter);
    }
    for step in (0..SCROLL_STEPS).rev() {
        views.set_bounds_origin(host, Point::new(0.0, step as f64 * SCROLL_STEP));
        frame(&mut engine, &mut views, &mut pool, &mut presenter);
    }

    views.set_size(host, Size::new(VIEWPORT.width, VIEWPORT.height * 1.5));
    frame(&mut engine, &mut views, &mut pool, &mut presenter);

    engine.set_component(&mut views, Rc::new(rows((0..ROW_COUNT).rev())));
    frame(&mut engine, &mut views, &mut pool, &mut presenter);

    let visible = engine.visible_views();
    if let Some(&first) = visible.first() {
        let text = views.content::<Label>(first).map_or("", |l| l.text.as_str());
        println!("first visible row: {text}");
    }
    println!(
        "rows={ROW_COUNT} visible={} live views={} created={} moved={} content updates={} destroyed={}",
        visible.len(),
        presenter.native.len(),
        presenter.created,
        presenter.moved,
        presenter.content_updates,
        presenter.destroyed,
    );

    let path = "scroll_demo_trace.jsonl";
    let mut writer = BufWriter::new(File::create(path)?);
    tessera_debug::json::export(&recorder.events(), &mut writer)?;
    println!("wrote {} events to {path}", recorder.len());
    Ok(())
}
