//! Structured logging emitted while keyboard adjustments settle.
//!
//! Verifies that settlement runs inside a `keyboard.settle` span carrying the
//! resolved overlap and strategy name, that decisions are logged at DEBUG
//! under the `cscroll.keyboard` target, and that the normal flow emits no
//! warnings.
//!
//! Run:
//!   cargo test -p cscroll-runtime --test tracing_settle_span

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cscroll_core::geometry::{Point, Rect};
use cscroll_core::KeyboardEvent;
use cscroll_runtime::{
    EventBus, HeadlessHost, KeyboardConfig, KeyboardVisibilityCoordinator, ManualScheduler,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
    parent_span_name: Option<String>,
}

impl CapturedEvent {
    fn message(&self) -> Option<&str> {
        self.fields.get("message").map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    level: tracing::Level,
    fields: HashMap<String, String>,
}

#[derive(Default, Clone)]
struct Captured {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
}

impl Captured {
    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn spans_named(&self, name: &str) -> Vec<CapturedSpan> {
        self.spans
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

struct CaptureLayer(Captured);

impl<S> tracing_subscriber::Layer<S> for CaptureLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.0.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            level: *attrs.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let parent_span_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span| span.name().to_string());
        self.0.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
            parent_span_name,
        });
    }
}

fn with_captured<F: FnOnce()>(f: F) -> Captured {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(CaptureLayer(captured.clone()));
    tracing::subscriber::with_default(subscriber, f);
    captured
}

fn run_show_then_hide() {
    let host = Rc::new(RefCell::new(HeadlessHost::fullscreen(
        Rect::from_size(390.0, 800.0),
        20.0,
    )));
    let scheduler = Rc::new(ManualScheduler::new());
    let bus = Rc::new(EventBus::new());
    let coordinator =
        KeyboardVisibilityCoordinator::new(&host, scheduler.clone(), KeyboardConfig::default());
    coordinator.attach(bus.clone());

    bus.post(KeyboardEvent::will_show(Rect::from_size(390.0, 300.0)));
    scheduler.advance(Duration::from_millis(150));
    bus.post(KeyboardEvent::will_hide(Rect::from_size(390.0, 300.0)));
    scheduler.advance(Duration::from_millis(150));
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn settle_span_records_overlap_and_strategy() {
    let captured = with_captured(run_show_then_hide);
    let spans = captured.spans_named("keyboard.settle");

    assert_eq!(spans.len(), 2, "one span per settlement: {spans:?}");
    assert!(spans.iter().all(|s| s.level == tracing::Level::DEBUG));
    assert_eq!(spans[0].fields.get("overlap").map(String::as_str), Some("280"));
    assert_eq!(spans[1].fields.get("overlap").map(String::as_str), Some("0"));
    assert_eq!(
        spans[0].fields.get("strategy").map(String::as_str),
        Some("ResizeSafeArea")
    );
}

#[test]
fn applied_adjustment_is_logged_inside_settle_span() {
    let captured = with_captured(run_show_then_hide);
    let applied: Vec<_> = captured
        .events()
        .into_iter()
        .filter(|e| e.message() == Some("keyboard adjustment applied"))
        .collect();

    assert_eq!(applied.len(), 2);
    for event in &applied {
        assert_eq!(event.level, tracing::Level::DEBUG);
        assert_eq!(event.target, "cscroll.keyboard");
        assert_eq!(event.parent_span_name.as_deref(), Some("keyboard.settle"));
    }
    assert_eq!(applied[0].fields.get("adjusting").map(String::as_str), Some("true"));
    assert_eq!(applied[1].fields.get("adjusting").map(String::as_str), Some("false"));
}

#[test]
fn queued_events_log_keyboard_height() {
    let captured = with_captured(run_show_then_hide);
    let queued: Vec<_> = captured
        .events()
        .into_iter()
        .filter(|e| e.message() == Some("keyboard event queued"))
        .collect();

    assert_eq!(queued.len(), 2);
    assert_eq!(queued[0].fields.get("keyboard_height").map(String::as_str), Some("300"));
    assert_eq!(queued[1].fields.get("keyboard_height").map(String::as_str), Some("0"));
}

#[test]
fn normal_flow_emits_no_warnings() {
    let captured = with_captured(run_show_then_hide);
    let warnings: Vec<_> = captured
        .events()
        .into_iter()
        .filter(|e| e.level <= tracing::Level::WARN)
        .collect();
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
}

#[test]
fn missing_window_is_traced_not_warned() {
    let captured = with_captured(|| {
        let host = Rc::new(RefCell::new(HeadlessHost::default()));
        let scheduler = Rc::new(ManualScheduler::new());
        let coordinator =
            KeyboardVisibilityCoordinator::new(&host, scheduler, KeyboardConfig::default());
        coordinator.handle_event(&KeyboardEvent::will_show(Rect::from_size(390.0, 300.0)));
    });

    let events = captured.events();
    assert!(events.iter().any(|e| e.level == tracing::Level::TRACE
        && e.message() == Some("view not in a window; ignoring keyboard event")));
    assert!(events.iter().all(|e| e.level > tracing::Level::WARN));
}

#[test]
fn size_transition_end_traces_initial_offset() {
    let captured = with_captured(|| {
        let mut host = HeadlessHost::fullscreen(Rect::from_size(390.0, 800.0), 20.0);
        host.scroll_metrics.content_offset = Point::new(0.0, 240.0);
        let host = Rc::new(RefCell::new(host));
        let scheduler = Rc::new(ManualScheduler::new());
        let coordinator =
            KeyboardVisibilityCoordinator::new(&host, scheduler, KeyboardConfig::default());
        let transition = coordinator.begin_size_transition();
        coordinator.end_size_transition(transition);
    });

    let finished: Vec<_> = captured
        .events()
        .into_iter()
        .filter(|e| e.message() == Some("size transition finished"))
        .collect();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].level, tracing::Level::TRACE);
    assert_eq!(
        finished[0].fields.get("initial_offset_y").map(String::as_str),
        Some("240")
    );
}
