#![forbid(unsafe_code)]

//! The `roller.propagate` span emitted around change notification.
//!
//! Run:
//!   cargo test -p roller-reactive --test tracing_propagate_span

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use roller_reactive::{Observable, TwoWayBinding};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone, Default)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Default)]
struct FieldVisitor {
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{value:?}"));
    }
}

/// Spans in creation order, with fields recorded after creation merged in.
#[derive(Clone, Default)]
struct Capture {
    spans: Arc<Mutex<Vec<(u64, CapturedSpan)>>>,
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        _ctx: Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        self.spans.lock().expect("span lock").push((
            id.into_u64(),
            CapturedSpan {
                name: attrs.metadata().name().to_string(),
                fields: visitor.fields,
            },
        ));
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        _ctx: Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor::default();
        values.record(&mut visitor);
        let mut spans = self.spans.lock().expect("span lock");
        if let Some((_, span)) = spans.iter_mut().rev().find(|(key, _)| *key == id.into_u64()) {
            span.fields.extend(visitor.fields);
        }
    }
}

fn propagate_spans(run: impl FnOnce()) -> Vec<CapturedSpan> {
    let layer = Capture::default();
    let handle = layer.clone();
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, run);
    let spans = handle.spans.lock().expect("span lock").clone();
    spans
        .into_iter()
        .map(|(_, span)| span)
        .filter(|span| span.name == "roller.propagate")
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn propagation_span_reports_subscribers_and_duration() {
    let spans = propagate_spans(|| {
        let obs = Observable::new(0);
        let _a = obs.subscribe(|_| {});
        let _b = obs.subscribe(|_| {});
        obs.set(1);
    });

    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.fields.get("subscribers").map(String::as_str), Some("2"));
    let duration = span
        .fields
        .get("duration_us")
        .expect("duration recorded when propagation ends");
    assert!(duration.parse::<u64>().is_ok());
}

#[test]
fn unchanged_write_and_unobserved_change_open_no_span() {
    let spans = propagate_spans(|| {
        let watched = Observable::new(5);
        let _watch = watched.subscribe(|_| {});
        watched.set(5);

        let unwatched = Observable::new(0);
        unwatched.set(1);
    });

    assert!(spans.is_empty());
}

#[test]
fn bound_write_opens_one_span_per_notifying_side() {
    let spans = propagate_spans(|| {
        let a = Observable::new(0);
        let b = Observable::new(0);
        let _binding = TwoWayBinding::new(&a, &b);
        a.set(3);
    });

    // `a` notifies the binding, which writes `b`, which notifies the binding
    // again (dropped by the guard).
    assert_eq!(spans.len(), 2);
    assert!(
        spans
            .iter()
            .all(|span| span.fields.get("subscribers").map(String::as_str) == Some("1"))
    );
}
