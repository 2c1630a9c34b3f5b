#![forbid(unsafe_code)]

//! Test support shared by the Plume crates.
//!
//! [`with_captured_tracing`] runs a closure under a subscriber that records
//! every span opened and every event emitted, with their fields rendered
//! as strings.
//!
//! ```ignore
//! let handle = with_captured_tracing(|| {
//!     tree.apply(TreeOperation::Add { button }).expect("add");
//! });
//! assert!(handle.spans().iter().any(|span| span.name == "tree.apply"));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub name: String,
    pub fields: HashMap<String, String>,
}

impl CapturedSpan {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

type Shared<T> = Arc<Mutex<Vec<T>>>;

/// Spans and events recorded by [`with_captured_tracing`].
#[derive(Debug, Default)]
pub struct CaptureHandle {
    spans: Shared<CapturedSpan>,
    events: Shared<CapturedEvent>,
}

impl CaptureHandle {
    #[must_use]
    pub fn spans(&self) -> Vec<CapturedSpan> {
        snapshot(&self.spans)
    }

    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        snapshot(&self.events)
    }

    /// First span named `name`.
    #[must_use]
    pub fn span(&self, name: &str) -> Option<CapturedSpan> {
        self.spans().into_iter().find(|span| span.name == name)
    }
}

fn snapshot<T: Clone>(shared: &Shared<T>) -> Vec<T> {
    shared.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

fn push<T>(shared: &Shared<T>, item: T) {
    shared.lock().unwrap_or_else(PoisonError::into_inner).push(item);
}

struct FieldVisitor(Vec<(String, String)>);

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

struct SpanCapture {
    spans: Shared<CapturedSpan>,
    events: Shared<CapturedEvent>,
}

impl<S> tracing_subscriber::Layer<S> for SpanCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        push(
            &self.spans,
            CapturedSpan {
                name: attrs.metadata().name().to_string(),
                fields: visitor.0.into_iter().collect(),
            },
        );
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        push(
            &self.events,
            CapturedEvent {
                fields: visitor.0.into_iter().collect(),
            },
        );
    }
}

/// Run `f` with a capturing subscriber as the thread default.
pub fn with_captured_tracing<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let handle = CaptureHandle::default();
    let layer = SpanCapture {
        spans: Arc::clone(&handle.spans),
        events: Arc::clone(&handle.events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    handle
}
