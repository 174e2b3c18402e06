//! Span capture for asserting on hub instrumentation.

use std::{
    fmt,
    sync::{Arc, Mutex},
};
use tracing::{
    field::{Field, Visit},
    span::{Attributes, Id, Record},
    subscriber::{set_default, DefaultGuard},
    Subscriber,
};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    Layer,
};

/// A span seen by the collector, with every field recorded on it so far.
#[derive(Debug, Clone)]
pub(crate) struct CapturedSpan {
    pub(crate) name: &'static str,
    pub(crate) target: &'static str,
    pub(crate) fields: Vec<(&'static str, String)>,
}

impl CapturedSpan {
    pub(crate) fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| *field == name)
    }
}

#[derive(Default)]
struct Fields(Vec<(&'static str, String)>);

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push((field.name(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name(), value.to_owned()));
    }
}

/// Layer recording span creation and later `Span::record` calls, keyed by
/// span id.
#[derive(Debug, Clone, Default)]
pub(crate) struct SpanCollector {
    spans: Arc<Mutex<Vec<(Id, CapturedSpan)>>>,
}

impl SpanCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn find_span(&self, name: &str) -> Option<CapturedSpan> {
        self.spans
            .lock()
            .unwrap()
            .iter()
            .map(|(_, span)| span)
            .find(|span| span.name == name)
            .cloned()
    }

    /// Installs the collector for the current thread until the guard drops.
    pub(crate) fn as_default(&self) -> DefaultGuard {
        set_default(tracing_subscriber::registry().with(self.clone()))
    }
}

impl<S> Layer<S> for SpanCollector
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        attrs.record(&mut fields);

        let metadata = attrs.metadata();
        let span = CapturedSpan {
            name: metadata.name(),
            target: metadata.target(),
            fields: fields.0,
        };
        self.spans.lock().unwrap().push((id.clone(), span));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        values.record(&mut fields);

        let mut spans = self.spans.lock().unwrap();
        if let Some((_, span)) = spans.iter_mut().find(|(span_id, _)| span_id == id) {
            span.fields.extend(fields.0);
        }
    }
}
