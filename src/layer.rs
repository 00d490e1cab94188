//! Tracing integration for the file sink
//!
//! [`SinkLayer`] is a `tracing-subscriber` layer that converts every event
//! into a [`LogRecord`] and hands it to a [`Sink`]. Event metadata maps
//! into the record context: the target fills the function slot, source
//! file and line are carried when the macro site provides them, and a
//! `category` event field lands in the category slot (a leading digit
//! there replaces the computed timestamp, see
//! [`format_line`](crate::record::format_line)). The `message` field
//! becomes the record text; any remaining fields are appended to it as
//! `key=value` pairs.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::record::{LogRecord, RecordContext, Severity, Sink};

/// Layer that forwards every event to a [`Sink`]
pub struct SinkLayer {
    sink: Arc<dyn Sink>,
}

impl SinkLayer {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self { sink }
    }
}

impl<S> Layer<S> for SinkLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let EventVisitor {
            message,
            fields,
            category,
        } = visitor;
        let text = if fields.is_empty() {
            message
        } else if message.is_empty() {
            fields
        } else {
            format!("{message} {fields}")
        };
        let category = category.unwrap_or_default();

        self.sink.write(&LogRecord {
            severity: Severity::from(*metadata.level()),
            context: RecordContext {
                function: metadata.target(),
                file: metadata.file().unwrap_or_default(),
                line: metadata.line().unwrap_or(0),
                category: &category,
            },
            text: &text,
        });
    }
}

/// Visitor that pulls the message and the optional `category` field out of
/// an event; remaining fields accumulate as `key=value` pairs
#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: String,
    category: Option<String>,
}

impl EventVisitor {
    fn push_pair(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "category" => self.category = Some(value.to_string()),
            name => self.push_pair(name, format_args!("{value}")),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "category" => self.category = Some(format!("{value:?}")),
            name => self.push_pair(name, format_args!("{value:?}")),
        }
    }
}
