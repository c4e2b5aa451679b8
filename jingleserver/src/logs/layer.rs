// logs/layer.rs
use std::{fmt, time::SystemTime};

use tracing::{
    Event, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{Layer, layer::Context};

use super::{LogEntry, LogState};

/// Couche tracing qui alimente le buffer mémoire et le canal SSE
pub struct LogLayer {
    state: LogState,
}

impl LogLayer {
    pub fn new(state: LogState) -> Self {
        Self { state }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn into_message(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.join(" ")
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for LogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        self.state.push(LogEntry {
            timestamp: SystemTime::now(),
            level: meta.level().as_str().to_string(),
            target: meta.target().to_string(),
            message: visitor.into_message(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_events_reach_the_buffer() {
        let state = LogState::new(16);
        let subscriber = tracing_subscriber::registry().with(LogLayer::new(state.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(status = 429, "search failed");
        });

        let entries = state.dump();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, "WARN");
        assert_eq!(entries[0].message, "search failed status=429");
    }
}
