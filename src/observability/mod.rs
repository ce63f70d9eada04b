//! Observability for the proforma service
//!
//! Structured JSON logging with typed lifecycle events.
//!
//! ```ignore
//! use proforma::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::DocumentCreated, &[("key", "INV-1--20240101T100000Z.json")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
