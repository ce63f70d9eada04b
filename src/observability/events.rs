//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Server startup begins
    ServerStart,
    /// Configuration loaded
    ConfigLoaded,
    /// Listener bound, ready for requests
    Serving,

    // Document store
    /// A new document version was written
    DocumentCreated,
    /// A blob was left out of a listing
    DocumentSkipped,
    /// No stored document matched an id
    DocumentNotFound,
    /// A write lost the race for its storage key
    KeyConflict,
    /// The backing store failed or timed out
    StoreUnavailable,

    // HTTP
    /// A request was rejected with a client or server error
    RequestFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ServerStart => "SERVER_START",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::Serving => "SERVING",
            Event::DocumentCreated => "DOCUMENT_CREATED",
            Event::DocumentSkipped => "DOCUMENT_SKIPPED",
            Event::DocumentNotFound => "DOCUMENT_NOT_FOUND",
            Event::KeyConflict => "KEY_CONFLICT",
            Event::StoreUnavailable => "STORE_UNAVAILABLE",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    pub fn severity(&self) -> super::Severity {
        use super::Severity;
        match self {
            Event::DocumentSkipped | Event::KeyConflict | Event::DocumentNotFound => Severity::Warn,
            Event::StoreUnavailable | Event::RequestFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::Severity;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::DocumentCreated.as_str(), "DOCUMENT_CREATED");
        assert_eq!(Event::StoreUnavailable.to_string(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::Serving.severity(), Severity::Info);
        assert_eq!(Event::DocumentSkipped.severity(), Severity::Warn);
        assert_eq!(Event::StoreUnavailable.severity(), Severity::Error);
    }
}
