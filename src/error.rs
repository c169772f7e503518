//! Error types used by the event bus and its listeners.
//!
//! This module defines two main error enums:
//!
//! - [`ListenerError`] — failures collected while dispatching one event.
//! - [`BusError`] — failures returned by bus operations themselves.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;

use thiserror::Error;

use crate::events::Topic;

/// # Errors collected during a single dispatch.
///
/// A dispatch never stops on these: every error is appended to the
/// collection handed back through the completion channel, and the next
/// listener still runs (unless propagation was stopped).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// The listener returned a failure.
    #[error("listener failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The listener panicked; the panic was caught by the topic worker.
    #[error("listener panicked: {info}")]
    Panicked {
        /// Name of the listener that panicked.
        listener: String,
        /// Panic payload rendered as text.
        info: String,
    },
}

impl ListenerError {
    /// Shorthand for [`ListenerError::Failed`].
    ///
    /// # Example
    /// ```
    /// use topicbus::ListenerError;
    ///
    /// let err = ListenerError::fail("mailer unavailable");
    /// assert_eq!(err.to_string(), "listener failed: mailer unavailable");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        ListenerError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Failed { .. } => "listener_failed",
            ListenerError::Panicked { .. } => "listener_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ListenerError::Failed { error } => format!("error: {error}"),
            ListenerError::Panicked { listener, info } => {
                format!("panic in {listener}: {info}")
            }
        }
    }

    /// Indicates whether the error came from a caught panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, ListenerError::Panicked { .. })
    }
}

impl From<String> for ListenerError {
    fn from(error: String) -> Self {
        ListenerError::Failed { error }
    }
}

impl From<&str> for ListenerError {
    fn from(error: &str) -> Self {
        ListenerError::fail(error)
    }
}

/// # Errors produced by the event bus itself.
///
/// These never describe listener behavior; they report why an operation on
/// the bus could not be carried out.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// The bus is shutting down and no longer accepts events.
    #[error("event bus is closed")]
    Closed,

    /// The topic's delivery queue is full (non-blocking publish only).
    #[error("delivery queue for topic {topic} is full")]
    QueueFull {
        /// Topic whose queue rejected the event.
        topic: Topic,
    },

    /// The caller's cancellation token fired while waiting for queue space.
    #[error("publish cancelled")]
    Cancelled,

    /// The completion channel was dropped before the dispatch reported back.
    #[error("dispatch result dropped before completion")]
    Dropped,

    /// Shutdown grace period was exceeded; some topic workers were aborted.
    #[error("shutdown timeout {grace:?} exceeded; stuck topics: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Topics whose workers did not drain in time.
        stuck: Vec<String>,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use topicbus::BusError;
    /// use std::time::Duration;
    ///
    /// let err = BusError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "bus_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::Closed => "bus_closed",
            BusError::QueueFull { .. } => "bus_queue_full",
            BusError::Cancelled => "bus_publish_cancelled",
            BusError::Dropped => "bus_completion_dropped",
            BusError::GraceExceeded { .. } => "bus_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::Closed => "bus closed".to_string(),
            BusError::QueueFull { topic } => format!("queue full: topic={topic}"),
            BusError::Cancelled => "publish cancelled".to_string(),
            BusError::Dropped => "completion dropped".to_string(),
            BusError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck topics={stuck:?}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panicked_message_carries_payload() {
        let err = ListenerError::Panicked {
            listener: "audit".into(),
            info: "boom".into(),
        };
        assert_eq!(err.to_string(), "listener panicked: boom");
        assert_eq!(err.as_message(), "panic in audit: boom");
        assert!(err.is_panic());
    }

    #[test]
    fn test_failed_from_str() {
        let err: ListenerError = "nope".into();
        assert_eq!(err, ListenerError::fail("nope"));
        assert_eq!(err.as_label(), "listener_failed");
        assert!(!err.is_panic());
    }

    #[test]
    fn test_bus_error_labels() {
        let full = BusError::QueueFull {
            topic: Topic::from("auth.user.created"),
        };
        assert_eq!(full.as_label(), "bus_queue_full");
        assert_eq!(full.as_message(), "queue full: topic=auth.user.created");
        assert_eq!(BusError::Closed.as_label(), "bus_closed");
        assert_eq!(BusError::Cancelled.to_string(), "publish cancelled");
    }
}
