//! # Diagnostics emitted by the bus about its own behavior.
//!
//! The [`NoticeKind`] enum classifies notices across three categories:
//! - **Registration notices**: topics and listeners coming and going
//! - **Dispatch notices**: listener failures, panics, halted propagation
//! - **Shutdown notices**: drain progress and grace outcome
//!
//! The [`Notice`] struct carries additional metadata such as timestamps,
//! topic, listener name and reasons.
//!
//! ## Example
//! ```rust
//! use topicbus::{Notice, NoticeKind};
//!
//! let n = Notice::new(NoticeKind::ListenerFailed)
//!     .with_topic("auth.user.created")
//!     .with_listener("mailer")
//!     .with_reason("smtp down");
//!
//! assert_eq!(n.kind, NoticeKind::ListenerFailed);
//! assert_eq!(n.listener.as_deref(), Some("mailer"));
//! assert_eq!(n.reason.as_deref(), Some("smtp down"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::error::ListenerError;
use crate::events::Topic;

/// Global sequence counter for notice ordering.
static NOTICE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of bus notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    // === Registration ===
    /// First publish on a topic created its queue and worker.
    ///
    /// Sets: `topic`
    TopicRegistered,

    /// A listener was attached to a topic.
    ///
    /// Sets: `topic`, `listener`
    ListenerAdded,

    /// A listener was detached (explicitly or by its cancellation token).
    ///
    /// Sets: `topic`, `listener`
    ListenerRemoved,

    // === Dispatch ===
    /// A listener returned an error.
    ///
    /// Sets: `topic`, `listener`, `reason`
    ListenerFailed,

    /// A listener panicked; the panic was contained.
    ///
    /// Sets: `topic`, `listener`, `reason` (panic message)
    ListenerPanicked,

    /// A listener stopped propagation; remaining listeners were skipped.
    ///
    /// Sets: `topic`, `listener`
    PropagationStopped,

    // === Shutdown ===
    /// Shutdown requested; the bus stopped accepting events.
    ShutdownRequested,

    /// All topic workers drained within the grace period.
    AllDrainedWithin,

    /// Grace period exceeded; stuck workers were aborted.
    ///
    /// Sets: `reason` (stuck topics)
    GraceExceeded,
}

/// Bus notice with optional metadata.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Notice classification.
    pub kind: NoticeKind,
    /// Topic, if applicable.
    pub topic: Option<Topic>,
    /// Listener name, if applicable.
    pub listener: Option<Arc<str>>,
    /// Human-readable reason (errors, panic payloads, etc.).
    pub reason: Option<Arc<str>>,
}

impl Notice {
    /// Creates a new notice of the given kind with current timestamp and next sequence number.
    pub fn new(kind: NoticeKind) -> Self {
        Self {
            seq: NOTICE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            topic: None,
            listener: None,
            reason: None,
        }
    }

    /// Attaches a topic.
    #[inline]
    pub fn with_topic(mut self, topic: impl Into<Topic>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Attaches a listener name.
    #[inline]
    pub fn with_listener(mut self, listener: impl Into<Arc<str>>) -> Self {
        self.listener = Some(listener.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates the notice matching a collected listener error.
    pub fn listener_error(topic: &Topic, listener: &Arc<str>, err: &ListenerError) -> Self {
        let (kind, reason) = match err {
            ListenerError::Panicked { info, .. } => (NoticeKind::ListenerPanicked, info.clone()),
            ListenerError::Failed { error } => (NoticeKind::ListenerFailed, error.clone()),
        };
        Notice::new(kind)
            .with_topic(topic)
            .with_listener(Arc::clone(listener))
            .with_reason(reason)
    }

    /// Returns `true` for [`NoticeKind::ListenerPanicked`].
    #[inline]
    pub fn is_listener_panic(&self) -> bool {
        matches!(self.kind, NoticeKind::ListenerPanicked)
    }
}
