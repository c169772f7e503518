//! # Events published on the bus.
//!
//! An [`Event`] pairs a [`Topic`] with a payload shared through an [`Arc`].
//! Every listener invoked for the event sees the same payload instance, so a
//! payload with interior mutability (`Mutex`, atomics) lets an earlier
//! listener hand data to a later one within the same dispatch.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore publish order across topics when correlating logs.
//!
//! ## Example
//! ```rust
//! use topicbus::{Event, Topic};
//!
//! #[derive(Debug)]
//! struct UserCreated { id: u64 }
//!
//! let ev = Event::new("auth.user.created", UserCreated { id: 7 });
//!
//! assert_eq!(ev.topic, Topic::from("auth.user.created"));
//! assert_eq!(ev.payload.id, 7);
//! assert!(!ev.is_zero());
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Topic identifier, conventionally `<module>.<category>.<action>`.
///
/// Matching is exact string equality; there is no wildcard or prefix matching.
/// Cloning is cheap (`Arc<str>`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(Arc<str>);

impl Topic {
    /// Creates a topic from any string-like value.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the topic as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty topic (the "zero" topic).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Topic {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Topic {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for Topic {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&Topic> for Topic {
    fn from(topic: &Topic) -> Self {
        topic.clone()
    }
}

/// Event carrying a topic and a shared payload.
///
/// - `seq`: monotonic global sequence
/// - `at`: wall-clock timestamp of construction
/// - `topic`: routing key
/// - `payload`: shared with every listener of this event
#[derive(Debug)]
pub struct Event<P> {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Topic the event is routed by.
    pub topic: Topic,
    /// Payload shared between the publisher and all listeners.
    pub payload: Arc<P>,
}

impl<P> Event<P> {
    /// Creates a new event with current timestamp and next sequence number.
    pub fn new(topic: impl Into<Topic>, payload: P) -> Self {
        Self::shared(topic, Arc::new(payload))
    }

    /// Creates an event around a payload the publisher keeps a handle to.
    ///
    /// Useful when the publisher wants to inspect what listeners did to the
    /// payload after awaiting completion.
    pub fn shared(topic: impl Into<Topic>, payload: Arc<P>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            topic: topic.into(),
            payload,
        }
    }

    /// Returns `true` if the event has no topic. Such events are ignored by the bus.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.topic.is_empty()
    }
}

impl<P> Clone for Event<P> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            at: self.at,
            topic: self.topic.clone(),
            payload: Arc::clone(&self.payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new("t", ());
        let b = Event::new("t", ());
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_clone_shares_payload() {
        let ev = Event::new("t", vec![1, 2, 3]);
        let copy = ev.clone();
        assert!(Arc::ptr_eq(&ev.payload, &copy.payload));
        assert_eq!(copy.seq, ev.seq);
    }

    #[test]
    fn test_topic_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(Topic::from("auth.user.created"), 1);
        assert_eq!(map.get("auth.user.created"), Some(&1));
        assert_eq!(map.get("auth.user"), None);
    }

    #[test]
    fn test_empty_topic_is_zero() {
        assert!(Event::new("", 0u8).is_zero());
        assert!(!Event::new(String::from("x"), 0u8).is_zero());
    }
}
