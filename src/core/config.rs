//! # Event bus configuration.
//!
//! Provides [`BusConfig`] centralized settings for an [`EventBus`](crate::EventBus).
//!
//! ## Sentinel values
//! - `grace = 0s` → shutdown does not wait; unfinished workers are aborted immediately
//! - `queue_capacity = 0` / `notice_capacity = 0` → clamped to 1

use std::time::Duration;

/// Default capacity of each topic's delivery queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default priority used by `subscribe_default`.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Configuration for the event bus.
///
/// ## Field semantics
/// - `queue_capacity`: Per-topic buffer size; `publish` waits when it is full (min 1)
/// - `default_priority`: Priority applied when the caller does not pick one
/// - `grace`: Maximum wait for topic workers to drain on shutdown
/// - `notice_capacity`: Ring buffer size of the notice broadcast (min 1)
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Capacity of each topic's bounded delivery queue.
    ///
    /// This is the backpressure point: once `queue_capacity` records are
    /// pending for a topic, further publishes to it wait (or fail with
    /// `QueueFull` for `try_publish`).
    pub queue_capacity: usize,

    /// Priority given to listeners registered without an explicit one.
    pub default_priority: i32,

    /// Maximum time to wait for graceful shutdown before aborting workers.
    ///
    /// When `EventBus::shutdown` is called:
    /// - New publishes are rejected with `BusError::Closed`
    /// - Workers drain what is already queued
    /// - If draining exceeds `grace`, returns `BusError::GraceExceeded`
    pub grace: Duration,

    /// Capacity of the notice broadcast ring buffer.
    ///
    /// Receivers that lag behind more than `notice_capacity` notices will
    /// receive `Lagged` and skip older items.
    pub notice_capacity: usize,
}

impl BusConfig {
    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Returns the notice capacity clamped to a minimum of 1.
    #[inline]
    pub fn notice_capacity_clamped(&self) -> usize {
        self.notice_capacity.max(1)
    }

    /// Sets the per-topic queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the shutdown grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Sets the notice broadcast capacity.
    pub fn with_notice_capacity(mut self, capacity: usize) -> Self {
        self.notice_capacity = capacity;
        self
    }

    /// Sets the priority used when none is given.
    pub fn with_default_priority(mut self, priority: i32) -> Self {
        self.default_priority = priority;
        self
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `queue_capacity = 100`
    /// - `default_priority = 0`
    /// - `grace = 30s`
    /// - `notice_capacity = 1024`
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            default_priority: DEFAULT_PRIORITY,
            grace: Duration::from_secs(30),
            notice_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = BusConfig::default();
        assert_eq!(cfg.queue_capacity, 100);
        assert_eq!(cfg.default_priority, 0);
        assert_eq!(cfg.grace, Duration::from_secs(30));
        assert_eq!(cfg.notice_capacity, 1024);
    }

    #[test]
    fn test_with_notice_capacity() {
        let cfg = BusConfig::default().with_notice_capacity(16);
        assert_eq!(cfg.notice_capacity_clamped(), 16);
    }

    #[test]
    fn test_capacities_clamped() {
        let cfg = BusConfig::default()
            .with_queue_capacity(0)
            .with_notice_capacity(0);
        assert_eq!(cfg.queue_capacity_clamped(), 1);
        assert_eq!(cfg.notice_capacity_clamped(), 1);
    }
}
