use std::borrow::Cow;

use tracing::debug;

use crate::core::{BusConfig, EventBus};
use crate::error::ListenerError;
use crate::events::{Event, PublishArgs, Topic};
use crate::listeners::{Entry, ListenerFn, ListenerRef};

/// Builder for constructing an [`EventBus`] with listeners registered up front.
///
/// Listeners added here are in place before the bus is shared, so no
/// publisher can race ahead of them.
pub struct EventBusBuilder<P> {
    cfg: BusConfig,
    listeners: Vec<(Topic, Entry<P>)>,
}

impl<P> EventBusBuilder<P>
where
    P: Send + Sync + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: BusConfig) -> Self {
        Self {
            cfg,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener on `topic` with the given priority.
    pub fn with_listener(
        mut self,
        topic: impl Into<Topic>,
        listener: ListenerRef<P>,
        priority: i32,
    ) -> Self {
        self.listeners
            .push((topic.into(), Entry::new(listener, priority)));
        self
    }

    /// Sets the ring buffer size of the notice broadcast.
    pub fn with_notice_capacity(mut self, capacity: usize) -> Self {
        self.cfg = self.cfg.with_notice_capacity(capacity);
        self
    }

    /// Registers a named closure as a listener on `topic`.
    pub fn with_fn<F>(
        self,
        topic: impl Into<Topic>,
        priority: i32,
        name: impl Into<Cow<'static, str>>,
        f: F,
    ) -> Self
    where
        F: Fn(&Event<P>, &mut PublishArgs) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let listener: ListenerRef<P> = ListenerFn::arc(name, f);
        self.with_listener(topic, listener, priority)
    }

    /// Builds and returns the bus.
    ///
    /// No worker is started here; topic queues appear on first publish.
    pub fn build(self) -> EventBus<P> {
        debug!(
            listeners = self.listeners.len(),
            queue_capacity = self.cfg.queue_capacity_clamped(),
            "event bus built"
        );
        EventBus::from_parts(self.cfg, self.listeners)
    }
}
