//! # EventBus: priority listeners, per-topic delivery, graceful shutdown.
//!
//! The [`EventBus`] owns the topic registry and the notice channel. Topic
//! queues and their workers are created lazily on the first publish to each
//! topic.
//!
//! ## High-level architecture
//! ```text
//! subscribe(topic, listener, priority)
//!     └──► Registry.attach()  (listeners[topic] re-sorted, descending priority)
//!
//! publish(event, done)
//!     ├─► event.is_zero()       → return Ok(()) (no side effect)
//!     ├─► Registry.route(topic) → sender + snapshot   (queue + worker created on first use)
//!     └─► sender.send(Delivery{event, snapshot, done}).await   (waits while queue is full)
//!
//! worker(topic):
//!     loop delivery:
//!         for listener in snapshot → on_event(&event, &mut args)   (panic → error)
//!         done.send(errors)   (if supplied)
//!
//! shutdown():
//!     Registry.close()  → closed = true, senders dropped
//!     join workers until cfg.grace → AllDrainedWithin | GraceExceeded (stuck workers aborted)
//! ```
//!
//! ## Rules
//! - Listeners of one topic run strictly sequentially, in descending priority;
//!   equal priorities run in registration order.
//! - Different topics are serviced by different workers and run in parallel.
//! - Listener failures never reach the publisher except through the completion channel.
//!
//! ## Example
//! ```rust
//! use std::sync::Mutex;
//! use topicbus::{BusConfig, Event, EventBus};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus: EventBus<Mutex<Vec<&'static str>>> = EventBus::new(BusConfig::default());
//!
//!     bus.subscribe_fn("t", 1, "one", |ev, _| {
//!         ev.payload.lock().unwrap().push("1");
//!         Ok(())
//!     })
//!     .await;
//!     bus.subscribe_fn("t", 2, "two", |ev, _| {
//!         ev.payload.lock().unwrap().push("2");
//!         Ok(())
//!     })
//!     .await;
//!
//!     let ev = Event::new("t", Mutex::new(Vec::new()));
//!     let payload = ev.payload.clone();
//!     let errors = bus.publish_and_wait(ev).await?;
//!
//!     assert!(errors.is_empty());
//!     assert_eq!(*payload.lock().unwrap(), ["2", "1"]);
//!     bus.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::core::builder::EventBusBuilder;
use crate::core::config::BusConfig;
use crate::core::registry::{Completion, Delivery, Registry};
use crate::error::{BusError, ListenerError};
use crate::events::{Event, Notice, NoticeKind, Notices, PublishArgs, Topic};
use crate::listeners::{Entry, ListenerFn, ListenerId, ListenerRef};

struct Inner<P> {
    cfg: BusConfig,
    registry: Registry<P>,
    notices: Notices,
    stopped: CancellationToken,
}

impl<P> Drop for Inner<P> {
    fn drop(&mut self) {
        self.stopped.cancel();
    }
}

/// In-process publish/subscribe bus for payloads of type `P`.
///
/// Cheap to clone: every clone is a handle to the same bus. Create one at
/// startup and pass it to the collaborators that publish or subscribe.
///
/// When the last handle is dropped, topic workers finish what is queued and exit.
pub struct EventBus<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for EventBus<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("cfg", &self.inner.cfg)
            .finish_non_exhaustive()
    }
}

impl<P> EventBus<P>
where
    P: Send + Sync + 'static,
{
    /// Creates a bus with no listeners.
    pub fn new(cfg: BusConfig) -> Self {
        Self::builder(cfg).build()
    }

    /// Returns a builder that can register listeners before the bus is shared.
    pub fn builder(cfg: BusConfig) -> EventBusBuilder<P> {
        EventBusBuilder::new(cfg)
    }

    pub(crate) fn from_parts(cfg: BusConfig, listeners: Vec<(Topic, Entry<P>)>) -> Self {
        let notices = Notices::new(cfg.notice_capacity_clamped());
        let registry = Registry::new(cfg.queue_capacity_clamped(), notices.clone(), listeners);
        Self {
            inner: Arc::new(Inner {
                cfg,
                registry,
                notices,
                stopped: CancellationToken::new(),
            }),
        }
    }

    /// Returns the configuration the bus was built with.
    pub fn config(&self) -> &BusConfig {
        &self.inner.cfg
    }

    /// Registers `listener` on `topic` with the given priority (higher runs first).
    ///
    /// Registering the same listener twice is allowed and results in two invocations.
    /// Events already enqueued keep the listener list they were enqueued with.
    pub async fn subscribe(
        &self,
        topic: impl Into<Topic>,
        listener: ListenerRef<P>,
        priority: i32,
    ) -> ListenerId {
        self.inner
            .registry
            .attach(topic.into(), Entry::new(listener, priority))
            .await
    }

    /// Registers `listener` with [`BusConfig::default_priority`].
    pub async fn subscribe_default(
        &self,
        topic: impl Into<Topic>,
        listener: ListenerRef<P>,
    ) -> ListenerId {
        let priority = self.inner.cfg.default_priority;
        self.subscribe(topic, listener, priority).await
    }

    /// Registers a closure as a listener; `name` shows up in logs and notices.
    pub async fn subscribe_fn<F>(
        &self,
        topic: impl Into<Topic>,
        priority: i32,
        name: impl Into<Cow<'static, str>>,
        f: F,
    ) -> ListenerId
    where
        F: Fn(&Event<P>, &mut PublishArgs) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let listener: ListenerRef<P> = ListenerFn::arc(name, f);
        self.subscribe(topic, listener, priority).await
    }

    /// Registers `listener` until `token` is cancelled, then removes it.
    ///
    /// The removal runs on a background task that holds only a weak handle to
    /// the bus. It exits when the token fires, on [`shutdown`](Self::shutdown),
    /// or once the last bus handle is dropped.
    pub async fn subscribe_until(
        &self,
        topic: impl Into<Topic>,
        listener: ListenerRef<P>,
        priority: i32,
        token: CancellationToken,
    ) -> ListenerId {
        let id = self.subscribe(topic, listener, priority).await;
        let weak = Arc::downgrade(&self.inner);
        let stopped = self.inner.stopped.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = stopped.cancelled() => {}
                _ = token.cancelled() => {
                    if let Some(inner) = weak.upgrade() {
                        inner.registry.detach(id).await;
                    }
                }
            }
        });
        id
    }

    /// Removes one registration. Returns `false` if `id` is not registered.
    pub async fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.registry.detach(id).await
    }

    /// Enqueues `event` for asynchronous dispatch.
    ///
    /// - Events with an empty topic are ignored (`Ok(())`, `done` is dropped).
    /// - Waits while the topic's queue is full.
    /// - If `done` is given, it receives the collected listener errors once
    ///   the dispatch finishes; `None` is fire-and-forget.
    pub async fn publish(&self, event: Event<P>, done: Option<Completion>) -> Result<(), BusError> {
        let Some((sender, delivery)) = self.prepare(event, done).await? else {
            return Ok(());
        };
        sender.send(delivery).await.map_err(|_| BusError::Closed)
    }

    /// Like [`publish`](Self::publish) but never waits for queue space.
    ///
    /// Returns [`BusError::QueueFull`] if the topic's queue is at capacity.
    pub async fn try_publish(
        &self,
        event: Event<P>,
        done: Option<Completion>,
    ) -> Result<(), BusError> {
        let Some((sender, delivery)) = self.prepare(event, done).await? else {
            return Ok(());
        };
        match sender.try_send(delivery) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(rejected)) => Err(BusError::QueueFull {
                topic: rejected.event.topic,
            }),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(BusError::Closed),
        }
    }

    /// Like [`publish`](Self::publish) but gives up with [`BusError::Cancelled`]
    /// if `token` fires before the event is admitted to the queue.
    pub async fn publish_cancellable(
        &self,
        event: Event<P>,
        done: Option<Completion>,
        token: &CancellationToken,
    ) -> Result<(), BusError> {
        if token.is_cancelled() {
            return Err(BusError::Cancelled);
        }
        let Some((sender, delivery)) = self.prepare(event, done).await? else {
            return Ok(());
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(BusError::Cancelled),
            res = sender.send(delivery) => res.map_err(|_| BusError::Closed),
        }
    }

    /// Publishes `event` and waits for its dispatch to finish.
    ///
    /// Returns the errors collected from listeners (empty if all succeeded or
    /// nobody listens). Events with an empty topic return an empty list.
    pub async fn publish_and_wait(&self, event: Event<P>) -> Result<Vec<ListenerError>, BusError> {
        if event.is_zero() {
            return Ok(Vec::new());
        }
        let (tx, rx) = oneshot::channel();
        self.publish(event, Some(tx)).await?;
        rx.await.map_err(|_| BusError::Dropped)
    }

    /// Returns a receiver of bus notices published from now on.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    /// Number of listeners currently registered on `topic`.
    pub async fn listener_count(&self, topic: &str) -> usize {
        self.inner.registry.listener_count(topic).await
    }

    /// Sorted topics that have a delivery queue (i.e. were published to).
    pub async fn topics(&self) -> Vec<Topic> {
        self.inner.registry.topics().await
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    pub async fn is_closed(&self) -> bool {
        self.inner.registry.is_closed().await
    }

    /// Stops accepting events, drains every topic queue and joins the workers.
    ///
    /// Waits up to [`BusConfig::grace`]. Workers still running after that are
    /// aborted and reported in [`BusError::GraceExceeded`]. Calling it again
    /// returns `Ok(())` immediately.
    pub async fn shutdown(&self) -> Result<(), BusError> {
        self.inner.stopped.cancel();
        let Some(workers) = self.inner.registry.close().await else {
            return Ok(());
        };
        let grace = self.inner.cfg.grace;

        info!(topics = workers.len(), ?grace, "event bus shutting down");
        self.inner
            .notices
            .publish(Notice::new(NoticeKind::ShutdownRequested));

        let deadline = Instant::now() + grace;
        let mut stuck = Vec::new();
        for (topic, mut worker) in workers {
            match time::timeout_at(deadline, &mut worker).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!(topic = %topic, error = %join_err, "topic worker ended abnormally");
                }
                Err(_elapsed) => {
                    worker.abort();
                    stuck.push(topic.to_string());
                }
            }
        }

        if stuck.is_empty() {
            info!("all topic workers drained");
            self.inner
                .notices
                .publish(Notice::new(NoticeKind::AllDrainedWithin));
            Ok(())
        } else {
            warn!(?stuck, ?grace, "grace exceeded; aborted stuck topic workers");
            self.inner.notices.publish(
                Notice::new(NoticeKind::GraceExceeded).with_reason(stuck.join(",")),
            );
            Err(BusError::GraceExceeded { grace, stuck })
        }
    }

    /// Resolves the topic's queue and builds the delivery; `None` for zero events.
    async fn prepare(
        &self,
        event: Event<P>,
        done: Option<Completion>,
    ) -> Result<Option<(mpsc::Sender<Delivery<P>>, Delivery<P>)>, BusError> {
        if event.is_zero() {
            trace!(seq = event.seq, "ignoring event without topic");
            return Ok(None);
        }
        let (sender, listeners) = self.inner.registry.route(&event.topic).await?;
        debug!(topic = %event.topic, seq = event.seq, listeners = listeners.len(), "event enqueued");
        Ok(Some((
            sender,
            Delivery {
                event,
                listeners,
                done,
            },
        )))
    }
}
