//! # Topic registry: delivery queues and listener lists under one lock.
//!
//! ## Architecture
//! ```text
//! subscribe(topic, l, prio) ──► attach()  ──► listeners[topic] = sorted(old + l)
//! unsubscribe(id)           ──► detach()  ──► listeners[topic] = old - id
//! publish(event)            ──► route()   ──► queues[topic] (lazily created + worker spawned)
//!                                             + snapshot of listeners[topic]
//! shutdown()                ──► close()   ──► closed = true, queues drained, senders dropped
//! ```
//!
//! ## Rules
//! - One `Mutex` guards both maps; it is never held while waiting for queue space
//!   or while listeners run.
//! - Listener lists are copy-on-write `Arc<[Entry]>`: a snapshot is an `Arc` clone,
//!   so already-enqueued deliveries are unaffected by later (un)subscribes.
//! - Queues are created on first publish and live until `close()`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::core::worker;
use crate::error::{BusError, ListenerError};
use crate::events::{Event, Notice, NoticeKind, Notices, Topic};
use crate::listeners::{Entries, Entry, ListenerId, with_entry, without_entry};

/// Completion channel: receives the errors collected for one publish.
pub type Completion = oneshot::Sender<Vec<ListenerError>>;

/// One pending dispatch.
pub(crate) struct Delivery<P> {
    pub(crate) event: Event<P>,
    pub(crate) listeners: Entries<P>,
    pub(crate) done: Option<Completion>,
}

/// Delivery queue of one topic.
struct TopicQueue<P> {
    sender: mpsc::Sender<Delivery<P>>,
    worker: JoinHandle<()>,
}

struct State<P> {
    closed: bool,
    queues: HashMap<Topic, TopicQueue<P>>,
    listeners: HashMap<Topic, Entries<P>>,
}

/// Lock-protected routing table of the bus.
pub(crate) struct Registry<P> {
    state: Mutex<State<P>>,
    queue_capacity: usize,
    notices: Notices,
}

impl<P> Registry<P>
where
    P: Send + Sync + 'static,
{
    /// Creates a registry, pre-populated with `initial` registrations.
    pub(crate) fn new(
        queue_capacity: usize,
        notices: Notices,
        initial: Vec<(Topic, Entry<P>)>,
    ) -> Self {
        let mut listeners: HashMap<Topic, Entries<P>> = HashMap::new();
        for (topic, entry) in initial {
            let next = with_entry(listeners.get(&topic), entry);
            listeners.insert(topic, next);
        }
        Self {
            state: Mutex::new(State {
                closed: false,
                queues: HashMap::new(),
                listeners,
            }),
            queue_capacity: queue_capacity.max(1),
            notices,
        }
    }

    /// Adds `entry` to `topic` and re-sorts the topic's listeners.
    pub(crate) async fn attach(&self, topic: Topic, entry: Entry<P>) -> ListenerId {
        let id = entry.id;
        let name = Arc::clone(&entry.name);
        let priority = entry.priority;
        {
            let mut state = self.state.lock().await;
            let next = with_entry(state.listeners.get(&topic), entry);
            state.listeners.insert(topic.clone(), next);
        }

        debug!(topic = %topic, listener = %name, priority, %id, "listener attached");
        self.notices.publish(
            Notice::new(NoticeKind::ListenerAdded)
                .with_topic(topic)
                .with_listener(name),
        );
        id
    }

    /// Removes the registration `id`. Returns `false` if it is unknown.
    pub(crate) async fn detach(&self, id: ListenerId) -> bool {
        let removed = {
            let mut state = self.state.lock().await;
            let found = state.listeners.iter().find_map(|(topic, list)| {
                without_entry(list, id).map(|(rest, entry)| (topic.clone(), rest, entry))
            });
            found.map(|(topic, rest, entry)| {
                if rest.is_empty() {
                    state.listeners.remove(&topic);
                } else {
                    state.listeners.insert(topic.clone(), rest);
                }
                (topic, entry.name)
            })
        };

        match removed {
            Some((topic, name)) => {
                debug!(topic = %topic, listener = %name, %id, "listener detached");
                self.notices.publish(
                    Notice::new(NoticeKind::ListenerRemoved)
                        .with_topic(topic)
                        .with_listener(name),
                );
                true
            }
            None => false,
        }
    }

    /// Returns the topic's queue sender (creating queue and worker on first use)
    /// together with a snapshot of its listeners.
    pub(crate) async fn route(
        &self,
        topic: &Topic,
    ) -> Result<(mpsc::Sender<Delivery<P>>, Entries<P>), BusError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.closed {
            return Err(BusError::Closed);
        }

        let listeners = match state.listeners.get(topic) {
            Some(list) => Arc::clone(list),
            None => Vec::new().into(),
        };

        let sender = match state.queues.get(topic) {
            Some(queue) => queue.sender.clone(),
            None => {
                let (tx, rx) = mpsc::channel(self.queue_capacity);
                let worker = worker::spawn(topic.clone(), rx, self.notices.clone());
                state.queues.insert(
                    topic.clone(),
                    TopicQueue {
                        sender: tx.clone(),
                        worker,
                    },
                );
                debug!(topic = %topic, capacity = self.queue_capacity, "topic registered");
                self.notices
                    .publish(Notice::new(NoticeKind::TopicRegistered).with_topic(topic));
                tx
            }
        };
        Ok((sender, listeners))
    }

    /// Marks the registry closed and hands back every worker for joining.
    ///
    /// Dropping the stored senders lets each worker exit once its queue
    /// (and any in-flight publishes holding a sender clone) is drained.
    /// Returns `None` if already closed.
    pub(crate) async fn close(&self) -> Option<Vec<(Topic, JoinHandle<()>)>> {
        let mut state = self.state.lock().await;
        if state.closed {
            return None;
        }
        state.closed = true;

        let mut workers: Vec<(Topic, JoinHandle<()>)> = state
            .queues
            .drain()
            .map(|(topic, queue)| (topic, queue.worker))
            .collect();
        workers.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        Some(workers)
    }

    pub(crate) async fn listener_count(&self, topic: &str) -> usize {
        let state = self.state.lock().await;
        state.listeners.get(topic).map_or(0, |list| list.len())
    }

    /// Returns sorted names of topics that have a delivery queue.
    pub(crate) async fn topics(&self) -> Vec<Topic> {
        let state = self.state.lock().await;
        let mut topics: Vec<Topic> = state.queues.keys().cloned().collect();
        topics.sort_unstable();
        topics
    }

    pub(crate) async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }
}
