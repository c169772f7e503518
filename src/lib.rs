//! # topicbus
//!
//! **topicbus** is an in-process publish/subscribe event bus for tokio applications.
//!
//! Listeners subscribe to a topic with a priority. Publishing an event hands it
//! to that topic's delivery queue; a dedicated worker per topic runs the
//! listeners one after another, highest priority first, and optionally reports
//! the collected errors back to the publisher.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  Producers                                   Consumers
//!  publish(Event{topic, payload}, done)        subscribe(topic, listener, priority)
//!        │                                              │
//!        ▼                                              ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventBus                                                         │
//! │  - Registry (one lock: topic → queue, topic → sorted listeners)   │
//! │  - Notices (broadcast diagnostics)                                │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   [queue "a.b.c"]    [queue "x.y.z"]    [queue ...]      (bounded, lazily created)
//!        │                  │                  │
//!   worker "a.b.c"     worker "x.y.z"     worker ...       (one task per topic)
//!        │
//!        ├─► listener prio 10 ─► listener prio 5 ─► listener prio 0
//!        │      (panic → ListenerError::Panicked, stop_propagation → break)
//!        ▼
//!   done.send(Vec<ListenerError>)   (only when a completion channel was supplied)
//! ```
//!
//! ### Dispatch
//! ```text
//! publish(event, done)
//!   ├─► empty topic → ignored
//!   ├─► lock: get-or-create queue (+ spawn worker), snapshot listeners
//!   └─► queue.send(delivery).await        ← waits while the queue is full
//!
//! worker loop {
//!   ├─► delivery = queue.recv()           ← waits while the queue is empty
//!   ├─► args = PublishArgs::default()
//!   ├─► for listener in snapshot:
//!   │       ├─ Ok            → continue
//!   │       ├─ Err / panic   → collect, notice
//!   │       └─ args stopped  → break
//!   └─► done.send(errors) | log unobserved errors
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                       |
//! |-------------------|--------------------------------------------------------------|------------------------------------------|
//! | **Bus**           | Subscribe, publish (awaited, fire-and-forget, cancellable).  | [`EventBus`], [`EventBusBuilder`]        |
//! | **Listeners**     | Async trait or closure, ordered by priority.                 | [`Listener`], [`ListenerFn`]             |
//! | **Events**        | Topic + shared payload, per-dispatch control flags.          | [`Event`], [`Topic`], [`PublishArgs`]    |
//! | **Diagnostics**   | Broadcast notices about failures, panics and shutdown.       | [`Notice`], [`NoticeKind`]               |
//! | **Errors**        | Typed errors for listeners and bus operations.               | [`ListenerError`], [`BusError`]          |
//! | **Configuration** | Queue capacity, default priority, shutdown grace.            | [`BusConfig`]                            |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use topicbus::{BusConfig, Event, EventBus, ListenerError};
//!
//! #[derive(Debug)]
//! struct UserCreated {
//!     id: u64,
//!     email: String,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus: EventBus<UserCreated> = EventBus::new(BusConfig::default());
//!     let welcomed = Arc::new(AtomicU64::new(0));
//!
//!     let w = Arc::clone(&welcomed);
//!     bus.subscribe_fn("auth.user.created", 10, "validate_email", move |ev, args| {
//!         if !ev.payload.email.contains('@') {
//!             args.stop_propagation();
//!             return Err(ListenerError::fail("invalid email"));
//!         }
//!         w.store(ev.payload.id, Ordering::SeqCst);
//!         Ok(())
//!     })
//!     .await;
//!
//!     let ev = Event::new("auth.user.created", UserCreated { id: 42, email: "a@b.c".into() });
//!     let errors = bus.publish_and_wait(ev).await?;
//!
//!     assert!(errors.is_empty());
//!     assert_eq!(welcomed.load(Ordering::SeqCst), 42);
//!
//!     bus.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod listeners;

// ---- Public re-exports ----

pub use crate::core::{
    BusConfig, Completion, DEFAULT_PRIORITY, DEFAULT_QUEUE_CAPACITY, EventBus, EventBusBuilder,
};
pub use error::{BusError, ListenerError};
pub use events::{Event, Notice, NoticeKind, PublishArgs, Topic};
pub use listeners::{Listener, ListenerFn, ListenerId, ListenerRef};
