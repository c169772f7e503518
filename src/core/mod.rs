//! Bus core: routing, per-topic delivery and lifecycle.
//!
//! The public API from this module is [`EventBus`] (with its builder and
//! configuration); the rest is internal plumbing.
//!
//! Internal modules:
//! - [`registry`]: topic → queue and topic → listeners maps behind one lock;
//! - [`worker`]: per-topic dispatch loop with panic isolation;
//! - [`bus`]: publish/subscribe API and graceful shutdown;
//! - [`builder`]: pre-registration of listeners.

mod builder;
mod bus;
mod config;
mod registry;
mod worker;

pub use builder::EventBusBuilder;
pub use bus::EventBus;
pub use config::{BusConfig, DEFAULT_PRIORITY, DEFAULT_QUEUE_CAPACITY};
pub use registry::Completion;
