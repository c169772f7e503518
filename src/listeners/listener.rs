//! # Core listener trait
//!
//! `Listener` is the extension point for reacting to events on a topic. All
//! listeners of one topic are driven by that topic's worker, one after the
//! other, in descending priority.
//!
//! ## Contract
//! - A slow listener delays the listeners after it **on the same topic**;
//!   other topics are unaffected.
//! - Returning `Err` does not stop the dispatch. Call
//!   [`PublishArgs::stop_propagation`] to skip the remaining listeners.
//! - Panics are caught and reported as [`ListenerError::Panicked`].
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use topicbus::{Event, Listener, ListenerError, PublishArgs};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Listener<String> for Audit {
//!     async fn on_event(&self, ev: &Event<String>, _args: &mut PublishArgs) -> Result<(), ListenerError> {
//!         // write audit record...
//!         let _ = ev.payload.len();
//!         Ok(())
//!     }
//!     fn name(&self) -> &str { "audit" }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::events::{Event, PublishArgs};

/// Contract for event listeners.
///
/// Called from the topic's dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Listener<P>: Send + Sync + 'static {
    /// Handle a single event.
    ///
    /// # Parameters
    /// - `event`: the event; its payload is shared with the other listeners
    /// - `args`: control flags for this dispatch
    async fn on_event(
        &self,
        event: &Event<P>,
        args: &mut PublishArgs,
    ) -> Result<(), ListenerError>;

    /// Human-readable name (for logs and notices).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a listener.
pub type ListenerRef<P> = Arc<dyn Listener<P>>;
