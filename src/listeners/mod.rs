//! # Listeners: callbacks reacting to one topic.
//!
//! ## Contents
//! - [`Listener`] async trait implemented by custom listeners
//! - [`ListenerFn`] closure-backed listener
//! - [`ListenerRef`] shared handle (`Arc<dyn Listener<P>>`)
//! - [`ListenerId`] handle for removing a registration

mod entry;
mod listener;
mod listener_fn;

pub(crate) use entry::{Entries, Entry, with_entry, without_entry};
pub use entry::ListenerId;
pub use listener::{Listener, ListenerRef};
pub use listener_fn::ListenerFn;
