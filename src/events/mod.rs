//! Events, per-dispatch flags and bus notices.
//!
//! ## Contents
//! - [`Event`], [`Topic`] what publishers send and listeners receive
//! - [`PublishArgs`] mutable control flags for one dispatch
//! - [`NoticeKind`], [`Notice`] diagnostics about the bus itself
//! - [`Notices`] thin wrapper over `tokio::sync::broadcast` for notices
//!
//! ## Quick reference
//! - **Notice publishers**: topic workers (failures, panics, halted propagation),
//!   the registry (topic/listener registration) and `EventBus::shutdown`.
//! - **Notice consumers**: anything holding `EventBus::notices()`.

mod args;
mod event;
mod notice;
mod notices;

pub use args::PublishArgs;
pub use event::{Event, Topic};
pub use notice::{Notice, NoticeKind};
pub(crate) use notices::Notices;
