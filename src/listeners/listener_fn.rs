//! # Function-backed listener (`ListenerFn`)
//!
//! [`ListenerFn`] wraps a synchronous closure
//! `F: Fn(&Event<P>, &mut PublishArgs) -> Result<(), ListenerError>`.
//! Any state the closure needs across events must be shared explicitly
//! (`Arc<Mutex<..>>`, atomics).
//!
//! ## Example
//! ```rust
//! use topicbus::{Event, Listener, ListenerError, ListenerFn, ListenerRef, PublishArgs};
//!
//! let l: ListenerRef<u32> = ListenerFn::arc("even-only", |ev: &Event<u32>, args: &mut PublishArgs| -> Result<(), ListenerError> {
//!     if *ev.payload % 2 == 1 {
//!         args.stop_propagation();
//!     }
//!     Ok(())
//! });
//!
//! assert_eq!(l.name(), "even-only");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::events::{Event, PublishArgs};
use crate::listeners::listener::Listener;

/// Function-backed listener implementation.
#[derive(Debug)]
pub struct ListenerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ListenerFn<F> {
    /// Creates a new function-backed listener.
    ///
    /// Prefer [`ListenerFn::arc`] when you immediately need a [`ListenerRef`](crate::ListenerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the listener and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<P, F> Listener<P> for ListenerFn<F>
where
    P: Send + Sync + 'static,
    F: Fn(&Event<P>, &mut PublishArgs) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    async fn on_event(
        &self,
        event: &Event<P>,
        args: &mut PublishArgs,
    ) -> Result<(), ListenerError> {
        (self.f)(event, args)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closure_sees_payload_and_args() {
        let l = ListenerFn::new("check", |ev: &Event<i32>, args: &mut PublishArgs| {
            if *ev.payload < 0 {
                args.stop_propagation();
                return Err(ListenerError::fail("negative"));
            }
            Ok(())
        });

        let mut args = PublishArgs::default();
        assert!(l.on_event(&Event::new("n", 3), &mut args).await.is_ok());
        assert!(!args.is_propagation_stopped());

        let res = l.on_event(&Event::new("n", -1), &mut args).await;
        assert_eq!(res, Err(ListenerError::fail("negative")));
        assert!(args.is_propagation_stopped());
        assert_eq!(Listener::<i32>::name(&l), "check");
    }
}
