//! # Per-topic worker: sequential dispatch with panic isolation.
//!
//! ## Architecture
//! ```text
//! [queue topic] ──► worker ──► for entry in snapshot (descending priority):
//!                                 ├─► entry.listener.on_event(&event, &mut args)
//!                                 │      ├─ Err   → collect, ListenerFailed notice
//!                                 │      └─ panic → collect, ListenerPanicked notice
//!                                 └─► args.is_propagation_stopped() → break
//!                           └──► done.send(errors)   (if a completion channel was given)
//! ```
//!
//! ## Rules
//! - **Sequential**: one delivery at a time; listeners of one event run one after another.
//! - **Isolation**: `catch_unwind` turns a panic into [`ListenerError::Panicked`]; the
//!   worker continues with the next listener and the next delivery.
//! - **Lifetime**: the worker exits once every sender is dropped and the queue is empty.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a listener panics while holding a lock on shared payload state.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::registry::Delivery;
use crate::error::ListenerError;
use crate::events::{Event, Notice, NoticeKind, Notices, PublishArgs, Topic};
use crate::listeners::{Entry, Listener};

/// Spawns the worker servicing `topic`'s queue.
pub(crate) fn spawn<P>(
    topic: Topic,
    mut rx: mpsc::Receiver<Delivery<P>>,
    notices: Notices,
) -> JoinHandle<()>
where
    P: Send + Sync + 'static,
{
    tokio::spawn(async move {
        debug!(topic = %topic, "topic worker started");
        while let Some(delivery) = rx.recv().await {
            dispatch(&topic, delivery, &notices).await;
        }
        debug!(topic = %topic, "topic worker drained");
    })
}

/// Runs one delivery through its listener snapshot and reports the outcome.
pub(crate) async fn dispatch<P>(topic: &Topic, delivery: Delivery<P>, notices: &Notices)
where
    P: Send + Sync + 'static,
{
    let Delivery {
        event,
        listeners,
        done,
    } = delivery;
    let observed = done.is_some();
    let mut args = PublishArgs::default();
    let mut errors = Vec::new();

    for (position, entry) in listeners.iter().enumerate() {
        args.set_position(position);

        if let Err(err) = invoke(entry, &event, &mut args).await {
            if observed {
                debug!(topic = %topic, listener = %entry.name, seq = event.seq, error = %err, "listener error");
            } else {
                warn!(topic = %topic, listener = %entry.name, seq = event.seq, error = %err, "unobserved listener error");
            }
            notices.publish(Notice::listener_error(topic, &entry.name, &err));
            errors.push(err);
        }

        if args.is_propagation_stopped() {
            if position + 1 < listeners.len() {
                debug!(topic = %topic, listener = %entry.name, seq = event.seq, "propagation stopped");
                notices.publish(
                    Notice::new(NoticeKind::PropagationStopped)
                        .with_topic(topic)
                        .with_listener(entry.name.clone()),
                );
            }
            break;
        }
    }

    if let Some(done) = done {
        if done.send(errors).is_err() {
            debug!(topic = %topic, seq = event.seq, "completion receiver dropped");
        }
    }
}

/// Invokes one listener, converting a panic into [`ListenerError::Panicked`].
async fn invoke<P>(
    entry: &Entry<P>,
    event: &Event<P>,
    args: &mut PublishArgs,
) -> Result<(), ListenerError>
where
    P: Send + Sync + 'static,
{
    let call = async { entry.listener.on_event(event, args).await };

    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(res) => res,
        Err(panic_err) => Err(ListenerError::Panicked {
            listener: entry.name.to_string(),
            info: panic_message(&*panic_err),
        }),
    }
}

fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::sync::oneshot;

    use super::*;
    use crate::listeners::{ListenerFn, ListenerRef, with_entry};

    type Log = Mutex<Vec<&'static str>>;

    fn entry<F>(name: &'static str, priority: i32, f: F) -> Entry<Log>
    where
        F: Fn(&Event<Log>, &mut PublishArgs) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let l: ListenerRef<Log> = ListenerFn::arc(name, f);
        Entry::new(l, priority)
    }

    fn push(
        name: &'static str,
    ) -> impl Fn(&Event<Log>, &mut PublishArgs) -> Result<(), ListenerError> + Send + Sync + 'static
    {
        move |ev: &Event<Log>, _: &mut PublishArgs| -> Result<(), ListenerError> {
            ev.payload.lock().unwrap().push(name);
            Ok(())
        }
    }

    async fn run(entries: Vec<Entry<Log>>) -> (Vec<&'static str>, Vec<ListenerError>) {
        let mut list = None;
        for e in entries {
            list = Some(with_entry(list.as_ref(), e));
        }
        let event = Event::new("t", Mutex::new(Vec::new()));
        let payload = Arc::clone(&event.payload);
        let (tx, rx) = oneshot::channel();
        let delivery = Delivery {
            event,
            listeners: list.unwrap_or_else(|| Vec::new().into()),
            done: Some(tx),
        };

        dispatch(&Topic::from("t"), delivery, &Notices::new(16)).await;
        let errors = rx.await.unwrap();
        let log = payload.lock().unwrap().clone();
        (log, errors)
    }

    #[tokio::test]
    async fn test_panic_is_contained_and_next_listener_runs() {
        let (log, errors) = run(vec![
            entry("bomb", 5, |_, _| panic!("boom")),
            entry("after", 1, push("after")),
        ])
        .await;

        assert_eq!(log, ["after"]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_panic());
        assert!(errors[0].to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_formatted_panic_payload() {
        let (_, errors) = run(vec![entry("fmt", 0, |_, _| panic!("code {}", 42))]).await;
        assert_eq!(
            errors,
            [ListenerError::Panicked {
                listener: "fmt".into(),
                info: "code 42".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_stop_propagation_skips_rest() {
        let (log, errors) = run(vec![
            entry("first", 3, push("first")),
            entry("gate", 2, |ev, args| {
                ev.payload.lock().unwrap().push("gate");
                args.stop_propagation();
                Ok(())
            }),
            entry("skipped", 1, push("skipped")),
        ])
        .await;

        assert_eq!(log, ["first", "gate"]);
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_errors_collected_in_invocation_order() {
        let (log, errors) = run(vec![
            entry("a", 2, |_, _| Err(ListenerError::fail("a failed"))),
            entry("b", 1, push("b")),
            entry("c", 0, |_, _| Err("c failed".into())),
        ])
        .await;

        assert_eq!(log, ["b"]);
        assert_eq!(
            errors,
            [ListenerError::fail("a failed"), ListenerError::fail("c failed")]
        );
    }

    #[tokio::test]
    async fn test_position_tracks_listener_index() {
        let (_, errors) = run(vec![
            entry("zero", 1, |_, args| {
                assert_eq!(args.position(), 0);
                Ok(())
            }),
            entry("one", 0, |_, args| {
                if args.position() == 1 {
                    Ok(())
                } else {
                    Err("wrong position".into())
                }
            }),
        ])
        .await;
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_empty_snapshot_reports_no_errors() {
        let (log, errors) = run(Vec::new()).await;
        assert!(log.is_empty());
        assert!(errors.is_empty());
    }
}
