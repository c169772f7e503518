//! # Example: user_created
//!
//! Demonstrates a registration flow publishing `auth.user.created` to
//! several independent consumers.
//!
//! Shows how to:
//! - Implement the [`Listener`] trait for a stateful consumer.
//! - Register closures with different priorities.
//! - Await dispatch results vs. fire-and-forget publishing.
//! - Watch bus notices and shut the bus down gracefully.
//!
//! ## Flow
//! ```text
//! register_user() ──► bus.publish_and_wait(auth.user.created)
//!                          └─► worker "auth.user.created"
//!                                ├─► [100] normalize email   (mutates shared payload)
//!                                ├─► [ 50] Mailer            (async, may fail)
//!                                └─► [  0] audit log
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=topicbus=debug cargo run --example user_created
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use topicbus::{BusConfig, Event, EventBus, Listener, ListenerError, NoticeKind, PublishArgs};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct NewUser {
    id: u64,
    email: Mutex<String>,
}

/// Pretend mail sender that rejects one domain.
struct Mailer {
    sent: AtomicUsize,
}

#[async_trait]
impl Listener<NewUser> for Mailer {
    async fn on_event(
        &self,
        ev: &Event<NewUser>,
        _args: &mut PublishArgs,
    ) -> Result<(), ListenerError> {
        let email = ev.payload.email.lock().unwrap().clone();
        tokio::time::sleep(Duration::from_millis(10)).await;
        if email.ends_with("@blocked.example") {
            return Err(ListenerError::fail(format!("refused to mail {email}")));
        }
        self.sent.fetch_add(1, Ordering::SeqCst);
        println!("[mailer] welcome mail to {email}");
        Ok(())
    }

    fn name(&self) -> &str {
        "mailer"
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bus: EventBus<NewUser> = EventBus::new(BusConfig::default());

    let mut notices = bus.notices();
    let watcher = tokio::spawn(async move {
        while let Ok(n) = notices.recv().await {
            if matches!(n.kind, NoticeKind::ListenerFailed | NoticeKind::ListenerPanicked) {
                println!("[notice] {:?} listener={:?} reason={:?}", n.kind, n.listener, n.reason);
            }
            if n.kind == NoticeKind::AllDrainedWithin {
                break;
            }
        }
    });

    bus.subscribe_fn("auth.user.created", 100, "normalize", |ev, _| {
        let mut email = ev.payload.email.lock().unwrap();
        let normalized = email.trim().to_lowercase();
        *email = normalized;
        Ok(())
    })
    .await;

    let mailer = Arc::new(Mailer {
        sent: AtomicUsize::new(0),
    });
    bus.subscribe("auth.user.created", mailer.clone(), 50).await;

    bus.subscribe_fn("auth.user.created", 0, "audit", |ev, _| {
        println!("[audit] user #{} created", ev.payload.id);
        Ok(())
    })
    .await;

    // Awaited publish: the caller sees listener failures.
    for (id, email) in [(1, "  Alice@Example.com "), (2, "bob@blocked.example")] {
        let ev = Event::new(
            "auth.user.created",
            NewUser {
                id,
                email: Mutex::new(email.to_string()),
            },
        );
        let errors = bus.publish_and_wait(ev).await?;
        println!("[register] user #{id}: {} listener error(s)", errors.len());
        for err in errors {
            println!("[register]   {err}");
        }
    }

    // Fire-and-forget: failures only show up in logs and notices.
    let ev = Event::new(
        "auth.user.created",
        NewUser {
            id: 3,
            email: Mutex::new("carol@blocked.example".into()),
        },
    );
    bus.publish(ev, None).await?;

    bus.shutdown().await?;
    let _ = watcher.await;

    println!("[done] mails sent: {}", mailer.sent.load(Ordering::SeqCst));
    Ok(())
}
