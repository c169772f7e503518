//! # Example: priority_chain
//!
//! Demonstrates priority ordering, stop-propagation and panic isolation on a
//! single topic, plus parallel delivery across topics.
//!
//! ## Flow
//! ```text
//! publish(order.placed) ──► [30] validate ──(invalid)──► stop_propagation
//!                                │
//!                                └─(valid)─► [20] reserve stock ─► [10] flaky (panics) ─► [0] notify
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example priority_chain
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::task::JoinSet;
use topicbus::{BusConfig, Event, EventBus, ListenerError};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Order {
    id: u32,
    qty: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let stock = Arc::new(AtomicI64::new(10));
    let s = Arc::clone(&stock);

    let bus = EventBus::<Order>::builder(BusConfig::default().with_queue_capacity(8))
        .with_fn("order.placed", 30, "validate", |ev, args| {
            if ev.payload.qty <= 0 {
                args.stop_propagation();
                return Err(ListenerError::fail(format!(
                    "order {} has invalid quantity {}",
                    ev.payload.id, ev.payload.qty
                )));
            }
            Ok(())
        })
        .with_fn("order.placed", 20, "reserve", move |ev, _| {
            s.fetch_sub(ev.payload.qty, Ordering::SeqCst);
            Ok(())
        })
        .with_fn("order.placed", 10, "flaky", |ev, _| {
            if ev.payload.id % 2 == 0 {
                panic!("flaky integration failed for order {}", ev.payload.id);
            }
            Ok(())
        })
        .with_fn("order.placed", 0, "notify", |ev, args| {
            println!(
                "[notify] order {} confirmed (listener #{})",
                ev.payload.id,
                args.position()
            );
            Ok(())
        })
        .build();

    for (id, qty) in [(1, 2), (2, 3), (3, 0)] {
        let errors = bus
            .publish_and_wait(Event::new("order.placed", Order { id, qty }))
            .await?;
        println!("[order {id}] errors: {errors:?}");
    }
    println!("[stock] remaining: {}", stock.load(Ordering::SeqCst));

    // Topics are served by independent workers.
    let mut set = JoinSet::new();
    for region in ["eu", "us", "apac"] {
        let bus = bus.clone();
        set.spawn(async move {
            let topic = format!("order.shipped.{region}");
            bus.publish_and_wait(Event::new(topic, Order { id: 0, qty: 0 }))
                .await
        });
    }
    while let Some(res) = set.join_next().await {
        res??;
    }
    println!("[topics] {:?}", bus.topics().await);

    bus.shutdown().await?;
    Ok(())
}
