//! # Broadcast channel for bus notices.
//!
//! [`Notices`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking notice publishing from multiple sources (topic workers, registry, shutdown).
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent notices for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: notices are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::notice::Notice;

/// Broadcast channel for bus notices.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Notices {
    tx: broadcast::Sender<Notice>,
}

impl Notices {
    /// Creates a new channel with the given capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Notice>(capacity.max(1));
        Self { tx }
    }

    /// Publishes a notice to all active receivers.
    ///
    /// If there are no receivers, the notice is dropped.
    pub fn publish(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }

    /// Creates a new receiver that will observe subsequent notices.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoticeKind;

    #[tokio::test]
    async fn test_receiver_sees_only_later_notices() {
        let notices = Notices::new(0);
        notices.publish(Notice::new(NoticeKind::ShutdownRequested));

        let mut rx = notices.subscribe();
        notices.publish(Notice::new(NoticeKind::AllDrainedWithin));

        let got = rx.recv().await.expect("notice");
        assert_eq!(got.kind, NoticeKind::AllDrainedWithin);
    }
}
