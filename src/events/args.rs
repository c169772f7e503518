//! Per-dispatch control flags handed to every listener of one event.

/// Mutable control structure shared by all listeners of a single dispatch.
///
/// A fresh value is created by the topic worker for every event, so flags
/// never leak from one publish into the next.
///
/// # Example
/// ```
/// use topicbus::PublishArgs;
///
/// let mut args = PublishArgs::default();
/// assert!(!args.is_propagation_stopped());
/// args.stop_propagation();
/// assert!(args.is_propagation_stopped());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishArgs {
    stop_propagation: bool,
    position: usize,
}

impl PublishArgs {
    /// Skips every listener after the current one for this event.
    #[inline]
    pub fn stop_propagation(&mut self) {
        self.stop_propagation = true;
    }

    /// Returns `true` once a listener has called [`stop_propagation`](Self::stop_propagation).
    #[inline]
    pub fn is_propagation_stopped(&self) -> bool {
        self.stop_propagation
    }

    /// 0-based index of the running listener within this dispatch.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}
