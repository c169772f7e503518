//! Listener registrations and their priority order.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::listeners::{Listener, ListenerRef};

/// Global counter for listener ids.
static LISTENER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Identifies one registration; returned by `subscribe`, accepted by `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(LISTENER_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// A listener registered on a topic with its priority.
pub(crate) struct Entry<P> {
    pub(crate) id: ListenerId,
    pub(crate) priority: i32,
    pub(crate) name: Arc<str>,
    pub(crate) listener: ListenerRef<P>,
}

impl<P> Entry<P>
where
    P: Send + Sync + 'static,
{
    pub(crate) fn new(listener: ListenerRef<P>, priority: i32) -> Self {
        Self {
            id: ListenerId::next(),
            priority,
            name: Arc::from(listener.name()),
            listener,
        }
    }
}

impl<P> Clone for Entry<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            priority: self.priority,
            name: Arc::clone(&self.name),
            listener: Arc::clone(&self.listener),
        }
    }
}

/// Ordered, immutable listener list; snapshots are `Arc` clones.
pub(crate) type Entries<P> = Arc<[Entry<P>]>;

/// Returns a new list with `entry` appended and re-sorted by descending priority.
///
/// The sort is stable: equal priorities keep registration order.
pub(crate) fn with_entry<P>(list: Option<&Entries<P>>, entry: Entry<P>) -> Entries<P> {
    let mut next: Vec<Entry<P>> = list.map(|l| l.to_vec()).unwrap_or_default();
    next.push(entry);
    next.sort_by(|a, b| b.priority.cmp(&a.priority));
    next.into()
}

/// Returns a new list without the entry `id`, or `None` if it is not present.
pub(crate) fn without_entry<P>(list: &Entries<P>, id: ListenerId) -> Option<(Entries<P>, Entry<P>)> {
    let idx = list.iter().position(|e| e.id == id)?;
    let mut next = list.to_vec();
    let removed = next.remove(idx);
    Some((next.into(), removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListenerError;
    use crate::events::{Event, PublishArgs};
    use crate::listeners::ListenerFn;

    fn noop(name: &'static str, priority: i32) -> Entry<()> {
        let l: ListenerRef<()> = ListenerFn::arc(name, |_: &Event<()>, _: &mut PublishArgs| {
            Ok::<(), ListenerError>(())
        });
        Entry::new(l, priority)
    }

    fn names(list: &Entries<()>) -> Vec<&str> {
        list.iter().map(|e| &*e.name).collect()
    }

    #[test]
    fn test_sorted_descending() {
        let list = with_entry(None, noop("low", 1));
        let list = with_entry(Some(&list), noop("high", 10));
        let list = with_entry(Some(&list), noop("mid", 5));
        assert_eq!(names(&list), ["high", "mid", "low"]);
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let mut list = with_entry(None, noop("a", 0));
        for name in ["b", "c", "d"] {
            list = with_entry(Some(&list), noop(name, 0));
        }
        list = with_entry(Some(&list), noop("first", 3));
        assert_eq!(names(&list), ["first", "a", "b", "c", "d"]);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_insert() {
        let list = with_entry(None, noop("a", 0));
        let snapshot = Arc::clone(&list);
        let _next = with_entry(Some(&list), noop("b", 9));
        assert_eq!(names(&snapshot), ["a"]);
    }

    #[test]
    fn test_without_entry() {
        let a = noop("a", 1);
        let a_id = a.id;
        let list = with_entry(None, a);
        let list = with_entry(Some(&list), noop("b", 2));

        let (rest, removed) = without_entry(&list, a_id).expect("present");
        assert_eq!(&*removed.name, "a");
        assert_eq!(names(&rest), ["b"]);
        assert!(without_entry(&rest, a_id).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ListenerId::next(), ListenerId::next());
    }
}
