//! Engine-owned change-notification list.
//!
//! Batching scopes suppress notifications by detaching the whole list and
//! re-attaching it when they close. Detachment is counted, so overlapping
//! scopes (for example a long-running unit's scope alongside the main
//! pipeline's) each hold their own guard and the list only re-attaches once
//! the last one is dropped.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Identifies one subscription on one [`Subscribers`] list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct SubscriberList {
    entries: Mutex<Vec<(SubscriptionId, Callback)>>,
    next_id: AtomicU64,
    detached: AtomicUsize,
}

/// Shared handle to a subscriber list. Clones refer to the same list.
#[derive(Clone)]
pub struct Subscribers {
    list: Arc<SubscriberList>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self {
            list: Arc::new(SubscriberList {
                entries: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                detached: AtomicUsize::new(0),
            }),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.list.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries().push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscription. Returns false if it was not on this list.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// True while at least one batching scope holds the list detached.
    pub fn is_detached(&self) -> bool {
        self.list.detached.load(Ordering::Acquire) > 0
    }

    /// Invoke every subscriber once, unless the list is detached.
    pub fn notify(&self) {
        if self.is_detached() {
            return;
        }
        self.fire();
    }

    /// Detach the whole list. Until the returned guard (and every other
    /// outstanding guard) is dropped, [`notify`](Self::notify) delivers nothing.
    pub fn detach_all(&self) -> DetachedSubscribers {
        self.list.detached.fetch_add(1, Ordering::AcqRel);
        DetachedSubscribers {
            subscribers: self.clone(),
        }
    }

    fn fire(&self) {
        // Snapshot so callbacks may subscribe, unsubscribe or read state.
        let callbacks: Vec<Callback> = self
            .entries()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Callback)>> {
        self.list
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Subscribers {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.len())
            .field("detached", &self.is_detached())
            .finish()
    }
}

/// A detached subscriber set. Dropping it re-attaches the set.
pub struct DetachedSubscribers {
    subscribers: Subscribers,
}

impl DetachedSubscribers {
    /// Deliver one notification to the preserved set, regardless of
    /// detachment.
    pub fn notify(&self) {
        self.subscribers.fire();
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl Drop for DetachedSubscribers {
    fn drop(&mut self) {
        self.subscribers
            .list
            .detached
            .fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting(subscribers: &Subscribers) -> (Arc<AtomicUsize>, SubscriptionId) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let id = subscribers.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (count, id)
    }

    #[test]
    fn notify_reaches_every_subscriber() {
        let subscribers = Subscribers::new();
        let (a, _) = counting(&subscribers);
        let (b, _) = counting(&subscribers);

        subscribers.notify();
        subscribers.notify();

        assert_eq!(a.load(Ordering::SeqCst), 2);
        assert_eq!(b.load(Ordering::SeqCst), 2);
        assert_eq!(subscribers.len(), 2);
    }

    #[test]
    fn unsubscribe_removes_only_that_subscription() {
        let subscribers = Subscribers::new();
        let (a, id_a) = counting(&subscribers);
        let (b, _) = counting(&subscribers);

        assert!(subscribers.unsubscribe(id_a));
        assert!(!subscribers.unsubscribe(id_a));
        subscribers.notify();

        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn detached_list_is_silent_until_reattached() {
        let subscribers = Subscribers::new();
        let (count, _) = counting(&subscribers);

        let detached = subscribers.detach_all();
        subscribers.notify();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(subscribers.is_detached());

        detached.notify();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        drop(detached);
        subscribers.notify();
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!subscribers.is_detached());
    }

    #[test]
    fn overlapping_detachments_reattach_after_the_last_guard() {
        let subscribers = Subscribers::new();
        let (count, _) = counting(&subscribers);

        let first = subscribers.detach_all();
        let second = subscribers.detach_all();
        drop(first);
        subscribers.notify();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        drop(second);
        subscribers.notify();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callbacks_may_subscribe_while_being_notified() {
        let subscribers = Subscribers::new();
        let inner = subscribers.clone();
        subscribers.subscribe(move || {
            inner.subscribe(|| {});
        });

        subscribers.notify();
        assert_eq!(subscribers.len(), 2);
    }
}
