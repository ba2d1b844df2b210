//! Batching scope: several dispatches, one notification.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reflux_core::{Action, DetachedSubscribers, Dispatched, Store};

/// Coalesces the notifications of every dispatch made through it into one,
/// delivered when the scope is dropped.
///
/// Creating a scope detaches the store's subscribers, so dispatches made
/// while it is open (through the scope or directly on the store) notify
/// nobody. Dropping the scope notifies the preserved subscribers once if
/// anything was dispatched through it, then re-attaches them once no other
/// scope holds them.
///
/// ```ignore
/// let dispatcher = MultiDispatcher::create(store);
/// dispatcher.dispatch_immediate(LoadingStarted);
/// dispatcher.dispatch(Loaded(1));
/// dispatcher.dispatch(Loaded(2));
/// drop(dispatcher); // one notification for both `Loaded`s
/// ```
pub struct MultiDispatcher<S> {
    store: Arc<dyn Store<S>>,
    detached: Arc<DetachedSubscribers>,
    /// This scope's flag followed by those of its enclosing scopes.
    flags: Vec<Arc<AtomicBool>>,
}

impl<S> MultiDispatcher<S> {
    pub fn create(store: Arc<dyn Store<S>>) -> Self {
        let detached = Arc::new(store.subscribers().detach_all());
        Self {
            store,
            detached,
            flags: vec![Arc::new(AtomicBool::new(false))],
        }
    }

    pub fn state(&self) -> Arc<S> {
        self.store.state()
    }

    /// Dispatch without notifying. Counts as a dispatch for this scope and
    /// every scope enclosing it.
    pub fn dispatch<A: Any + Send + Sync>(&self, action: A) -> Dispatched {
        for flag in &self.flags {
            flag.store(true, Ordering::Release);
        }
        self.store.dispatch(Action::new(action))
    }

    /// Dispatch and notify the preserved subscribers straight away.
    pub fn dispatch_immediate<A: Any + Send + Sync>(&self, action: A) -> Dispatched {
        let handle = self.store.dispatch(Action::new(action));
        self.detached.notify();
        handle
    }

    /// A nested scope sharing this one's preserved subscribers. It delivers
    /// its own notification when dropped.
    pub fn begin_scope(&self) -> MultiDispatcher<S> {
        let mut flags = Vec::with_capacity(self.flags.len() + 1);
        flags.push(Arc::new(AtomicBool::new(false)));
        flags.extend(self.flags.iter().cloned());
        Self {
            store: self.store.clone(),
            detached: self.detached.clone(),
            flags,
        }
    }

    pub fn has_dispatched(&self) -> bool {
        self.flags[0].load(Ordering::Acquire)
    }

    /// Close the scope now rather than at the end of its lexical scope.
    pub fn close(self) {}
}

impl<S> Drop for MultiDispatcher<S> {
    fn drop(&mut self) {
        if self.has_dispatched() {
            self.detached.notify();
        }
    }
}
