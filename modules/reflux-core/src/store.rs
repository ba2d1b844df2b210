//! The store contract and the base state store.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::action::Action;
use crate::error::DispatchError;
use crate::reducer::Reducer;
use crate::subscribers::Subscribers;

/// Owner of the current state.
///
/// `dispatch` applies the action and, when the state changed, notifies
/// [`subscribers`](Store::subscribers) before returning. Layers that do part
/// of their work asynchronously return a [`Dispatched`] handle the caller may
/// await; callers are never required to.
pub trait Store<S>: Send + Sync {
    fn state(&self) -> Arc<S>;

    fn dispatch(&self, action: Action) -> Dispatched;

    fn subscribers(&self) -> &Subscribers;

    /// The next store down the enhancer chain, if this is an enhanced store.
    fn inner(&self) -> Option<&Arc<dyn Store<S>>> {
        None
    }

    /// The enhancer installed at this layer, if any.
    fn enhancer(&self) -> Option<&dyn Any> {
        None
    }
}

/// Convenience methods available on every store, including `dyn Store<S>`.
pub trait StoreExt<S: 'static>: Store<S> {
    /// Wrap `action` and dispatch it.
    fn dispatch_action<A: Any + Send + Sync>(&self, action: A) -> Dispatched {
        self.dispatch(Action::new(action))
    }

    /// First enhancer of type `E`, walking the chain outer to inner.
    fn find_enhancer<E: Any>(&self) -> Option<&E> {
        if let Some(found) = self.enhancer().and_then(|e| e.downcast_ref::<E>()) {
            return Some(found);
        }
        let mut next = self.inner();
        while let Some(store) = next {
            if let Some(found) = store.enhancer().and_then(|e| e.downcast_ref::<E>()) {
                return Some(found);
            }
            next = store.inner();
        }
        None
    }
}

impl<S: 'static, T: Store<S> + ?Sized> StoreExt<S> for T {}

/// Completion handle returned by [`Store::dispatch`].
///
/// Synchronous dispatches return an already-completed handle. Dropping a
/// handle never cancels the work behind it.
#[must_use = "a dispatch handle can be awaited with `wait`, or dropped to fire and forget"]
pub struct Dispatched {
    task: Option<JoinHandle<()>>,
}

impl Dispatched {
    pub fn completed() -> Self {
        Self { task: None }
    }

    pub fn spawned(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Wait for the dispatch and any asynchronous work it started.
    pub async fn wait(self) -> Result<(), DispatchError> {
        match self.task {
            Some(task) => task.await.map_err(DispatchError::from),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Dispatched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatched")
            .field("spawned", &self.task.is_some())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// The base store: a reducer bound to a single state cell.
///
/// The cell is replaced only when the reducer returns a value that is not
/// equal to the current one, and only then are subscribers notified.
/// Notification happens on the dispatching thread, after the cell lock is
/// released.
pub struct StateStore<S> {
    reducer: Box<dyn Reducer<S>>,
    state: Mutex<Arc<S>>,
    subscribers: Subscribers,
}

impl<S> StateStore<S>
where
    S: PartialEq + Send + Sync + 'static,
{
    pub fn new(reducer: impl Reducer<S> + 'static, initial: S) -> Self {
        Self::from_boxed(Box::new(reducer), initial)
    }

    pub fn from_boxed(reducer: Box<dyn Reducer<S>>, initial: S) -> Self {
        Self {
            reducer,
            state: Mutex::new(Arc::new(initial)),
            subscribers: Subscribers::new(),
        }
    }

    /// Move into a shared, type-erased store handle.
    pub fn shared(self) -> Arc<dyn Store<S>> {
        Arc::new(self)
    }

    fn cell(&self) -> MutexGuard<'_, Arc<S>> {
        // A panicking reducer leaves the previous state in place.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> Store<S> for StateStore<S>
where
    S: PartialEq + Send + Sync + 'static,
{
    fn state(&self) -> Arc<S> {
        self.cell().clone()
    }

    fn dispatch(&self, action: Action) -> Dispatched {
        let changed = {
            let mut current = self.cell();
            let next = self.reducer.reduce(&**current, &action);
            if next != **current {
                *current = Arc::new(next);
                true
            } else {
                false
            }
        };

        debug!(action = action.type_name(), changed, "Reduced action");
        if changed {
            self.subscribers.notify();
        }
        Dispatched::completed()
    }

    fn subscribers(&self) -> &Subscribers {
        &self.subscribers
    }
}
