use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use reflux_core::{Action, Dispatched, Store};
use tracing::warn;

use crate::multi_dispatcher::MultiDispatcher;
use crate::pipeline::Pipeline;

/// What a logic hook can reach: the latest state, the store beneath the
/// logic pipeline, and re-dispatch through the pipeline.
///
/// Each pipeline run gets its own context. Dispatches started through
/// [`redispatch`](Self::redispatch) are joined before the run's
/// [`Dispatched`] handle completes.
pub struct LogicContext<S> {
    store: Arc<dyn Store<S>>,
    pipeline: Option<Arc<Pipeline<S>>>,
    nested: Arc<Mutex<Vec<Dispatched>>>,
}

impl<S> Clone for LogicContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            pipeline: self.pipeline.clone(),
            nested: self.nested.clone(),
        }
    }
}

impl<S> LogicContext<S>
where
    S: Send + Sync + 'static,
{
    /// A context outside any pipeline; `redispatch` goes straight to
    /// `store`. Useful for driving a unit by hand.
    pub fn new(store: Arc<dyn Store<S>>) -> Self {
        Self {
            store,
            pipeline: None,
            nested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn attached(store: Arc<dyn Store<S>>, pipeline: Arc<Pipeline<S>>) -> Self {
        Self {
            store,
            pipeline: Some(pipeline),
            nested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn state(&self) -> Arc<S> {
        self.store.state()
    }

    /// The store beneath the logic pipeline. Dispatching here bypasses logic.
    pub fn store(&self) -> &Arc<dyn Store<S>> {
        &self.store
    }

    /// Dispatch through the logic pipeline, as if from outside.
    pub fn redispatch<A: Any + Send + Sync>(&self, action: A) {
        let action = Action::new(action);
        let handle = match &self.pipeline {
            Some(pipeline) => pipeline.intercept(action, self.store.clone()),
            None => self.store.dispatch(action),
        };
        self.track(handle);
    }

    /// A fresh batching scope over the store.
    pub fn scope(&self) -> MultiDispatcher<S> {
        MultiDispatcher::create(self.store.clone())
    }

    pub(crate) fn track(&self, handle: Dispatched) {
        if handle.is_finished() {
            return;
        }
        self.nested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Same store and pipeline, separate set of nested dispatches.
    pub(crate) fn fork(&self) -> Self {
        Self {
            store: self.store.clone(),
            pipeline: self.pipeline.clone(),
            nested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Wait for every tracked dispatch, including ones tracked while waiting.
    pub(crate) async fn settle(&self) {
        loop {
            let pending = std::mem::take(
                &mut *self.nested.lock().unwrap_or_else(PoisonError::into_inner),
            );
            if pending.is_empty() {
                return;
            }
            for result in join_all(pending.into_iter().map(Dispatched::wait)).await {
                if let Err(err) = result {
                    warn!(error = %err, "Nested dispatch did not complete");
                }
            }
        }
    }
}
