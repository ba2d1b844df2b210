//! Shared fixtures for the logic pipeline tests.
//!
//! The store under test is a journal: every dispatched action that reaches
//! the reducers is appended by type name, so tests can assert exactly what
//! was forwarded and in which order. Handlers are hand-written recording
//! doubles.

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reflux_core::{Action, ActionType, StateStore, Store};
use reflux_logic::{
    Binding, LogicContext, LogicHandler, MultiDispatcher, PreProcessResult, ProcessOutcome,
    UnitStatus,
};

// ---------------------------------------------------------------------------
// Journal store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Journal {
    pub entries: Vec<String>,
}

impl Journal {
    pub fn count(&self, name: &str) -> usize {
        self.entries.iter().filter(|entry| *entry == name).count()
    }
}

pub fn short_name(action_type: ActionType) -> String {
    let full = action_type.name();
    full.rsplit("::").next().unwrap_or(full).to_string()
}

pub fn journal_store() -> Arc<dyn Store<Journal>> {
    StateStore::new(
        |journal: &Journal, action: &Action| {
            let mut next = journal.clone();
            next.entries.push(short_name(action.action_type()));
            next
        },
        Journal::default(),
    )
    .shared()
}

pub fn count_notifications<S>(store: &Arc<dyn Store<S>>) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = count.clone();
    store.subscribers().subscribe(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    count
}

// ---------------------------------------------------------------------------
// Waiting
// ---------------------------------------------------------------------------

pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out waiting for the pipeline")
}

pub async fn eventually(mut check: impl FnMut() -> bool) {
    within(async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
}

// ---------------------------------------------------------------------------
// Call log
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.calls.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }
}

// ---------------------------------------------------------------------------
// Recording handler
// ---------------------------------------------------------------------------

/// A handler that records `name:pre`, `name:process` and `name:cancel`
/// calls and returns canned results.
pub struct MockHandler {
    name: &'static str,
    binding: Binding,
    priority: u32,
    long_running: bool,
    proceed: bool,
    hang: bool,
    log: CallLog,
}

impl MockHandler {
    pub fn exact<A: 'static>(name: &'static str, log: &CallLog) -> Self {
        Self::bound(name, Binding::Exact(ActionType::of::<A>()), log)
    }

    pub fn any(name: &'static str, log: &CallLog) -> Self {
        Self::bound(name, Binding::Any, log)
    }

    fn bound(name: &'static str, binding: Binding, log: &CallLog) -> Self {
        Self {
            name,
            binding,
            priority: 0,
            long_running: false,
            proceed: true,
            hang: false,
            log: log.clone(),
        }
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Pre-process reports "do not continue".
    pub fn halting(mut self) -> Self {
        self.proceed = false;
        self
    }

    /// Process never completes.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn long_running(mut self) -> Self {
        self.long_running = true;
        self
    }

    pub fn shared<S: Send + Sync + 'static>(self) -> Arc<dyn LogicHandler<S>> {
        Arc::new(self)
    }
}

#[async_trait]
impl<S> LogicHandler<S> for MockHandler
where
    S: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.name
    }

    fn binding(&self) -> Binding {
        self.binding
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn cancel_type(&self) -> Option<ActionType> {
        None
    }

    fn is_long_running(&self) -> bool {
        self.long_running
    }

    fn cancel(&self, _kill: bool) {
        self.log.push(format!("{}:cancel", self.name));
    }

    fn status(&self) -> UnitStatus {
        UnitStatus::Active
    }

    async fn pre_process(
        &self,
        _ctx: &LogicContext<S>,
        action: Action,
    ) -> anyhow::Result<PreProcessResult> {
        self.log.push(format!("{}:pre", self.name));
        Ok(PreProcessResult {
            proceed: self.proceed,
            action,
        })
    }

    async fn process(
        &self,
        _ctx: &LogicContext<S>,
        _action: &Action,
        _dispatcher: &MultiDispatcher<S>,
    ) -> anyhow::Result<ProcessOutcome> {
        self.log.push(format!("{}:process", self.name));
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(ProcessOutcome::Completed)
    }
}
