//! The logic pipeline, installed on a store as an enhancer.
//!
//! For every dispatched action: poison pills cancel units and stop there;
//! units whose cancel type matches are canceled; the units bound to the
//! action (exactly, or through `AnyAction`) are ordered by descending
//! priority and run in two phases. A run starts on the dispatching thread and
//! moves to the runtime at its first suspension. Pre-process transforms and
//! validates, then the action is forwarded to the reducers once, then each
//! unit processes it inside its own batching scope. Errors escaping a run
//! are re-dispatched as [`LogicFailure`] actions.

use std::cell::Cell;
use std::cmp::Reverse;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::task::{Context, Poll};

use futures::task::noop_waker_ref;

use reflux_core::{Action, ActionType, Dispatched, Enhancer, Forward, Store};
use tokio::runtime::Handle;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::cancel::{Canceled, UnitStatus};
use crate::config::{LogicConfig, LongRunningStrategy};
use crate::context::LogicContext;
use crate::error::LogicError;
use crate::logic::Logic;
use crate::poison_pill::PoisonPill;
use crate::unit::{LogicHandler, LogicUnit, ProcessOutcome};
use crate::validation::LogicFailure;

type Unit<S> = Arc<dyn LogicHandler<S>>;

/// Nested eager runs allowed on one thread before falling back to a plain spawn.
const MAX_EAGER_DEPTH: u32 = 16;

thread_local! {
    static EAGER_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Bumps the thread's eager depth for as long as it lives.
struct EagerDepth(u32);

impl EagerDepth {
    fn enter() -> Option<Self> {
        let depth = EAGER_DEPTH.with(Cell::get);
        if depth >= MAX_EAGER_DEPTH {
            return None;
        }
        EAGER_DEPTH.with(|cell| cell.set(depth + 1));
        Some(Self(depth))
    }
}

impl Drop for EagerDepth {
    fn drop(&mut self) {
        EAGER_DEPTH.with(|cell| cell.set(self.0));
    }
}

/// Registered units, in registration order.
pub struct LogicRegistry<S> {
    units: RwLock<Vec<Unit<S>>>,
}

impl<S> LogicRegistry<S>
where
    S: Send + Sync + 'static,
{
    fn new() -> Self {
        Self {
            units: RwLock::new(Vec::new()),
        }
    }

    /// Register a typed logic unit.
    pub fn add<L: Logic<S>>(&self, logic: L) -> UnitHandle<S> {
        self.add_handler(Arc::new(LogicUnit::new(logic)))
    }

    /// Register a handler that implements the erased interface directly.
    pub fn add_handler(&self, handler: Arc<dyn LogicHandler<S>>) -> UnitHandle<S> {
        info!(
            unit = handler.name(),
            priority = handler.priority(),
            long_running = handler.is_long_running(),
            "Registered logic unit"
        );
        self.units
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler.clone());
        UnitHandle { unit: handler }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Unit<S>> {
        self.units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Returned on registration; reports the unit's cancellation status.
pub struct UnitHandle<S> {
    unit: Unit<S>,
}

impl<S> UnitHandle<S>
where
    S: Send + Sync + 'static,
{
    pub fn status(&self) -> UnitStatus {
        self.unit.status()
    }

    pub fn name(&self) -> &str {
        self.unit.name()
    }
}

impl<S> Clone for UnitHandle<S> {
    fn clone(&self) -> Self {
        Self {
            unit: self.unit.clone(),
        }
    }
}

pub(crate) struct Pipeline<S> {
    registry: LogicRegistry<S>,
    config: LogicConfig,
    runtime: Handle,
}

impl<S> Pipeline<S>
where
    S: Send + Sync + 'static,
{
    /// Route one action through the pipeline. `inner` is the store beneath it.
    pub(crate) fn intercept(self: &Arc<Self>, action: Action, inner: Arc<dyn Store<S>>) -> Dispatched {
        let units = self.registry.snapshot();

        if let Some(pill) = action.downcast_ref::<PoisonPill>() {
            info!(reason = %pill.reason, kill = pill.kill, "Poison pill received");
            for unit in &units {
                unit.cancel(pill.kill);
            }
            return Dispatched::completed();
        }

        let action_type = action.action_type();
        for unit in units.iter().filter(|unit| unit.cancel_type() == Some(action_type)) {
            debug!(unit = unit.name(), action = action_type.name(), "Canceled by action type");
            unit.cancel(false);
        }

        let mut chain: Vec<Unit<S>> = units
            .into_iter()
            .filter(|unit| unit.binding().matches(action_type))
            .collect();
        chain.sort_by_key(|unit| Reverse(unit.priority()));

        if chain.is_empty() {
            return inner.dispatch(action);
        }

        let span = info_span!(
            "logic_dispatch",
            action = action_type.name(),
            dispatch_id = %Uuid::new_v4(),
            units = chain.len(),
        );
        let ctx = LogicContext::attached(inner, self.clone());
        let pipeline = self.clone();
        let run = async move { pipeline.run(ctx, action, chain).await }.instrument(span);
        self.drive(run)
    }

    /// Poll a run on the calling thread until it first suspends, then hand the
    /// rest to the runtime. Forwards reach the reducers in dispatch order.
    fn drive<F>(&self, run: F) -> Dispatched
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Some(_depth) = EagerDepth::enter() else {
            return Dispatched::spawned(self.runtime.spawn(run));
        };

        let mut run = Box::pin(run);
        let polled = {
            let _runtime = self.runtime.enter();
            run.as_mut().poll(&mut Context::from_waker(noop_waker_ref()))
        };
        match polled {
            Poll::Ready(()) => Dispatched::completed(),
            Poll::Pending => Dispatched::spawned(self.runtime.spawn(run)),
        }
    }

    async fn run(self: Arc<Self>, ctx: LogicContext<S>, action: Action, chain: Vec<Unit<S>>) {
        let action_type = action.action_type();
        let depth = failure_depth(&action);

        match self.execute(&ctx, action, &chain).await {
            Ok(()) => debug!("Pipeline run complete"),
            Err(e) if e.is::<Canceled>() => debug!("Pipeline run canceled"),
            Err(e) => self.report_failure(&ctx, action_type, e, depth),
        }

        ctx.settle().await;
    }

    async fn execute(
        self: &Arc<Self>,
        ctx: &LogicContext<S>,
        action: Action,
        chain: &[Unit<S>],
    ) -> anyhow::Result<()> {
        let mut action = action;
        for unit in chain {
            let result = unit.pre_process(ctx, action).await?;
            action = result.action;
            if !result.proceed {
                debug!(unit = unit.name(), "Pre-process halted the chain");
                return Ok(());
            }
        }

        ctx.track(ctx.store().dispatch(action.clone()));

        for unit in chain {
            if unit.is_long_running() {
                self.spawn_long_running(ctx, unit.clone(), action.clone());
                continue;
            }

            let dispatcher = ctx.scope();
            let outcome = unit.process(ctx, &action, &dispatcher).await?;
            dispatcher.close();
            if outcome == ProcessOutcome::Canceled {
                debug!(unit = unit.name(), "Process canceled");
            }
        }
        Ok(())
    }

    fn spawn_long_running(self: &Arc<Self>, ctx: &LogicContext<S>, unit: Unit<S>, action: Action) {
        let ctx = ctx.fork();
        let pipeline = self.clone();
        let task = async move {
            let action_type = action.action_type();
            let dispatcher = ctx.scope();
            let result = unit.process(&ctx, &action, &dispatcher).await;
            dispatcher.close();

            match result {
                Ok(outcome) => debug!(unit = unit.name(), ?outcome, "Long-running process finished"),
                Err(e) if e.is::<Canceled>() => {
                    debug!(unit = unit.name(), "Long-running process canceled")
                }
                Err(e) => pipeline.report_failure(&ctx, action_type, e, failure_depth(&action)),
            }
            ctx.settle().await;
        }
        .instrument(Span::current());

        match self.config.long_running {
            LongRunningStrategy::Task => {
                self.runtime.spawn(task);
            }
            LongRunningStrategy::Thread => {
                let runtime = self.runtime.clone();
                self.runtime.spawn_blocking(move || runtime.block_on(task));
            }
        }
    }

    fn report_failure(&self, ctx: &LogicContext<S>, action_type: ActionType, error: anyhow::Error, depth: u32) {
        if let Some(limit) = self.config.failure_redispatch_limit {
            if depth > limit {
                error!(
                    action = action_type.name(),
                    depth,
                    limit,
                    error = %format!("{error:#}"),
                    "Dropping logic failure past the re-dispatch limit"
                );
                return;
            }
        }

        warn!(
            action = action_type.name(),
            depth,
            error = %format!("{error:#}"),
            "Logic failed, re-dispatching failure"
        );
        ctx.redispatch(LogicFailure {
            action_type,
            error: Arc::new(error),
            depth,
        });
    }
}

fn failure_depth(action: &Action) -> u32 {
    action
        .downcast_ref::<LogicFailure>()
        .map_or(0, |failure| failure.depth + 1)
}

/// Enhancer that runs dispatched actions through a logic pipeline.
pub struct LogicEnhancer<S> {
    pipeline: Arc<Pipeline<S>>,
}

impl<S> LogicEnhancer<S>
where
    S: Send + Sync + 'static,
{
    /// Capture the current tokio runtime. Fails outside one.
    pub fn new(config: LogicConfig) -> Result<Self, LogicError> {
        let runtime = Handle::try_current()?;
        Ok(Self {
            pipeline: Arc::new(Pipeline {
                registry: LogicRegistry::new(),
                config,
                runtime,
            }),
        })
    }

    pub fn registry(&self) -> &LogicRegistry<S> {
        &self.pipeline.registry
    }

    pub fn config(&self) -> &LogicConfig {
        &self.pipeline.config
    }
}

impl<S> Enhancer<S> for LogicEnhancer<S>
where
    S: Send + Sync + 'static,
{
    fn on_dispatch(&self, action: Action, inner: &Forward<S>) -> Dispatched {
        self.pipeline.intercept(action, inner.store().clone())
    }
}
