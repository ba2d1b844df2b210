//! The erased handler interface the pipeline drives, and [`LogicUnit`], which
//! adapts a typed [`Logic`] to it.

use std::any::{Any, TypeId};
use std::marker::PhantomData;

use anyhow::Result;
use async_trait::async_trait;
use reflux_core::{Action, ActionType, AnyAction};
use tracing::{debug, info, warn};

use crate::cancel::{CancelState, Canceled, UnitStatus};
use crate::context::LogicContext;
use crate::logic::Logic;
use crate::multi_dispatcher::MultiDispatcher;
use crate::validation::Validation;

/// Which actions a handler is chained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Exact(ActionType),
    Any,
}

impl Binding {
    pub fn of<A: Any>() -> Self {
        if TypeId::of::<A>() == TypeId::of::<AnyAction>() {
            Binding::Any
        } else {
            Binding::Exact(ActionType::of::<A>())
        }
    }

    pub fn matches(&self, action_type: ActionType) -> bool {
        match self {
            Binding::Exact(bound) => *bound == action_type,
            Binding::Any => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreProcessResult {
    /// False halts the chain: no later unit pre-processes, nothing is
    /// forwarded and nothing is processed.
    pub proceed: bool,
    /// The action as transformed so far.
    pub action: Action,
}

impl PreProcessResult {
    pub fn proceed(action: Action) -> Self {
        Self {
            proceed: true,
            action,
        }
    }

    pub fn halt(action: Action) -> Self {
        Self {
            proceed: false,
            action,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Completed,
    Canceled,
}

/// A unit as seen by the pipeline. Implemented by [`LogicUnit`]; implement
/// it directly for handlers that need full control over their phases.
#[async_trait]
pub trait LogicHandler<S>: Send + Sync
where
    S: Send + Sync + 'static,
{
    fn name(&self) -> &str;

    fn binding(&self) -> Binding;

    fn priority(&self) -> u32;

    fn cancel_type(&self) -> Option<ActionType>;

    fn is_long_running(&self) -> bool;

    /// Cancel in-flight work; with `kill`, permanently.
    fn cancel(&self, kill: bool);

    fn status(&self) -> UnitStatus;

    async fn pre_process(&self, ctx: &LogicContext<S>, action: Action) -> Result<PreProcessResult>;

    async fn process(
        &self,
        ctx: &LogicContext<S>,
        action: &Action,
        dispatcher: &MultiDispatcher<S>,
    ) -> Result<ProcessOutcome>;
}

/// Wraps a [`Logic`] with its cancellation state machine.
pub struct LogicUnit<S, L> {
    logic: L,
    cancel: CancelState,
    _state: PhantomData<fn() -> S>,
}

impl<S, L> LogicUnit<S, L>
where
    S: Send + Sync + 'static,
    L: Logic<S>,
{
    pub fn new(logic: L) -> Self {
        Self {
            logic,
            cancel: CancelState::new(),
            _state: PhantomData,
        }
    }

    pub fn logic(&self) -> &L {
        &self.logic
    }

    /// The typed view of `action`, or `None` if this unit does not handle it.
    fn typed(action: &Action) -> Option<L::Action> {
        if TypeId::of::<L::Action>() == TypeId::of::<AnyAction>() {
            let wrapped: Box<dyn Any> = Box::new(AnyAction::new(action.clone()));
            return wrapped.downcast::<L::Action>().ok().map(|typed| *typed);
        }
        action.downcast_ref::<L::Action>().cloned()
    }
}

#[async_trait]
impl<S, L> LogicHandler<S> for LogicUnit<S, L>
where
    S: Send + Sync + 'static,
    L: Logic<S>,
{
    fn name(&self) -> &str {
        std::any::type_name::<L>()
    }

    fn binding(&self) -> Binding {
        Binding::of::<L::Action>()
    }

    fn priority(&self) -> u32 {
        self.logic.priority()
    }

    fn cancel_type(&self) -> Option<ActionType> {
        self.logic.cancel_type()
    }

    fn is_long_running(&self) -> bool {
        self.logic.is_long_running()
    }

    fn cancel(&self, kill: bool) {
        self.cancel.cancel(kill);
        if kill {
            info!(unit = self.name(), "Logic unit killed");
        } else {
            debug!(unit = self.name(), "Logic unit canceled");
        }
    }

    fn status(&self) -> UnitStatus {
        self.cancel.status()
    }

    async fn pre_process(&self, ctx: &LogicContext<S>, action: Action) -> Result<PreProcessResult> {
        let Some(signal) = self.cancel.begin() else {
            debug!(unit = self.name(), "Killed unit declined pre-process");
            return Ok(PreProcessResult::halt(action));
        };
        let Some(typed) = Self::typed(&action) else {
            return Ok(PreProcessResult::proceed(action));
        };

        let transformed = match self.logic.transform(ctx, typed, &signal).await {
            Ok(transformed) => transformed,
            Err(e) if e.is::<Canceled>() => return Ok(PreProcessResult::halt(action)),
            Err(e) => return Err(e),
        };

        let dispatcher = ctx.scope();
        let validation = self
            .logic
            .validate(ctx, &transformed, &dispatcher, &signal)
            .await;
        dispatcher.close();

        match validation {
            Ok(Validation::Valid) => Ok(PreProcessResult::proceed(Action::new(transformed))),
            Ok(Validation::Invalid(error)) => {
                warn!(unit = self.name(), error = %error, "Validation failed");
                self.logic.on_validation_error(ctx, error, &transformed);
                Ok(PreProcessResult::halt(Action::new(transformed)))
            }
            Err(e) if e.is::<Canceled>() => Ok(PreProcessResult::halt(Action::new(transformed))),
            Err(e) => Err(e),
        }
    }

    async fn process(
        &self,
        ctx: &LogicContext<S>,
        action: &Action,
        dispatcher: &MultiDispatcher<S>,
    ) -> Result<ProcessOutcome> {
        let Some(signal) = self.cancel.current() else {
            return Ok(ProcessOutcome::Canceled);
        };
        let Some(typed) = Self::typed(action) else {
            return Ok(ProcessOutcome::Completed);
        };

        match self.logic.process(ctx, &typed, dispatcher, &signal).await {
            Ok(()) => Ok(ProcessOutcome::Completed),
            Err(e) if e.is::<Canceled>() => Ok(ProcessOutcome::Canceled),
            Err(e) => Err(e),
        }
    }
}
