use anyhow::Result;
use async_trait::async_trait;
use reflux_core::ActionType;

use crate::cancel::CancelSignal;
use crate::context::LogicContext;
use crate::multi_dispatcher::MultiDispatcher;
use crate::validation::{Validation, ValidationError};

/// A business process bound to one action type.
///
/// For each dispatched `Action`, the pipeline runs `transform` then
/// `validate` before the action reaches the reducers, and `process` after.
/// Bind to [`AnyAction`](reflux_core::AnyAction) to see every action.
///
/// Hooks are cancellable through the [`CancelSignal`] they receive; use
/// [`CancelSignal::guard`] around slow awaits and propagate its
/// [`Canceled`](crate::Canceled) error with `?` to exit quietly.
#[async_trait]
pub trait Logic<S>: Send + Sync + 'static
where
    S: Send + Sync + 'static,
{
    type Action: Clone + Send + Sync + 'static;

    /// Higher priorities run first.
    fn priority(&self) -> u32 {
        0
    }

    /// Dispatching an action of this type cancels the unit.
    fn cancel_type(&self) -> Option<ActionType> {
        None
    }

    /// Run `process` off the pipeline so it never delays sibling units.
    fn is_long_running(&self) -> bool {
        false
    }

    async fn transform(
        &self,
        _ctx: &LogicContext<S>,
        action: Self::Action,
        _cancel: &CancelSignal,
    ) -> Result<Self::Action> {
        Ok(action)
    }

    async fn validate(
        &self,
        _ctx: &LogicContext<S>,
        _action: &Self::Action,
        _dispatcher: &MultiDispatcher<S>,
        cancel: &CancelSignal,
    ) -> Result<Validation> {
        if cancel.is_canceled() {
            return Ok(Validation::invalid("Cancel requested"));
        }
        Ok(Validation::Valid)
    }

    /// Called when `validate` rejects an action. The default dispatches the
    /// error back through the pipeline.
    fn on_validation_error(
        &self,
        ctx: &LogicContext<S>,
        error: ValidationError,
        _action: &Self::Action,
    ) {
        ctx.redispatch(error);
    }

    async fn process(
        &self,
        _ctx: &LogicContext<S>,
        _action: &Self::Action,
        _dispatcher: &MultiDispatcher<S>,
        _cancel: &CancelSignal,
    ) -> Result<()> {
        Ok(())
    }
}
