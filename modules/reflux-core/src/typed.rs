//! Reducer that routes each action to a handler registered for its type.

use std::any::Any;
use std::collections::HashMap;

use crate::action::{Action, ActionType};
use crate::reducer::Reducer;

type Handler<S> = Box<dyn Fn(&S, &Action) -> S + Send + Sync>;

/// Registry from action type to a typed handler.
///
/// ```ignore
/// let reducer = TypedReducer::new()
///     .on(|count: &i64, add: &Add| count + add.0)
///     .on(|count: &i64, sub: &Subtract| count - sub.0);
/// ```
///
/// Actions without a registered handler leave the state unchanged.
pub struct TypedReducer<S> {
    handlers: HashMap<ActionType, Handler<S>>,
}

impl<S: Clone + 'static> TypedReducer<S> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register the handler for actions of type `A`, replacing any earlier one.
    pub fn on<A, F>(mut self, apply: F) -> Self
    where
        A: Any,
        F: Fn(&S, &A) -> S + Send + Sync + 'static,
    {
        let handler: Handler<S> = Box::new(move |state: &S, action: &Action| {
            match action.downcast_ref::<A>() {
                Some(typed) => apply(state, typed),
                None => state.clone(),
            }
        });
        self.handlers.insert(ActionType::of::<A>(), handler);
        self
    }

    pub fn handles(&self, action_type: ActionType) -> bool {
        self.handlers.contains_key(&action_type)
    }
}

impl<S: Clone + 'static> Default for TypedReducer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + Send + Sync> Reducer<S> for TypedReducer<S> {
    fn reduce(&self, state: &S, action: &Action) -> S {
        match self.handlers.get(&action.action_type()) {
            Some(handler) => handler(state, action),
            None => state.clone(),
        }
    }
}
