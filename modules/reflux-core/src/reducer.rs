//! The reducer contract.

use crate::action::Action;

/// Pure state transition. No I/O, no side effects.
///
/// Must be total over every action that can be dispatched: actions a reducer
/// does not recognise return the state unchanged. The store decides whether
/// to notify by comparing the returned value with the previous one, so a
/// reducer that changes nothing must return an equal value.
pub trait Reducer<S>: Send + Sync {
    fn reduce(&self, state: &S, action: &Action) -> S;
}

impl<S, F> Reducer<S> for F
where
    F: Fn(&S, &Action) -> S + Send + Sync,
{
    fn reduce(&self, state: &S, action: &Action) -> S {
        self(state, action)
    }
}
