//! Building a root reducer out of smaller ones.
//!
//! [`ReducerComposer`] runs several whole-state reducers in sequence.
//! [`SubTree`] lifts a reducer over one part of the state into a reducer over
//! the whole state, given an explicit getter and setter for that part.

use std::marker::PhantomData;

use crate::action::Action;
use crate::reducer::Reducer;

/// Applies each registered reducer in registration order, feeding the output
/// of one into the next.
pub struct ReducerComposer<S> {
    reducers: Vec<Box<dyn Reducer<S>>>,
}

impl<S> ReducerComposer<S> {
    pub fn new() -> Self {
        Self {
            reducers: Vec::new(),
        }
    }

    pub fn add_state_reducer(mut self, reducer: impl Reducer<S> + 'static) -> Self {
        self.reducers.push(Box::new(reducer));
        self
    }

    pub fn add_sub_tree_reducer<P, G, U, R>(self, sub_tree: SubTree<S, P, G, U, R>) -> Self
    where
        S: 'static,
        P: 'static,
        G: Fn(&S) -> &P + Send + Sync + 'static,
        U: Fn(&S, P) -> S + Send + Sync + 'static,
        R: Reducer<P> + 'static,
    {
        self.add_state_reducer(sub_tree)
    }

    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S> Default for ReducerComposer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone> Reducer<S> for ReducerComposer<S> {
    fn reduce(&self, state: &S, action: &Action) -> S {
        let mut next = state.clone();
        for reducer in &self.reducers {
            next = reducer.reduce(&next, action);
        }
        next
    }
}

/// A reducer over part `P` of state `S`.
///
/// `get` borrows the part out of the whole state and `set` produces a new
/// whole state with the part replaced.
pub struct SubTree<S, P, G, U, R> {
    get: G,
    set: U,
    reducer: R,
    _phantom: PhantomData<fn(&S) -> P>,
}

impl<S, P, G, U, R> SubTree<S, P, G, U, R> {
    pub fn new(get: G, set: U, reducer: R) -> Self
    where
        G: Fn(&S) -> &P + Send + Sync,
        U: Fn(&S, P) -> S + Send + Sync,
        R: Reducer<P>,
    {
        Self {
            get,
            set,
            reducer,
            _phantom: PhantomData,
        }
    }
}

impl<S, P, G, U, R> Reducer<S> for SubTree<S, P, G, U, R>
where
    G: Fn(&S) -> &P + Send + Sync,
    U: Fn(&S, P) -> S + Send + Sync,
    R: Reducer<P>,
{
    fn reduce(&self, state: &S, action: &Action) -> S {
        let part = self.reducer.reduce((self.get)(state), action);
        (self.set)(state, part)
    }
}
