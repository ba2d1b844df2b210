//! Undo/redo history around any reducer.

use crate::action::Action;
use crate::reducer::Reducer;

/// Default number of past states kept by [`UndoableReducer`].
pub const DEFAULT_HISTORY: usize = 10;

/// Step back to the previous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo;

/// Re-apply the most recently undone state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redo;

/// Present state plus its history. `past` and `future` are stacks whose top
/// is the last element.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoableState<S> {
    pub past: Vec<S>,
    pub present: S,
    pub future: Vec<S>,
}

impl<S> UndoableState<S> {
    pub fn new(present: S) -> Self {
        Self {
            past: Vec::new(),
            present,
            future: Vec::new(),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}

/// Wraps a reducer over `S` into a reducer over `UndoableState<S>`.
pub struct UndoableReducer<R> {
    inner: R,
    keep: usize,
}

impl<R> UndoableReducer<R> {
    pub fn new(inner: R) -> Self {
        Self::with_history(inner, DEFAULT_HISTORY)
    }

    /// Keep at most `keep` past states; the oldest are dropped first.
    pub fn with_history(inner: R, keep: usize) -> Self {
        Self { inner, keep }
    }

    pub fn keep(&self) -> usize {
        self.keep
    }
}

impl<S, R> Reducer<UndoableState<S>> for UndoableReducer<R>
where
    S: Clone + PartialEq,
    R: Reducer<S>,
{
    fn reduce(&self, state: &UndoableState<S>, action: &Action) -> UndoableState<S> {
        if action.is::<Undo>() {
            let mut next = state.clone();
            if let Some(previous) = next.past.pop() {
                next.future.push(std::mem::replace(&mut next.present, previous));
            }
            return next;
        }

        if action.is::<Redo>() {
            let mut next = state.clone();
            if let Some(following) = next.future.pop() {
                next.past.push(std::mem::replace(&mut next.present, following));
            }
            return next;
        }

        let present = self.inner.reduce(&state.present, action);
        if present == state.present {
            return state.clone();
        }

        let mut past = state.past.clone();
        past.push(state.present.clone());
        if past.len() > self.keep {
            let excess = past.len() - self.keep;
            past.drain(..excess);
        }

        UndoableState {
            past,
            present,
            future: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Increment;
    struct Decrement;
    struct Unknown;

    fn counter(state: &i32, action: &Action) -> i32 {
        if action.is::<Increment>() {
            state + 1
        } else if action.is::<Decrement>() {
            state - 1
        } else {
            *state
        }
    }

    fn apply(
        reducer: &UndoableReducer<fn(&i32, &Action) -> i32>,
        state: UndoableState<i32>,
        action: impl std::any::Any + Send + Sync,
    ) -> UndoableState<i32> {
        reducer.reduce(&state, &Action::new(action))
    }

    fn reducer() -> UndoableReducer<fn(&i32, &Action) -> i32> {
        UndoableReducer::new(counter as fn(&i32, &Action) -> i32)
    }

    #[test]
    fn applies_inner_reducer_to_present() {
        let reducer = reducer();
        let mut state = UndoableState::new(10);
        for _ in 0..3 {
            state = apply(&reducer, state, Decrement);
        }
        assert_eq!(state.present, 7);
        assert_eq!(state.past, vec![10, 9, 8]);
    }

    #[test]
    fn undo_walks_back_and_stops_at_the_beginning() {
        let reducer = reducer();
        let mut state = UndoableState::new(0);
        for _ in 0..3 {
            state = apply(&reducer, state, Increment);
        }
        assert_eq!(state.present, 3);

        for expected in [2, 1, 0, 0] {
            state = apply(&reducer, state, Undo);
            assert_eq!(state.present, expected);
        }
        assert!(!state.can_undo());
        assert_eq!(state.future, vec![3, 2, 1]);
    }

    #[test]
    fn redo_replays_undone_states() {
        let reducer = reducer();
        let mut state = UndoableState::new(0);
        for _ in 0..3 {
            state = apply(&reducer, state, Increment);
        }
        for _ in 0..3 {
            state = apply(&reducer, state, Undo);
        }

        for expected in [1, 2, 3, 3] {
            state = apply(&reducer, state, Redo);
            assert_eq!(state.present, expected);
        }
        assert!(!state.can_redo());
    }

    #[test]
    fn new_change_clears_redo_stack() {
        let reducer = reducer();
        let state = apply(&reducer, UndoableState::new(0), Increment);
        let state = apply(&reducer, state, Undo);
        assert!(state.can_redo());

        let state = apply(&reducer, state, Decrement);
        assert_eq!(state.present, -1);
        assert!(!state.can_redo());
    }

    #[test]
    fn unrecognised_action_leaves_history_untouched() {
        let reducer = reducer();
        let state = apply(&reducer, UndoableState::new(5), Increment);
        let after = apply(&reducer, state.clone(), Unknown);
        assert_eq!(after, state);
    }

    #[test]
    fn history_is_capped() {
        let reducer = UndoableReducer::with_history(counter as fn(&i32, &Action) -> i32, 2);
        let mut state = UndoableState::new(0);
        for _ in 0..5 {
            state = reducer.reduce(&state, &Action::new(Increment));
        }
        assert_eq!(state.present, 5);
        assert_eq!(state.past, vec![3, 4]);
        assert_eq!(reducer.keep(), 2);
    }
}
