//! Unidirectional state container.
//!
//! A single state value is advanced only by pure reducers invoked through a
//! [`Store`]. Enhancers layer cross-cutting behaviour onto a store; the logic
//! pipeline in `reflux-logic` is one such layer.
//!
//! Consumers define their domain by implementing [`Reducer`] (or composing
//! one from [`TypedReducer`], [`SubTree`] and [`ReducerComposer`]) and
//! dispatching plain Rust values as actions.

pub mod action;
pub mod compose;
pub mod enhancer;
pub mod error;
pub mod reducer;
pub mod store;
pub mod subscribers;
pub mod typed;
pub mod undoable;

pub use action::{Action, ActionType, AnyAction};
pub use compose::{ReducerComposer, SubTree};
pub use enhancer::{enhance, Enhanced, Enhancer, Forward, StoreBuilder};
pub use error::DispatchError;
pub use reducer::Reducer;
pub use store::{Dispatched, StateStore, Store, StoreExt};
pub use subscribers::{DetachedSubscribers, SubscriptionId, Subscribers};
pub use typed::TypedReducer;
pub use undoable::{Redo, Undo, UndoableReducer, UndoableState};
