//! Type-erased actions.
//!
//! The engine routes purely on an action's runtime type. An [`Action`] wraps
//! any `Send + Sync` value behind an `Arc` so it can be cloned into async
//! continuations without copying the payload.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Runtime type tag of an action. Equality is by `TypeId`; the name is kept
/// for logging only.
#[derive(Clone, Copy)]
pub struct ActionType {
    id: TypeId,
    name: &'static str,
}

impl ActionType {
    pub fn of<A: Any>() -> Self {
        Self {
            id: TypeId::of::<A>(),
            name: std::any::type_name::<A>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ActionType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ActionType {}

impl Hash for ActionType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An opaque, application-defined action value.
#[derive(Clone)]
pub struct Action {
    payload: Arc<dyn Any + Send + Sync>,
    kind: ActionType,
}

impl Action {
    /// Wrap a value as an action.
    ///
    /// Wrapping an `Action` or an [`AnyAction`] returns the action it already
    /// carries, so helpers generic over the payload also accept erased actions.
    pub fn new<A: Any + Send + Sync>(value: A) -> Self {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(value);
        let boxed = match boxed.downcast::<Action>() {
            Ok(action) => return *action,
            Err(other) => other,
        };
        match boxed.downcast::<AnyAction>() {
            Ok(any) => any.action,
            Err(other) => Self {
                payload: Arc::from(other),
                kind: ActionType::of::<A>(),
            },
        }
    }

    pub fn action_type(&self) -> ActionType {
        self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.name
    }

    pub fn is<A: Any>(&self) -> bool {
        self.kind.id == TypeId::of::<A>()
    }

    pub fn downcast_ref<A: Any>(&self) -> Option<&A> {
        self.payload.downcast_ref::<A>()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("type", &self.kind.name)
            .finish_non_exhaustive()
    }
}

/// Wildcard binding. A handler bound to `AnyAction` sees every dispatched
/// action, wrapped in this type.
#[derive(Clone, Debug)]
pub struct AnyAction {
    action: Action,
}

impl AnyAction {
    pub fn new(action: Action) -> Self {
        Self { action }
    }

    /// The action that was actually dispatched.
    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn into_inner(self) -> Action {
        self.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Increment(u32);

    #[derive(Debug)]
    struct Decrement;

    #[test]
    fn action_carries_its_runtime_type() {
        let action = Action::new(Increment(3));
        assert!(action.is::<Increment>());
        assert!(!action.is::<Decrement>());
        assert_eq!(action.action_type(), ActionType::of::<Increment>());
        assert_eq!(action.downcast_ref::<Increment>(), Some(&Increment(3)));
        assert!(action.type_name().ends_with("Increment"));
    }

    #[test]
    fn wrapping_an_action_does_not_nest() {
        let action = Action::new(Increment(1));
        let again = Action::new(action.clone());
        assert!(again.is::<Increment>());
        assert_eq!(again.downcast_ref::<Increment>(), Some(&Increment(1)));
    }

    #[test]
    fn any_action_unwraps_to_the_dispatched_action() {
        let any = AnyAction::new(Action::new(Decrement));
        assert!(any.action().is::<Decrement>());

        let action = Action::new(any);
        assert!(action.is::<Decrement>());
        assert!(!action.is::<AnyAction>());
    }

    #[test]
    fn action_types_compare_by_type_id() {
        assert_eq!(ActionType::of::<Increment>(), ActionType::of::<Increment>());
        assert_ne!(ActionType::of::<Increment>(), ActionType::of::<Decrement>());
    }
}
