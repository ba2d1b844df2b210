//! Actions understood by the todo reducers and logic.

use crate::state::{TodoItem, VisibilityFilter};

/// Add a todo. An id of `0` is replaced with the next free id before the
/// action reaches the reducers.
#[derive(Debug, Clone, PartialEq)]
pub struct AddTodo(pub TodoItem);

impl AddTodo {
    pub fn text(text: impl Into<String>) -> Self {
        Self(TodoItem::new(0, text, false))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoveTodo(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToggleComplete(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompleteAllTodos;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkAllTodosAsActive;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoveCompleted;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowTodoEditor(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HideTodoEditor(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTodoText {
    pub id: u32,
    pub text: String,
}

impl UpdateTodoText {
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeVisibilityFilter(pub VisibilityFilter);
