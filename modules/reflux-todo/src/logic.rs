//! Business rules that run around the todo reducers.

use anyhow::Result;
use async_trait::async_trait;
use reflux_logic::{CancelSignal, Logic, LogicContext, MultiDispatcher, Validation};

use crate::actions::{AddTodo, HideTodoEditor, UpdateTodoText};
use crate::state::{TodoItem, TodoState};

/// Assigns ids to new todos and rejects todos without text.
pub struct AddTodoHandler;

#[async_trait]
impl Logic<TodoState> for AddTodoHandler {
    type Action = AddTodo;

    fn priority(&self) -> u32 {
        1
    }

    async fn transform(
        &self,
        ctx: &LogicContext<TodoState>,
        action: AddTodo,
        _cancel: &CancelSignal,
    ) -> Result<AddTodo> {
        if action.0.id != 0 {
            return Ok(action);
        }
        let id = ctx.state().present.next_id();
        Ok(AddTodo(TodoItem { id, ..action.0 }))
    }

    async fn validate(
        &self,
        ctx: &LogicContext<TodoState>,
        action: &AddTodo,
        _dispatcher: &MultiDispatcher<TodoState>,
        _cancel: &CancelSignal,
    ) -> Result<Validation> {
        if action.0.text.is_empty() {
            return Ok(Validation::invalid("Cannot add todo with empty text"));
        }
        if ctx.state().present.todos.contains_key(&action.0.id) {
            return Ok(Validation::invalid(format!(
                "Todo {} already exists",
                action.0.id
            )));
        }
        Ok(Validation::Valid)
    }
}

/// Rejects blank edits and closes the editor once an edit is applied.
pub struct UpdateTodoTextHandler;

#[async_trait]
impl Logic<TodoState> for UpdateTodoTextHandler {
    type Action = UpdateTodoText;

    fn priority(&self) -> u32 {
        1
    }

    async fn validate(
        &self,
        _ctx: &LogicContext<TodoState>,
        action: &UpdateTodoText,
        _dispatcher: &MultiDispatcher<TodoState>,
        _cancel: &CancelSignal,
    ) -> Result<Validation> {
        if action.text.trim().is_empty() {
            return Ok(Validation::invalid("Cannot update"));
        }
        Ok(Validation::Valid)
    }

    async fn process(
        &self,
        _ctx: &LogicContext<TodoState>,
        action: &UpdateTodoText,
        dispatcher: &MultiDispatcher<TodoState>,
        _cancel: &CancelSignal,
    ) -> Result<()> {
        let _ = dispatcher.dispatch(HideTodoEditor(action.id));
        Ok(())
    }
}
