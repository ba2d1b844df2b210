//! Script commands, one per dispatched action.
//!
//! ```text
//! add:Buy milk      toggle:1        remove:1        edit:1
//! update:1:Buy oat milk             done:1          cancel-edit:1
//! complete-all      activate-all    clear-completed
//! filter:all|active|completed       undo            redo
//! ```

use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use reflux_core::{Action, Redo, Undo};

use crate::actions::{
    AddTodo, ChangeVisibilityFilter, CompleteAllTodos, HideTodoEditor, MarkAllTodosAsActive,
    RemoveCompleted, RemoveTodo, ShowTodoEditor, ToggleComplete, UpdateTodoText,
};
use crate::state::VisibilityFilter;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(String),
    Toggle(u32),
    Remove(u32),
    Edit(u32),
    Update(u32, String),
    CancelEdit(u32),
    CompleteAll,
    ActivateAll,
    ClearCompleted,
    Filter(VisibilityFilter),
    Undo,
    Redo,
}

impl Command {
    pub fn into_action(self) -> Action {
        match self {
            Command::Add(text) => Action::new(AddTodo::text(text)),
            Command::Toggle(id) => Action::new(ToggleComplete(id)),
            Command::Remove(id) => Action::new(RemoveTodo(id)),
            Command::Edit(id) => Action::new(ShowTodoEditor(id)),
            Command::Update(id, text) => Action::new(UpdateTodoText::new(id, text)),
            Command::CancelEdit(id) => Action::new(HideTodoEditor(id)),
            Command::CompleteAll => Action::new(CompleteAllTodos),
            Command::ActivateAll => Action::new(MarkAllTodosAsActive),
            Command::ClearCompleted => Action::new(RemoveCompleted),
            Command::Filter(filter) => Action::new(ChangeVisibilityFilter(filter)),
            Command::Undo => Action::new(Undo),
            Command::Redo => Action::new(Redo),
        }
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let (verb, rest) = match raw.split_once(':') {
            Some((verb, rest)) => (verb, Some(rest)),
            None => (raw, None),
        };
        let arg = || rest.ok_or_else(|| anyhow!("{verb:?} needs an argument, e.g. \"{verb}:1\""));
        let id = || -> Result<u32> {
            let value = arg()?;
            value
                .trim()
                .parse()
                .with_context(|| format!("invalid todo id {value:?}"))
        };

        let command = match verb.trim() {
            "add" => Command::Add(arg()?.to_string()),
            "toggle" => Command::Toggle(id()?),
            "remove" => Command::Remove(id()?),
            "edit" => Command::Edit(id()?),
            "cancel-edit" => Command::CancelEdit(id()?),
            "update" => {
                let (todo, text) = arg()?
                    .split_once(':')
                    .ok_or_else(|| anyhow!("expected \"update:<id>:<text>\", got {raw:?}"))?;
                let todo = todo
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid todo id {todo:?}"))?;
                Command::Update(todo, text.to_string())
            }
            "complete-all" => Command::CompleteAll,
            "activate-all" => Command::ActivateAll,
            "clear-completed" => Command::ClearCompleted,
            "filter" => Command::Filter(match arg()?.trim() {
                "all" => VisibilityFilter::ShowAllItems,
                "active" => VisibilityFilter::ShowActiveItems,
                "completed" => VisibilityFilter::ShowCompletedItems,
                other => bail!("unknown filter {other:?}, expected all, active or completed"),
            }),
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            other => bail!("unknown command {other:?}"),
        };
        Ok(command)
    }
}
