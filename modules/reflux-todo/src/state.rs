use std::collections::BTreeMap;

use reflux_core::UndoableState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: u32,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoItem {
    pub fn new(id: u32, text: impl Into<String>, completed: bool) -> Self {
        Self {
            id,
            text: text.into(),
            completed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityFilter {
    #[default]
    ShowAllItems,
    ShowCompletedItems,
    ShowActiveItems,
}

impl VisibilityFilter {
    pub fn shows(&self, todo: &TodoItem) -> bool {
        match self {
            VisibilityFilter::ShowAllItems => true,
            VisibilityFilter::ShowCompletedItems => todo.completed,
            VisibilityFilter::ShowActiveItems => !todo.completed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TodoList {
    /// Keyed by id, so iteration follows creation order.
    pub todos: BTreeMap<u32, TodoItem>,
    /// Id of the todo whose editor is open.
    pub editing: Option<u32>,
    pub visibility_filter: VisibilityFilter,
    /// Message of the most recent rejected or failed action.
    pub last_error: Option<String>,
}

impl TodoList {
    pub fn with_todos(todos: impl IntoIterator<Item = TodoItem>) -> Self {
        Self {
            todos: todos.into_iter().map(|todo| (todo.id, todo)).collect(),
            ..Self::default()
        }
    }

    pub fn next_id(&self) -> u32 {
        self.todos.keys().next_back().map_or(1, |id| id + 1)
    }

    pub fn visible(&self) -> impl Iterator<Item = &TodoItem> {
        self.todos
            .values()
            .filter(|todo| self.visibility_filter.shows(todo))
    }

    pub fn active_count(&self) -> usize {
        self.todos.values().filter(|todo| !todo.completed).count()
    }
}

/// The application state: the todo list plus its undo history.
pub type TodoState = UndoableState<TodoList>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_id_follows_the_highest_id() {
        assert_eq!(TodoList::default().next_id(), 1);
        let list = TodoList::with_todos([TodoItem::new(3, "a", false), TodoItem::new(7, "b", true)]);
        assert_eq!(list.next_id(), 8);
    }

    #[test]
    fn visible_respects_the_filter() {
        let mut list =
            TodoList::with_todos([TodoItem::new(1, "a", false), TodoItem::new(2, "b", true)]);
        assert_eq!(list.visible().count(), 2);

        list.visibility_filter = VisibilityFilter::ShowActiveItems;
        assert_eq!(list.visible().map(|t| t.id).collect::<Vec<_>>(), vec![1]);

        list.visibility_filter = VisibilityFilter::ShowCompletedItems;
        assert_eq!(list.visible().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(list.active_count(), 1);
    }
}
