//! The todo list reducer, one typed reducer per field.

use std::collections::BTreeMap;

use reflux_core::{ReducerComposer, SubTree, TypedReducer, UndoableReducer};
use reflux_logic::{LogicFailure, ValidationError};

use crate::actions::{
    AddTodo, ChangeVisibilityFilter, CompleteAllTodos, HideTodoEditor, MarkAllTodosAsActive,
    RemoveCompleted, RemoveTodo, ShowTodoEditor, ToggleComplete, UpdateTodoText,
};
use crate::state::{TodoItem, TodoList, VisibilityFilter};

type Todos = BTreeMap<u32, TodoItem>;

/// The root reducer over [`TodoState`](crate::TodoState), keeping `history`
/// undo steps.
pub fn root_reducer(history: usize) -> UndoableReducer<ReducerComposer<TodoList>> {
    UndoableReducer::with_history(todo_list_reducer(), history)
}

pub fn todo_list_reducer() -> ReducerComposer<TodoList> {
    ReducerComposer::new()
        .add_sub_tree_reducer(SubTree::new(
            |list: &TodoList| &list.todos,
            |list: &TodoList, todos| TodoList {
                todos,
                ..list.clone()
            },
            todos_reducer(),
        ))
        .add_sub_tree_reducer(SubTree::new(
            |list: &TodoList| &list.editing,
            |list: &TodoList, editing| TodoList {
                editing,
                ..list.clone()
            },
            editing_reducer(),
        ))
        .add_sub_tree_reducer(SubTree::new(
            |list: &TodoList| &list.visibility_filter,
            |list: &TodoList, visibility_filter| TodoList {
                visibility_filter,
                ..list.clone()
            },
            TypedReducer::new()
                .on(|_: &VisibilityFilter, change: &ChangeVisibilityFilter| change.0),
        ))
        .add_sub_tree_reducer(SubTree::new(
            |list: &TodoList| &list.last_error,
            |list: &TodoList, last_error| TodoList {
                last_error,
                ..list.clone()
            },
            last_error_reducer(),
        ))
}

fn todos_reducer() -> TypedReducer<Todos> {
    TypedReducer::new()
        .on(|todos: &Todos, add: &AddTodo| {
            let mut next = todos.clone();
            next.insert(add.0.id, add.0.clone());
            next
        })
        .on(|todos: &Todos, toggle: &ToggleComplete| {
            update(todos, toggle.0, |todo| todo.completed = !todo.completed)
        })
        .on(|todos: &Todos, change: &UpdateTodoText| {
            update(todos, change.id, |todo| todo.text = change.text.clone())
        })
        .on(|todos: &Todos, remove: &RemoveTodo| {
            let mut next = todos.clone();
            next.remove(&remove.0);
            next
        })
        .on(|todos: &Todos, _: &RemoveCompleted| {
            todos
                .iter()
                .filter(|(_, todo)| !todo.completed)
                .map(|(id, todo)| (*id, todo.clone()))
                .collect()
        })
        .on(|todos: &Todos, _: &CompleteAllTodos| mark_all(todos, true))
        .on(|todos: &Todos, _: &MarkAllTodosAsActive| mark_all(todos, false))
}

fn update(todos: &Todos, id: u32, change: impl FnOnce(&mut TodoItem)) -> Todos {
    let mut next = todos.clone();
    if let Some(todo) = next.get_mut(&id) {
        change(todo);
    }
    next
}

fn mark_all(todos: &Todos, completed: bool) -> Todos {
    todos
        .iter()
        .map(|(id, todo)| {
            (
                *id,
                TodoItem {
                    completed,
                    ..todo.clone()
                },
            )
        })
        .collect()
}

fn editing_reducer() -> TypedReducer<Option<u32>> {
    TypedReducer::new()
        .on(|_: &Option<u32>, show: &ShowTodoEditor| Some(show.0))
        .on(|editing: &Option<u32>, hide: &HideTodoEditor| {
            if *editing == Some(hide.0) {
                None
            } else {
                *editing
            }
        })
        .on(|editing: &Option<u32>, remove: &RemoveTodo| {
            if *editing == Some(remove.0) {
                None
            } else {
                *editing
            }
        })
}

fn last_error_reducer() -> TypedReducer<Option<String>> {
    TypedReducer::new()
        .on(|_: &Option<String>, error: &ValidationError| Some(error.message.clone()))
        .on(|_: &Option<String>, failure: &LogicFailure| Some(failure.message()))
        .on(|_: &Option<String>, _: &AddTodo| None)
        .on(|_: &Option<String>, _: &UpdateTodoText| None)
}
