use std::sync::Arc;

use anyhow::{Context, Result};
use reflux_core::{Action, StoreBuilder, Store, UndoableState};
use reflux_logic::{configure_logic_with, LogicConfig};
use serde::Serialize;
use tracing::{info, warn};

use crate::command::Command;
use crate::config::FileConfig;
use crate::logic::{AddTodoHandler, UpdateTodoTextHandler};
use crate::reducers::root_reducer;
use crate::state::{TodoItem, TodoList, TodoState};

/// A todo store with its logic installed.
pub struct TodoApp {
    store: Arc<dyn Store<TodoState>>,
}

impl TodoApp {
    /// Build the store from `config` and install the todo logic. Must be
    /// called inside a tokio runtime.
    pub fn new(config: &FileConfig, logic: LogicConfig) -> Result<Self> {
        let initial = UndoableState::new(TodoList::with_todos(config.todos.iter().cloned()));
        let store = StoreBuilder::new(root_reducer(config.history), initial).build();
        let store = configure_logic_with(store, logic, |registry| {
            registry.add(AddTodoHandler);
            registry.add(UpdateTodoTextHandler);
        })
        .context("Failed to install todo logic")?;

        info!(
            todos = config.todos.len(),
            history = config.history,
            "Todo store ready"
        );
        Ok(Self { store })
    }

    pub fn store(&self) -> &Arc<dyn Store<TodoState>> {
        &self.store
    }

    pub fn state(&self) -> Arc<TodoState> {
        self.store.state()
    }

    /// Dispatch and wait for the logic pipeline to finish with the action.
    pub async fn dispatch(&self, action: Action) -> Result<()> {
        self.store
            .dispatch(action)
            .wait()
            .await
            .context("Dispatch did not complete")
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        info!(?command, "Running command");
        self.dispatch(command.into_action()).await?;
        if let Some(error) = &self.state().present.last_error {
            warn!(error = %error, "Todo list reports an error");
        }
        Ok(())
    }

    /// Parse and run each script line in order. Stops at the first line that
    /// does not parse.
    pub async fn run_script<I>(&self, script: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for line in script {
            let line = line.as_ref();
            let command: Command = line
                .parse()
                .with_context(|| format!("Invalid command {line:?}"))?;
            self.run(command).await?;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(&*self.state())
    }
}

/// What the session prints when it ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub todos: Vec<TodoItem>,
    pub visible: Vec<u32>,
    pub editing: Option<u32>,
    pub active_count: usize,
    pub last_error: Option<String>,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl From<&TodoState> for Snapshot {
    fn from(state: &TodoState) -> Self {
        let list = &state.present;
        Self {
            todos: list.todos.values().cloned().collect(),
            visible: list.visible().map(|todo| todo.id).collect(),
            editing: list.editing,
            active_count: list.active_count(),
            last_error: list.last_error.clone(),
            can_undo: state.can_undo(),
            can_redo: state.can_redo(),
        }
    }
}
