//! Headless TodoMVC on a reflux store with logic.

pub mod actions;
pub mod app;
pub mod command;
pub mod config;
pub mod logic;
pub mod reducers;
pub mod state;

pub use app::{Snapshot, TodoApp};
pub use command::Command;
pub use config::{load_config, FileConfig};
pub use state::{TodoItem, TodoList, TodoState, VisibilityFilter};
