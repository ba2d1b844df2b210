use anyhow::{Context, Result};
use reflux_core::undoable::DEFAULT_HISTORY;
use serde::Deserialize;
use std::path::Path;

use crate::state::TodoItem;

/// TOML-backed session configuration. Engine tuning (failure re-dispatch
/// limit, long-running strategy) stays in env vars.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Undo steps kept.
    #[serde(default = "default_history")]
    pub history: usize,
    /// Todos present before the session starts.
    #[serde(default)]
    pub todos: Vec<TodoItem>,
    /// Commands run before any given on the command line.
    #[serde(default)]
    pub script: Vec<String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            history: DEFAULT_HISTORY,
            todos: Vec::new(),
            script: Vec::new(),
        }
    }
}

fn default_history() -> usize {
    DEFAULT_HISTORY
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<FileConfig> {
    let config: FileConfig = toml::from_str(content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(parse_config("").unwrap(), FileConfig::default());
    }

    #[test]
    fn parses_history_seed_todos_and_script() {
        let config = parse_config(
            r#"
            history = 3
            script = ["toggle:1", "filter:active"]

            [[todos]]
            id = 1
            text = "Buy milk"

            [[todos]]
            id = 2
            text = "Walk dog"
            completed = true
            "#,
        )
        .unwrap();

        assert_eq!(config.history, 3);
        assert_eq!(
            config.todos,
            vec![
                TodoItem::new(1, "Buy milk", false),
                TodoItem::new(2, "Walk dog", true)
            ]
        );
        assert_eq!(config.script, vec!["toggle:1", "filter:active"]);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = parse_config("histroy = 3").unwrap_err();
        assert!(format!("{err:#}").contains("histroy"));
    }
}
