//! Validation outcomes and the failure values re-dispatched as actions.

use std::fmt;
use std::sync::Arc;

use reflux_core::ActionType;
use serde::Serialize;
use thiserror::Error;

/// One field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDetail {
    pub key: String,
    pub message: String,
}

impl ValidationDetail {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// A rejected action. Dispatched as an action in its own right when a unit's
/// validation fails.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub details: Vec<ValidationDetail>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        details: impl IntoIterator<Item = ValidationDetail>,
    ) -> Self {
        Self {
            message: message.into(),
            details: details.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(ValidationError),
}

impl Validation {
    pub fn invalid(message: impl Into<String>) -> Self {
        Validation::Invalid(ValidationError::new(message))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

/// An unexpected error from a logic hook, re-dispatched as an action so
/// other units and reducers can react to it.
#[derive(Clone)]
pub struct LogicFailure {
    /// Type of the action whose pipeline run failed.
    pub action_type: ActionType,
    pub error: Arc<anyhow::Error>,
    /// How many failures this one is nested inside. A failure raised while
    /// handling a `LogicFailure` of depth `n` has depth `n + 1`.
    pub depth: u32,
}

impl LogicFailure {
    pub fn message(&self) -> String {
        format!("{:#}", self.error)
    }
}

impl fmt::Debug for LogicFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogicFailure")
            .field("action_type", &self.action_type)
            .field("error", &self.message())
            .field("depth", &self.depth)
            .finish()
    }
}
