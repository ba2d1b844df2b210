use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// How long-running process steps are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LongRunningStrategy {
    /// Spawned as an ordinary task on the runtime.
    #[default]
    Task,
    /// Driven on tokio's blocking pool, one dedicated thread per step.
    Thread,
}

impl FromStr for LongRunningStrategy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "thread" => Ok(Self::Thread),
            other => bail!("unknown long-running strategy {other:?}, expected \"task\" or \"thread\""),
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicConfig {
    /// Drop `LogicFailure` actions nested deeper than this instead of
    /// re-dispatching them. `None` re-dispatches without limit.
    pub failure_redispatch_limit: Option<u32>,
    pub long_running: LongRunningStrategy,
}

impl LogicConfig {
    /// Load from `REFLUX_FAILURE_REDISPATCH_LIMIT` and `REFLUX_LONG_RUNNING`.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("REFLUX_FAILURE_REDISPATCH_LIMIT") {
            let limit = raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("REFLUX_FAILURE_REDISPATCH_LIMIT must be a number, got {raw:?}"))?;
            config.failure_redispatch_limit = Some(limit);
        }

        if let Some(raw) = lookup("REFLUX_LONG_RUNNING") {
            config.long_running = raw.parse().context("REFLUX_LONG_RUNNING")?;
        }

        Ok(config)
    }

    pub fn with_failure_redispatch_limit(mut self, limit: u32) -> Self {
        self.failure_redispatch_limit = Some(limit);
        self
    }

    pub fn with_long_running(mut self, strategy: LongRunningStrategy) -> Self {
        self.long_running = strategy;
        self
    }
}
