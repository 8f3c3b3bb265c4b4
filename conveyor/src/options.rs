//! Executor configuration.

use crate::errors::{ConveyorError, ConveyorResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable selecting the pipeline strategy.
pub const STRATEGY_ENV: &str = "CONVEYOR_STRATEGY";
/// Environment variable bounding the streaming executor's stage channels.
pub const CHANNEL_CAPACITY_ENV: &str = "CONVEYOR_CHANNEL_CAPACITY";

/// How pipeline steps are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStrategy {
    /// Each item runs through every block before the next item starts.
    #[default]
    Sequential,
    /// One worker per block, items flow between blocks through channels.
    Streaming,
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStrategy::Sequential => f.write_str("sequential"),
            ExecutionStrategy::Streaming => f.write_str("streaming"),
        }
    }
}

impl FromStr for ExecutionStrategy {
    type Err = ConveyorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(ExecutionStrategy::Sequential),
            "streaming" => Ok(ExecutionStrategy::Streaming),
            other => Err(ConveyorError::Config(format!(
                "unknown execution strategy '{}'",
                other
            ))),
        }
    }
}

/// Options for [`TaskExecutor`](crate::TaskExecutor).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorOptions {
    /// Strategy used for pipeline steps.
    pub strategy: ExecutionStrategy,
    /// Capacity of each channel between streaming stages.
    /// `None` means unbounded; with a bound, a full channel blocks its sender.
    pub channel_capacity: Option<usize>,
}

impl ExecutorOptions {
    pub fn sequential() -> Self {
        Self::default()
    }

    pub fn streaming() -> Self {
        Self {
            strategy: ExecutionStrategy::Streaming,
            channel_capacity: None,
        }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    /// Read options from `CONVEYOR_STRATEGY` and `CONVEYOR_CHANNEL_CAPACITY`,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> ConveyorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConveyorResult<Self> {
        let mut options = Self::default();

        if let Some(value) = lookup(STRATEGY_ENV) {
            options.strategy = value.parse()?;
        }

        if let Some(value) = lookup(CHANNEL_CAPACITY_ENV) {
            let capacity = value.trim().parse::<usize>().map_err(|e| {
                ConveyorError::Config(format!(
                    "invalid {} '{}': {}",
                    CHANNEL_CAPACITY_ENV, value, e
                ))
            })?;
            options.channel_capacity = Some(capacity);
        }

        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> ConveyorResult<()> {
        if self.channel_capacity == Some(0) {
            return Err(ConveyorError::Config(
                "channel capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
