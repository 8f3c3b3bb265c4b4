//! Basic (single action) step.

use crate::errors::BlockError;
use std::fmt;

type Action = Box<dyn Fn() -> Result<(), BlockError> + Send + Sync>;

/// A step consisting of one fallible action.
pub struct BasicTaskStep {
    name: String,
    action: Action,
}

impl BasicTaskStep {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn() -> Result<(), BlockError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            action: Box::new(action),
        }
    }

    /// A step that does nothing.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, || Ok(()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn run(&self) -> Result<(), BlockError> {
        (self.action)()
    }
}

impl fmt::Debug for BasicTaskStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicTaskStep")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
