// src/error.rs

use thiserror::Error;

/// Errors raised while configuring or mutating a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The branching factor is too small for the split rules to produce two
    /// non-empty halves.
    #[error("degree {degree} is below the minimum of {min}")]
    Configuration { degree: usize, min: usize },

    /// The node graph is inconsistent. Continuing would corrupt every later
    /// descent, so the operation is aborted.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl TreeError {
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        TreeError::InvariantViolation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TreeError>;
