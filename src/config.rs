// src/config.rs

use crate::error::{Result, TreeError};

pub const MIN_DEGREE: usize = 3; // smallest branching factor that leaves both split halves routable
pub const DEFAULT_DEGREE: usize = 4; // branching factor of the reference layout

/// Branching-factor configuration, fixed for the lifetime of a tree.
///
/// The leaf and internal capacity rules are separate methods on purpose:
/// each is derived from the degree on its own, neither from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    degree: usize,
}

impl TreeConfig {
    /// Validates `degree` and builds a configuration from it.
    pub fn new(degree: usize) -> Result<Self> {
        if degree < MIN_DEGREE {
            return Err(TreeError::Configuration {
                degree,
                min: MIN_DEGREE,
            });
        }
        Ok(Self { degree })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Key count at which a leaf is overflowed and must split.
    pub fn leaf_overflow(&self) -> usize {
        self.degree
    }

    /// Key count at which an internal node is overflowed (it then routes to
    /// `degree` children) and must split.
    pub fn inner_overflow(&self) -> usize {
        self.degree - 1
    }

    /// Number of keys a splitting leaf keeps: `ceil((degree + 1) / 2)`.
    /// The last of them doubles as the separator.
    pub fn leaf_split_point(&self) -> usize {
        (self.degree + 2) / 2
    }

    /// Number of keys a splitting internal node keeps. The key right after
    /// them is promoted and everything past it moves to the new sibling.
    pub fn inner_split_point(&self) -> usize {
        (self.degree - 1) / 2
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            degree: DEFAULT_DEGREE,
        }
    }
}
