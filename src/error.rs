//! Error handling for the cachetopo library
//!
//! Cache discovery itself never fails: a native query that comes back empty
//! degrades to a default value or an absent level. The error type here
//! covers the remaining, caller-visible conditions: out-of-range level
//! indices and probe registration misuse.

use thiserror::Error;

/// Main error type for the cachetopo library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheTopoError {
    /// Level index outside the fixed L1-L3 range
    #[error("Out of bounds: level index {index}, levels {size}")]
    OutOfBounds {
        /// The invalid level index
        index: usize,
        /// The number of cache levels (always 3)
        size: usize,
    },

    /// Probe registration or configuration errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl CacheTopoError {
    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get the error category as a string for logging/debugging
    pub fn category(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "bounds",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CacheTopoError>;

/// Assert that a level index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(CacheTopoError::out_of_bounds(index, size))
    } else {
        Ok(())
    }
}
