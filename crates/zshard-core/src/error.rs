//! Error types for the store.

use thiserror::Error;

/// Errors returned by store operations.
///
/// Running out of memory is not represented here: allocation failure
/// aborts the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A score was NaN. NaN has no place in the score ordering.
    #[error("invalid score {score}: scores must not be NaN")]
    InvalidScore { score: f64 },

    /// A range bound was NaN.
    #[error("invalid range bound: min and max must not be NaN")]
    InvalidBound,

    /// The store configuration was rejected at construction.
    #[error("invalid store config: {0}")]
    InvalidConfig(String),
}
