//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum RelayError {
    /// A configuration constraint was violated.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The policy assigns zero probability mass to every valid action.
    #[error("no valid action has positive probability mass")]
    NoValidAction,
}
