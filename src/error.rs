//! Error types for the reclaim CLI.
//!
//! Every fallible operation returns [`ReclaimError`]; a declined
//! confirmation is not represented here because it is not a failure.

use thiserror::Error;

/// Main error type for prune operations.
#[derive(Error, Debug)]
pub enum ReclaimError {
    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(String),

    /// A filter was not in `name=value` form
    #[error("bad format of filter (expected name=value): {0}")]
    InvalidFilter(String),

    /// An API version string could not be parsed
    #[error("invalid API version '{0}'")]
    InvalidApiVersion(String),

    /// The daemon could not be reached at all
    #[error("Cannot connect to the daemon at {host}: {source}")]
    Unreachable {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    /// The daemon answered with an error status
    #[error("Error response from daemon: {0}")]
    Daemon(String),

    /// Any other transport failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The daemon's response body did not match the expected shape
    #[error("Failed to decode daemon response: {0}")]
    Decode(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results using ReclaimError.
pub type Result<T> = std::result::Result<T, ReclaimError>;
