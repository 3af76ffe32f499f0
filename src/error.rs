//! Error types for volley

use thiserror::Error;

/// Configuration and setup failures. Failed requests are never reported
/// here; they only show up as error counts in a [`crate::Report`].
#[derive(Error, Debug)]
pub enum Error {
    /// A commander needs at least one attacker
    #[error("attacker count must be at least 1")]
    NoAttackers,

    #[error("invalid attack unit rate \"{value}\": {source}")]
    InvalidAttackUnitRate {
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("invalid attack time span \"{value}\": {source}")]
    InvalidTimeSpan {
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    /// The shared HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] isahc::Error),

    /// The tokio runtime could not be built
    #[error("failed to create tokio runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
