//! Error types for configuration, scan and per-URL request failures.

use std::time::Duration;

/// Errors raised while building or validating a [`ScanConfig`](crate::ScanConfig).
///
/// All of these are fatal: the pipeline never starts.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Must supply either status, redirect or body rule to check")]
    NoDetectionRule,

    #[error("Threads can be between 1 and {max}, got {got}")]
    WorkersOutOfRange { got: usize, max: usize },

    #[error("Wait can be between 1 and {max} seconds, got {got}")]
    WaitOutOfRange { got: u64, max: u64 },

    #[error("Status {0} is invalid, must be between 100 and 999")]
    InvalidStatus(u16),

    #[error("Auth value is invalid, must be provided as 'username:password'")]
    MalformedCredentials,

    #[error("Invalid {name} header value: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors that end a scan.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A pipeline stage panicked or was cancelled; its totals are lost.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Why a single request produced no response.
#[derive(thiserror::Error, Debug)]
pub enum RequestError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl RequestError {
    /// Map a reqwest failure, separating deadline expiry from everything else.
    pub fn from_reqwest(err: reqwest::Error, wait: Duration) -> Self {
        if err.is_timeout() {
            RequestError::Timeout(wait)
        } else {
            RequestError::Transport(err)
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RequestError::Timeout(_))
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ScanResult<T> = Result<T, ScanError>;
