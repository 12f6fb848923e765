//! Request configuration and detection rules, validated once before a scan.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_WORKERS: usize = 10;
pub const MAX_WORKERS: usize = 100;
pub const DEFAULT_WAIT_SECS: u64 = 5;
pub const MAX_WAIT_SECS: u64 = 900;

/// Conditions whose match means access was denied.
///
/// Each rule is independently optional. Evaluation order is fixed:
/// status, then redirect, then body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionRules {
    pub status: Option<u16>,
    pub redirect: Option<String>,
    pub body: Option<String>,
}

impl DetectionRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, code: u16) -> Self {
        self.status = Some(code);
        self
    }

    /// Empty locations are treated as "no redirect rule".
    pub fn with_redirect(mut self, location: impl Into<String>) -> Self {
        self.redirect = Some(location.into()).filter(|s: &String| !s.is_empty());
        self
    }

    /// Empty needles are treated as "no body rule".
    pub fn with_body(mut self, needle: impl Into<String>) -> Self {
        self.body = Some(needle.into()).filter(|s: &String| !s.is_empty());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.redirect.is_none() && self.body.is_none()
    }
}

/// Basic-auth credentials parsed from `username:password`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl FromStr for Credentials {
    type Err = ConfigError;

    /// Splits on the first `:`, so passwords may themselves contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (username, password) = s.split_once(':').ok_or(ConfigError::MalformedCredentials)?;
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Immutable settings shared read-only by every requester.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Number of concurrent requesters.
    pub workers: usize,
    /// Per-request deadline.
    pub wait: Duration,
    pub cookie: Option<String>,
    pub credentials: Option<Credentials>,
    pub rules: DetectionRules,
}

impl ScanConfig {
    /// Create a config with default worker count and wait.
    pub fn new(rules: DetectionRules) -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            wait: Duration::from_secs(DEFAULT_WAIT_SECS),
            cookie: None,
            credentials: None,
            rules,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into()).filter(|s: &String| !s.is_empty());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Check every startup invariant. A config that passes can be scanned.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rules.is_empty() {
            return Err(ConfigError::NoDetectionRule);
        }

        if !(1..=MAX_WORKERS).contains(&self.workers) {
            return Err(ConfigError::WorkersOutOfRange {
                got: self.workers,
                max: MAX_WORKERS,
            });
        }

        // Sub-second waits are rejected along with zero.
        let secs = self.wait.as_secs();
        if !(1..=MAX_WAIT_SECS).contains(&secs) || self.wait > Duration::from_secs(MAX_WAIT_SECS) {
            return Err(ConfigError::WaitOutOfRange {
                got: secs,
                max: MAX_WAIT_SECS,
            });
        }

        if let Some(code) = self.rules.status {
            if !(100..=999).contains(&code) {
                return Err(ConfigError::InvalidStatus(code));
            }
        }

        Ok(())
    }
}
