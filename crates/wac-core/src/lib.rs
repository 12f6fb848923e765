//! wac core — concurrent request-and-classify pipeline for checking URL access control.
//!
//! URLs are fetched by a bounded pool of requesters, merged into one stream,
//! classified as granted or denied by configurable rules, and finally
//! released by a cleanup stage.

pub mod classifier;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod requester;
pub mod scan;
pub mod verdict;

pub use classifier::{Classifier, Tally};
pub use cleanup::CleanupStats;
pub use config::{
    Credentials, DetectionRules, ScanConfig, DEFAULT_WAIT_SECS, DEFAULT_WORKERS, MAX_WAIT_SECS,
    MAX_WORKERS,
};
pub use error::{ConfigError, ConfigResult, RequestError, ScanError, ScanResult};
pub use pipeline::{merge, split, SharedReceiver};
pub use record::{Outcome, Record};
pub use requester::Requester;
pub use scan::{run, ScanSummary};
pub use verdict::{DenyReason, Finding, Reporter, Verdict};
