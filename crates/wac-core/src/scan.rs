//! Wires the pipeline together and runs it to completion.
//!
//! ```text
//! urls ─► requester × N ─► merge ─► classifier ─► cleanup ─► done
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::classifier::{self, Classifier};
use crate::cleanup;
use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::pipeline::{merge, split, SharedReceiver};
use crate::requester::{spawn_worker, Requester};
use crate::verdict::Reporter;

/// Totals for a finished scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub granted: usize,
    pub denied: usize,
    pub errors: usize,
    /// Bodies still open when they reached cleanup.
    pub released: usize,
}

impl ScanSummary {
    pub fn total(&self) -> usize {
        self.granted + self.denied + self.errors
    }
}

/// Request every URL from `urls` and report one finding per URL.
///
/// Configuration is validated and the shared client built before any
/// request is made; a bad config returns an error without touching the
/// network. Per-URL failures never abort the scan, but a stage task that
/// panics does, since its totals can no longer be trusted.
pub async fn run<R>(
    config: &ScanConfig,
    urls: mpsc::Receiver<String>,
    reporter: R,
) -> ScanResult<ScanSummary>
where
    R: Reporter + 'static,
{
    config.validate()?;
    let requester = Arc::new(Requester::new(config)?);

    tracing::info!(
        "Starting scan with {} workers, {}s wait",
        config.workers,
        config.wait.as_secs()
    );

    let source = SharedReceiver::new(urls);
    let mut next_id = 0usize;
    let workers = split(config.workers, || {
        next_id += 1;
        spawn_worker(next_id, source.clone(), Arc::clone(&requester))
    });

    let classifier = Classifier::new(config.rules.clone());
    let (classified, tally) = classifier::spawn(classifier, merge(workers), reporter);
    let done = cleanup::spawn(classified);

    let stats = done.await.map_err(|source| ScanError::Stage {
        stage: "cleanup",
        source,
    });
    let tally = tally.await.map_err(|source| ScanError::Stage {
        stage: "classifier",
        source,
    })?;
    let stats = stats?;

    let summary = ScanSummary {
        granted: tally.granted,
        denied: tally.denied,
        errors: tally.errors,
        released: stats.released,
    };

    tracing::info!(
        "Scan complete: {} urls, {} granted, {} denied, {} errors",
        summary.total(),
        summary.granted,
        summary.denied,
        summary.errors
    );

    Ok(summary)
}
