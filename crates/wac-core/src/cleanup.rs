//! Final stage: releases any response body still held by a record.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::record::Record;

/// What cleanup saw while draining the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub records: usize,
    /// Bodies that were still open and got released here.
    pub released: usize,
}

/// Drain `input`, releasing every open body. The handle resolves once the
/// input has closed, which marks the end of the whole pipeline.
pub fn spawn(mut input: mpsc::Receiver<Record>) -> JoinHandle<CleanupStats> {
    tokio::spawn(async move {
        let mut stats = CleanupStats::default();
        while let Some(mut record) = input.recv().await {
            stats.records += 1;
            if record.release() {
                stats.released += 1;
            }
        }
        tracing::debug!(
            "Cleanup drained {} records, released {} bodies",
            stats.records,
            stats.released
        );
        stats
    })
}
