//! Reporters that print findings to stdout.

use std::io::Write;

use wac_core::{Finding, Reporter};

/// Writes the human-readable verdict lines.
pub struct TextReporter<W> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl TextReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Reporter for TextReporter<W> {
    fn report(&mut self, finding: &Finding) {
        if let Err(e) = writeln!(self.out, "{finding}").and_then(|_| self.out.flush()) {
            tracing::error!("Failed to write finding: {e}");
        }
    }
}

/// Writes one JSON object per finding.
pub struct JsonReporter<W> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl JsonReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Reporter for JsonReporter<W> {
    fn report(&mut self, finding: &Finding) {
        let written = serde_json::to_writer(&mut self.out, finding)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.out))
            .and_then(|_| self.out.flush());
        if let Err(e) = written {
            tracing::error!("Failed to write finding: {e}");
        }
    }
}
