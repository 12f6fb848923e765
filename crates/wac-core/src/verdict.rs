//! Classification outcomes and the seam through which they are reported.

use std::fmt;

use serde::Serialize;

/// Which detection rule denied access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum DenyReason {
    Status { code: u16 },
    Redirect { location: String },
    Body { needle: String },
}

/// Outcome of classifying one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Granted,
    Denied { reason: DenyReason },
    /// The request failed; `timed_out` is set when the deadline expired.
    Error { timed_out: bool },
    /// The response arrived but its body could not be read.
    BodyUnreadable,
}

impl Verdict {
    pub fn is_granted(&self) -> bool {
        matches!(self, Verdict::Granted)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Verdict::Denied { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Verdict::Error { .. } | Verdict::BodyUnreadable)
    }
}

/// A verdict for a specific URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub url: String,
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl Finding {
    pub fn new(url: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            url: url.into(),
            verdict,
        }
    }
}

/// Human-readable verdict lines. A timeout renders as two lines.
impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = &self.url;
        match &self.verdict {
            Verdict::Granted => write!(f, "[+] {url}: GRANTED ACCESS"),
            Verdict::Denied { reason } => match reason {
                DenyReason::Status { code } => {
                    write!(f, "[-] {url}: DENIED Status Code ({code}) returned")
                }
                DenyReason::Redirect { location } => {
                    write!(f, "[-] {url}: DENIED Redirect ({location}) returned")
                }
                DenyReason::Body { needle } => write!(f, "[-] {url}: DENIED Body contains ({needle})"),
            },
            Verdict::Error { timed_out } => {
                if *timed_out {
                    writeln!(f, "[-] {url}: Request timed out")?;
                }
                write!(f, "[!] {url}: Error making request")
            }
            Verdict::BodyUnreadable => write!(f, "[!] {url}: Could not read body"),
        }
    }
}

/// Receives one finding per URL, in the order the classifier produces them.
pub trait Reporter: Send {
    fn report(&mut self, finding: &Finding);
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&mut self, finding: &Finding) {
        (**self).report(finding)
    }
}
