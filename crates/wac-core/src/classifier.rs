//! Applies detection rules to each record and reports a verdict.
//!
//! Rules run in a fixed order and stop at the first match: status, then
//! redirect, then body. Status and redirect only inspect headers; the body
//! rule reads (and so consumes) the response.

use std::sync::Arc;

use reqwest::header::LOCATION;
use reqwest::Response;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::DetectionRules;
use crate::pipeline::stage;
use crate::record::{Outcome, Record};
use crate::verdict::{DenyReason, Finding, Reporter, Verdict};

/// Verdict counts accumulated by the classifier stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub granted: usize,
    pub denied: usize,
    pub errors: usize,
}

impl Tally {
    fn add(&mut self, verdict: &Verdict) {
        if verdict.is_granted() {
            self.granted += 1;
        } else if verdict.is_denied() {
            self.denied += 1;
        } else {
            self.errors += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.granted + self.denied + self.errors
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Arc<DetectionRules>,
}

impl Classifier {
    pub fn new(rules: DetectionRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    pub fn rules(&self) -> &DetectionRules {
        &self.rules
    }

    /// Decide the verdict for `record`, possibly consuming its body.
    ///
    /// The URL is left untouched. If the body rule ran, the outcome becomes
    /// [`Outcome::Drained`].
    pub async fn classify(&self, record: &mut Record) -> Verdict {
        match &record.outcome {
            Outcome::Failed(err) => {
                return Verdict::Error {
                    timed_out: err.is_timeout(),
                }
            }
            Outcome::Drained { .. } => {
                tracing::warn!("{}: classified after its body was drained", record.url);
                return Verdict::BodyUnreadable;
            }
            Outcome::Response(response) => {
                if let Some(verdict) = self.header_verdict(response) {
                    return verdict;
                }
            }
        }

        let Some(needle) = &self.rules.body else {
            return Verdict::Granted;
        };

        let Some(response) = record.take_response() else {
            return Verdict::BodyUnreadable;
        };

        match response.bytes().await {
            Ok(body) if contains(&body, needle.as_bytes()) => Verdict::Denied {
                reason: DenyReason::Body {
                    needle: needle.clone(),
                },
            },
            Ok(_) => Verdict::Granted,
            Err(e) => {
                tracing::debug!("{}: body read failed: {e}", record.url);
                Verdict::BodyUnreadable
            }
        }
    }

    /// Status and redirect rules, which only look at headers.
    fn header_verdict(&self, response: &Response) -> Option<Verdict> {
        if let Some(code) = self.rules.status {
            if response.status().as_u16() == code {
                return Some(Verdict::Denied {
                    reason: DenyReason::Status { code },
                });
            }
        }

        let target = self.rules.redirect.as_ref()?;
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok());
        (location == Some(target.as_str())).then(|| Verdict::Denied {
            reason: DenyReason::Redirect {
                location: target.clone(),
            },
        })
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

/// Run the classifier over `input`, reporting each verdict and forwarding
/// every record downstream. The handle resolves to the verdict tally once
/// the input is exhausted.
pub fn spawn<R>(
    classifier: Classifier,
    mut input: mpsc::Receiver<Record>,
    mut reporter: R,
) -> (mpsc::Receiver<Record>, JoinHandle<Tally>)
where
    R: Reporter + 'static,
{
    let (tx, rx) = stage();

    let handle = tokio::spawn(async move {
        let mut tally = Tally::default();
        let mut downstream_open = true;

        while let Some(mut record) = input.recv().await {
            let verdict = classifier.classify(&mut record).await;
            tally.add(&verdict);
            reporter.report(&Finding::new(record.url.clone(), verdict));

            // Keep classifying even if cleanup has gone away; dropping the
            // record here releases its body instead.
            if downstream_open && tx.send(record).await.is_err() {
                tracing::warn!("Cleanup stage closed early");
                downstream_open = false;
            }
        }

        tally
    });

    (rx, handle)
}
