//! The per-URL unit that flows through every stage after the requester.

use reqwest::{Response, StatusCode};

use crate::error::RequestError;

/// What became of the request for one URL.
#[derive(Debug)]
pub enum Outcome {
    /// A response whose body is still open.
    Response(Response),
    /// A response whose body has already been read or released.
    Drained { status: StatusCode },
    /// No response: transport failure or timeout.
    Failed(RequestError),
}

/// One URL and its outcome. The URL is never modified after creation.
#[derive(Debug)]
pub struct Record {
    pub url: String,
    pub outcome: Outcome,
}

impl Record {
    pub fn new(url: String, result: Result<Response, RequestError>) -> Self {
        let outcome = match result {
            Ok(response) => Outcome::Response(response),
            Err(err) => Outcome::Failed(err),
        };
        Self { url, outcome }
    }

    pub fn response(&self) -> Option<&Response> {
        match &self.outcome {
            Outcome::Response(response) => Some(response),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RequestError> {
        match &self.outcome {
            Outcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Whether a live body is still held.
    pub fn holds_body(&self) -> bool {
        matches!(self.outcome, Outcome::Response(_))
    }

    /// Drop the live response, if any, and return whether one was released.
    ///
    /// Calling this again, or on a failed record, does nothing.
    pub fn release(&mut self) -> bool {
        self.take_response().is_some()
    }

    /// Move the live response out, leaving the record drained.
    pub fn take_response(&mut self) -> Option<Response> {
        let Outcome::Response(response) = &self.outcome else {
            return None;
        };
        let status = response.status();
        match std::mem::replace(&mut self.outcome, Outcome::Drained { status }) {
            Outcome::Response(response) => Some(response),
            _ => None,
        }
    }
}
