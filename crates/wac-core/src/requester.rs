//! Issues one GET per URL with the configured headers and deadline.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, COOKIE};
use reqwest::redirect::Policy;
use tokio::sync::mpsc;

use crate::config::{Credentials, ScanConfig};
use crate::error::{ConfigError, ConfigResult, RequestError};
use crate::pipeline::{stage, SharedReceiver};
use crate::record::Record;

const USER_AGENT: &str = concat!("wac/", env!("CARGO_PKG_VERSION"));

/// Shared request issuer.
///
/// The client and headers are fixed at construction. Redirects are never
/// followed, so 3xx responses reach the classifier with their `Location`.
#[derive(Debug, Clone)]
pub struct Requester {
    client: reqwest::Client,
    headers: HeaderMap,
    wait: Duration,
}

impl Requester {
    pub fn new(config: &ScanConfig) -> ConfigResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            headers: build_headers(config)?,
            wait: config.wait,
        })
    }

    /// Headers attached to every request.
    #[cfg(test)]
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Perform exactly one GET for `url`.
    pub async fn fetch(&self, url: String) -> Record {
        tracing::debug!("GET {url}");

        let result = self
            .client
            .get(url.as_str())
            .headers(self.headers.clone())
            .timeout(self.wait)
            .send()
            .await
            .map_err(|e| RequestError::from_reqwest(e, self.wait));

        if let Err(e) = &result {
            tracing::debug!("{url}: {e}");
        }

        Record::new(url, result)
    }
}

fn build_headers(config: &ScanConfig) -> ConfigResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(cookie) = &config.cookie {
        let value = HeaderValue::from_str(cookie).map_err(|e| ConfigError::InvalidHeader {
            name: "Cookie",
            reason: e.to_string(),
        })?;
        headers.insert(COOKIE, value);
    }

    if let Some(credentials) = &config.credentials {
        headers.insert(AUTHORIZATION, basic_auth(credentials)?);
    }

    Ok(headers)
}

fn basic_auth(credentials: &Credentials) -> ConfigResult<HeaderValue> {
    let token = STANDARD.encode(format!("{}:{}", credentials.username, credentials.password));
    let mut value = HeaderValue::from_str(&format!("Basic {token}")).map_err(|e| {
        ConfigError::InvalidHeader {
            name: "Authorization",
            reason: e.to_string(),
        }
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Start one requester task pulling URLs from `source` until it runs dry.
pub fn spawn_worker(
    id: usize,
    source: SharedReceiver<String>,
    requester: Arc<Requester>,
) -> mpsc::Receiver<Record> {
    let (tx, rx) = stage();

    tokio::spawn(async move {
        let mut issued = 0usize;
        while let Some(url) = source.recv().await {
            let record = requester.fetch(url).await;
            issued += 1;
            if tx.send(record).await.is_err() {
                tracing::warn!("Worker {id}: downstream closed, stopping");
                break;
            }
        }
        tracing::debug!("Worker {id} finished after {issued} requests");
    });

    rx
}
