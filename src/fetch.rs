//! Byte-fetch service used by the loader
//!
//! Provides a trait for fetching image bytes so tests and alternative
//! transports can stand in for HTTP.

use crate::config::schema::FetchConfig;
use crate::error::{LogoError, LogoResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Bytes and metadata returned by a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Abstract byte-fetch interface
///
/// A fetch either returns the whole body or fails; there is no retry at
/// this layer.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the resource at `url`
    async fn fetch(&self, url: &Url) -> LogoResult<Fetched>;

    /// Human-readable transport name for logs
    fn name(&self) -> &'static str;
}

/// HTTP(S) fetcher backed by a shared `ureq` agent
///
/// `ureq` is blocking, so each request runs on tokio's blocking pool.
pub struct HttpFetcher {
    agent: ureq::Agent,
    user_agent: String,
    max_bytes: u64,
}

impl HttpFetcher {
    /// Create a fetcher from the `[fetch]` config section
    pub fn new(config: &FetchConfig) -> Self {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> LogoResult<Fetched> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let user_agent = self.user_agent.clone();
        let max_bytes = self.max_bytes;

        let task_url = url.clone();
        tokio::task::spawn_blocking(move || {
            fetch_blocking(&agent, &task_url, &user_agent, max_bytes)
        })
        .await
        .map_err(|e| LogoError::fetch_failed(url, format!("fetch task join error: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn fetch_blocking(
    agent: &ureq::Agent,
    url: &str,
    user_agent: &str,
    max_bytes: u64,
) -> LogoResult<Fetched> {
    debug!("GET {}", url);

    // Non-2xx statuses come back as `ureq::Error::StatusCode`
    let mut response = agent
        .get(url)
        .header("User-Agent", user_agent)
        .call()
        .map_err(|e| LogoError::fetch_failed(url, e))?;

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = response
        .body_mut()
        .with_config()
        .limit(max_bytes)
        .read_to_vec()
        .map_err(|e| LogoError::fetch_failed(url, e))?;

    debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(Fetched {
        bytes,
        content_type,
    })
}
