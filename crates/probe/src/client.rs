//! HTTP probe implementation

use async_trait::async_trait;
use reqwest::Client;
use std::error::Error as _;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, instrument};

use takeover_common::{Prober, TakeoverError, TakeoverResult};

use crate::normalize::normalize_candidate;

/// Response bodies are cut off after this many bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Issues one GET per candidate and returns the (bounded) response body.
pub struct HttpProber {
    client: Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpProber {
    /// Create a prober whose requests, body read included, end after `timeout`.
    ///
    /// Connections are not pooled: each probe closes its socket once the body
    /// has been read, so a long candidate list never piles up idle sockets.
    pub fn new(timeout: Duration) -> TakeoverResult<Self> {
        // Unclaimed endpoints routinely present certificates for another name.
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .user_agent(concat!("takeover/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| TakeoverError::Network(format!("building HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// Set the response body size limit.
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> TakeoverResult<String> {
        let mut resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;
        debug!(status = %resp.status(), "Response received");

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(|e| transport_error(url, e))? {
            let room = self.max_body_bytes - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                debug!(limit = self.max_body_bytes, "Body truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, candidate: &str, prefer_https: bool) -> TakeoverResult<String> {
        let url = normalize_candidate(candidate, prefer_https);
        match timeout(self.timeout, self.fetch(&url)).await {
            Ok(result) => result,
            Err(_) => Err(TakeoverError::Timeout(format!(
                "{url}: no complete response within {:?}",
                self.timeout
            ))),
        }
    }

    fn name(&self) -> &str {
        "HTTP Prober"
    }
}

/// Map a reqwest failure, keeping the full cause chain in the message.
fn transport_error(url: &str, err: reqwest::Error) -> TakeoverError {
    let mut msg = format!("{url}: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }

    if err.is_timeout() {
        TakeoverError::Timeout(msg)
    } else {
        TakeoverError::Network(msg)
    }
}
