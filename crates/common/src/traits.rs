//! Core traits for takeover detector components

use crate::error::TakeoverResult;
use async_trait::async_trait;

/// Fetches the response body for a candidate host.
///
/// The detection engine only depends on this trait, so the HTTP client can be
/// swapped for an in-memory double in tests.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe a single candidate and return the full response body.
    ///
    /// Candidates that are not absolute URLs get `https://` when
    /// `prefer_https` is set, `http://` otherwise.
    async fn probe(&self, candidate: &str, prefer_https: bool) -> TakeoverResult<String>;

    /// Prober name/identifier
    fn name(&self) -> &str;
}
