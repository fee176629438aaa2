//! Candidate normalization

use url::Url;

/// True when `candidate` is already an absolute `http`/`https` URL with a host.
#[must_use]
pub fn is_absolute_http_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

/// Turn a hostname or URL into the URL that gets probed.
///
/// Absolute `http`/`https` URLs are kept as given. Anything else gets a scheme
/// prefix: `https://` with `prefer_https`, `http://` otherwise.
#[must_use]
pub fn normalize_candidate(candidate: &str, prefer_https: bool) -> String {
    let candidate = candidate.trim();
    if is_absolute_http_url(candidate) {
        return candidate.to_string();
    }
    let scheme = if prefer_https { "https" } else { "http" };
    format!("{scheme}://{candidate}")
}
