//! Core data types for the takeover detector
//!
//! - `Fingerprint`: one service signature from the fingerprint document
//! - `Verdict`: the classification of a single candidate
//! - `Settings`: the runtime knobs consumed by the detection core
//! - `ScanStats`: counters collected while a scan runs
//! - `IntegrityResult`: outcome of comparing local and remote fingerprints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A literal response-body signature of an unclaimed third-party endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub service: String,
    #[serde(rename = "fingerprint")]
    pub signature: String,
}

impl Fingerprint {
    #[inline]
    #[must_use]
    pub fn new<S: Into<String>, T: Into<String>>(service: S, signature: T) -> Self {
        Self {
            service: service.into(),
            signature: signature.into(),
        }
    }

    /// Literal, case-sensitive containment check against a response body.
    #[inline]
    #[must_use]
    pub fn matches(&self, body: &str) -> bool {
        !self.signature.is_empty() && body.contains(self.signature.as_str())
    }
}

/// Why a candidate could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Timeout,
    Cancelled,
}

impl ErrorKind {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

/// Classification outcome for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Vulnerable,
    NotVulnerable,
    Error(ErrorKind),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Vulnerable => f.write_str("vulnerable"),
            Status::NotVulnerable => f.write_str("not vulnerable"),
            Status::Error(kind) => write!(f, "error: {}", kind.as_str()),
        }
    }
}

/// Verdict for a single candidate.
///
/// Fields are private so that `matched` is present exactly when the status is
/// `Vulnerable`; the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    candidate: String,
    status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    matched: Option<Fingerprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl Verdict {
    #[must_use]
    pub fn vulnerable<S: Into<String>>(candidate: S, matched: Fingerprint) -> Self {
        Self {
            candidate: candidate.into(),
            status: Status::Vulnerable,
            matched: Some(matched),
            detail: None,
        }
    }

    #[must_use]
    pub fn not_vulnerable<S: Into<String>>(candidate: S) -> Self {
        Self {
            candidate: candidate.into(),
            status: Status::NotVulnerable,
            matched: None,
            detail: None,
        }
    }

    /// Error verdict; `detail` keeps the underlying cause for reporting.
    #[must_use]
    pub fn error<S: Into<String>>(candidate: S, kind: ErrorKind, detail: Option<String>) -> Self {
        Self {
            candidate: candidate.into(),
            status: Status::Error(kind),
            matched: None,
            detail,
        }
    }

    #[must_use]
    pub fn cancelled<S: Into<String>>(candidate: S) -> Self {
        Self::error(candidate, ErrorKind::Cancelled, None)
    }

    #[inline]
    #[must_use]
    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    #[inline]
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    #[inline]
    #[must_use]
    pub fn matched(&self) -> Option<&Fingerprint> {
        self.matched.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn is_vulnerable(&self) -> bool {
        matches!(self.status, Status::Vulnerable)
    }
}

/// Runtime settings of the detection core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Prefix bare hostnames with `https://` instead of `http://`.
    pub prefer_https: bool,
    /// Number of concurrent probe workers.
    pub concurrency: usize,
    /// Upper bound for a single probe, body read included.
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefer_https: false,
            concurrency: 10,
            timeout: Duration::from_secs(10),
        }
    }
}

impl Settings {
    #[inline]
    #[must_use]
    pub fn with_https(mut self, prefer_https: bool) -> Self {
        self.prefer_https = prefer_https;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Worker count for `candidates` targets: at least one, never more than needed.
    #[inline]
    #[must_use]
    pub fn workers_for(&self, candidates: usize) -> usize {
        self.concurrency.max(1).min(candidates.max(1))
    }
}

/// Point-in-time comparison of the local and remote fingerprint documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityResult {
    pub up_to_date: bool,
    /// Hex SHA-256 of the local file.
    pub local_digest: String,
    /// Hex SHA-256 of the decoded remote document.
    pub remote_digest: String,
    pub checked_at: DateTime<Utc>,
}

/// Scan statistics collected incrementally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub total_targets: usize,
    pub scanned: usize,
    pub vulnerable: usize,
    pub not_vulnerable: usize,
    pub network_errors: usize,
    pub timeouts: usize,
    pub cancelled: usize,
    pub elapsed: Duration,
}

impl ScanStats {
    #[inline]
    #[must_use]
    pub fn new(total_targets: usize) -> Self {
        Self {
            total_targets,
            ..Default::default()
        }
    }

    /// Progress percentage in [0.0, 100.0].
    #[inline]
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.total_targets == 0 {
            0.0
        } else {
            (self.scanned as f32 / self.total_targets as f32) * 100.0
        }
    }

    /// Scanning rate (targets per second).
    #[inline]
    #[must_use]
    pub fn rate(&self) -> f32 {
        if self.elapsed.as_secs_f32() == 0.0 {
            0.0
        } else {
            self.scanned as f32 / self.elapsed.as_secs_f32()
        }
    }

    #[inline]
    #[must_use]
    pub fn errors(&self) -> usize {
        self.network_errors + self.timeouts + self.cancelled
    }

    pub fn update(&mut self, verdict: &Verdict) {
        self.scanned = self.scanned.saturating_add(1);
        let counter = match verdict.status() {
            Status::Vulnerable => &mut self.vulnerable,
            Status::NotVulnerable => &mut self.not_vulnerable,
            Status::Error(ErrorKind::Network) => &mut self.network_errors,
            Status::Error(ErrorKind::Timeout) => &mut self.timeouts,
            Status::Error(ErrorKind::Cancelled) => &mut self.cancelled,
        };
        *counter = counter.saturating_add(1);
    }
}
