//! In-memory fingerprint collection

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use takeover_common::{Fingerprint, TakeoverError, TakeoverResult};

use crate::matcher::first_match;

/// One entry of the fingerprint document. Keys other than these two
/// (`cname`, `status`, `nxdomain`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct FingerprintRecord {
    #[serde(alias = "name")]
    service: String,
    #[serde(default)]
    fingerprint: String,
}

/// Immutable, ordered snapshot of the fingerprint database.
///
/// Cloning is cheap and shares the same collection; refreshing the database
/// means building a new store, never editing this one.
#[derive(Debug, Clone)]
pub struct FingerprintStore {
    fingerprints: Arc<[Fingerprint]>,
}

impl FingerprintStore {
    /// Load the persisted fingerprint document from `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> TakeoverResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            TakeoverError::io(format!("reading fingerprints from {}", path.display()), e)
        })?;
        let store = Self::from_slice(&bytes)?;
        info!("Loaded {} fingerprints", store.len());
        Ok(store)
    }

    /// Parse a fingerprint document (a JSON array of records).
    ///
    /// Either the whole document parses or nothing is returned. Records with an
    /// empty signature are dropped since they would match every body.
    pub fn from_slice(bytes: &[u8]) -> TakeoverResult<Self> {
        let records: Vec<FingerprintRecord> = serde_json::from_slice(bytes)
            .map_err(|e| TakeoverError::Parse(format!("fingerprint document: {e}")))?;

        let total = records.len();
        let fingerprints: Vec<Fingerprint> = records
            .into_iter()
            .filter_map(|r| {
                if r.fingerprint.is_empty() {
                    debug!(service = %r.service, "Skipping fingerprint with empty signature");
                    None
                } else {
                    Some(Fingerprint::new(r.service, r.fingerprint))
                }
            })
            .collect();

        if fingerprints.len() < total {
            debug!("Dropped {} records without a signature", total - fingerprints.len());
        }
        Ok(Self::from_fingerprints(fingerprints))
    }

    #[must_use]
    pub fn from_fingerprints(fingerprints: Vec<Fingerprint>) -> Self {
        Self {
            fingerprints: fingerprints.into(),
        }
    }

    /// Read-only view in document order.
    #[inline]
    #[must_use]
    pub fn all(&self) -> &[Fingerprint] {
        &self.fingerprints
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// First fingerprint, in document order, contained in `body`.
    #[inline]
    #[must_use]
    pub fn find_match(&self, body: &str) -> Option<&Fingerprint> {
        first_match(&self.fingerprints, body)
    }
}

impl Default for FingerprintStore {
    fn default() -> Self {
        Self::from_fingerprints(Vec::new())
    }
}
