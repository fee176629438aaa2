//! Detection engine: probe a candidate and classify the response

use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, instrument};

use takeover_common::{ErrorKind, Prober, Settings, Verdict};
use takeover_fingerprint::FingerprintStore;

/// Classify a response body against the store. The earliest-listed matching
/// fingerprint decides the verdict.
#[must_use]
pub fn classify(candidate: &str, body: &str, store: &FingerprintStore) -> Verdict {
    match store.find_match(body) {
        Some(fp) => Verdict::vulnerable(candidate, fp.clone()),
        None => Verdict::not_vulnerable(candidate),
    }
}

/// Probe `candidate` and classify it. Never fails: unreachable or slow
/// candidates become error verdicts.
pub async fn detect(
    prober: &dyn Prober,
    candidate: &str,
    settings: &Settings,
    store: &FingerprintStore,
) -> Verdict {
    let probe = prober.probe(candidate, settings.prefer_https);
    match timeout(settings.timeout, probe).await {
        Ok(Ok(body)) => classify(candidate, &body, store),
        Ok(Err(e)) => {
            debug!(error = %e, "Probe failed");
            Verdict::error(candidate, e.verdict_kind(), Some(e.to_string()))
        }
        Err(_) => Verdict::error(
            candidate,
            ErrorKind::Timeout,
            Some(format!("no response within {:?}", settings.timeout)),
        ),
    }
}

/// Bundles a prober, a fingerprint snapshot and settings for repeated detection.
pub struct Detector {
    prober: Arc<dyn Prober>,
    store: FingerprintStore,
    settings: Settings,
}

impl Detector {
    pub fn new(prober: Arc<dyn Prober>, store: FingerprintStore, settings: Settings) -> Self {
        Self {
            prober,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[instrument(skip(self), fields(prober = self.prober.name()))]
    pub async fn detect(&self, candidate: &str) -> Verdict {
        let verdict = detect(self.prober.as_ref(), candidate, &self.settings, &self.store).await;
        debug!(status = %verdict.status(), "Candidate classified");
        verdict
    }
}
