//! Download and integrity verification of the fingerprint document

use chrono::Utc;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use takeover_common::{IntegrityResult, TakeoverError, TakeoverResult};
use takeover_fingerprint::{FingerprintStore, FINGERPRINTS_FILE};

use crate::config::SyncConfig;
use crate::envelope::decode_envelope;

/// Outcome of a successful `download`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub path: PathBuf,
    pub bytes: usize,
    pub fingerprints: usize,
}

/// Hex-encoded SHA-256 of a full buffer.
#[must_use]
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub struct Synchronizer {
    client: Client,
    config: SyncConfig,
}

impl Synchronizer {
    pub fn new(config: SyncConfig) -> TakeoverResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TakeoverError::Network(format!("building HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Path of the local fingerprint file. Pure computation, nothing is created.
    pub fn local_path(&self) -> TakeoverResult<PathBuf> {
        Ok(self.config.namespace_dir()?.join(FINGERPRINTS_FILE))
    }

    /// Path of the local fingerprint file, creating its directory if needed.
    pub async fn resolve_local_path(&self) -> TakeoverResult<PathBuf> {
        let dir = self.config.namespace_dir()?;
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);
        builder
            .create(&dir)
            .await
            .map_err(|e| TakeoverError::io(format!("creating {}", dir.display()), e))?;
        Ok(dir.join(FINGERPRINTS_FILE))
    }

    /// Fetch the remote envelope and return the decoded document bytes.
    #[instrument(skip(self), fields(url = %self.config.remote_url))]
    pub async fn fetch_remote_document(&self) -> TakeoverResult<Vec<u8>> {
        let resp = self
            .client
            .get(&self.config.remote_url)
            .header(USER_AGENT, concat!("takeover/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| TakeoverError::Network(format!("fetching fingerprints: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TakeoverError::Network(format!(
                "fetching fingerprints: remote returned {status}"
            )));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| TakeoverError::Network(format!("reading fingerprint response: {e}")))?;
        debug!("Received {} byte envelope", body.len());

        decode_envelope(&body)
    }

    /// Replace the local fingerprint file with the remote document.
    ///
    /// The document must parse before anything is written. It is written to a
    /// temporary file in the same directory and renamed over the old file, so
    /// the previous copy survives any failure.
    #[instrument(skip(self))]
    pub async fn download(&self) -> TakeoverResult<DownloadReport> {
        let document = self.fetch_remote_document().await?;
        let fingerprints = FingerprintStore::from_slice(&document)?.len();

        let path = self.resolve_local_path().await?;
        let bytes = document.len();
        let target = path.clone();
        tokio::task::spawn_blocking(move || install(&target, &document))
            .await
            .map_err(|e| {
                TakeoverError::io(
                    "installing fingerprints",
                    io::Error::new(io::ErrorKind::Other, e),
                )
            })??;

        info!(path = %path.display(), bytes, fingerprints, "Fingerprints updated");
        Ok(DownloadReport {
            path,
            bytes,
            fingerprints,
        })
    }

    /// Compare the SHA-256 of the local file with that of the remote document.
    ///
    /// Read-only: no directory or file is created or written.
    #[instrument(skip(self))]
    pub async fn check_integrity(&self) -> TakeoverResult<IntegrityResult> {
        let remote = self.fetch_remote_document().await?;

        let path = self.local_path()?;
        let local = tokio::fs::read(&path)
            .await
            .map_err(|e| TakeoverError::io(format!("reading {}", path.display()), e))?;

        let local_digest = digest(&local);
        let remote_digest = digest(&remote);
        let up_to_date = local_digest == remote_digest;
        if up_to_date {
            info!("Local fingerprints are up to date");
        } else {
            warn!(%local_digest, %remote_digest, "Local fingerprints differ from remote");
        }

        Ok(IntegrityResult {
            up_to_date,
            local_digest,
            remote_digest,
            checked_at: Utc::now(),
        })
    }
}

fn install(path: &Path, document: &[u8]) -> TakeoverResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| TakeoverError::io(format!("creating temporary file in {}", dir.display()), e))?;
    tmp.write_all(document)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| TakeoverError::io("writing temporary fingerprint file", e))?;
    // Temp files start out owner-only; the installed file is world-readable.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| TakeoverError::io("setting fingerprint file permissions", e))?;
    }
    tmp.persist(path)
        .map_err(|e| TakeoverError::io(format!("replacing {}", path.display()), e.error))?;
    Ok(())
}
