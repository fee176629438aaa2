//! Synchronizer configuration

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use takeover_common::{TakeoverError, TakeoverResult};

/// GitHub contents API entry for the community fingerprint list.
pub const DEFAULT_FINGERPRINTS_URL: &str =
    "https://api.github.com/repos/EdOverflow/can-i-take-over-xyz/contents/fingerprints.json";

/// Directory name created under the user config directory.
pub const DEFAULT_NAMESPACE: &str = "takeover";

const ENV_FINGERPRINTS_URL: &str = "TAKEOVER_FINGERPRINTS_URL";
const ENV_CONFIG_DIR: &str = "TAKEOVER_CONFIG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub remote_url: String,
    pub namespace: String,
    /// Base directory; `None` means the platform config dir (`dirs::config_dir`).
    pub config_dir: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote_url: DEFAULT_FINGERPRINTS_URL.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            config_dir: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl SyncConfig {
    /// Defaults with `TAKEOVER_FINGERPRINTS_URL` / `TAKEOVER_CONFIG_DIR` applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = std::env::var(ENV_FINGERPRINTS_URL).ok().filter(|v| !v.trim().is_empty()) {
            config.remote_url = url;
        }
        if let Some(dir) = std::env::var_os(ENV_CONFIG_DIR).filter(|v| !v.is_empty()) {
            config.config_dir = Some(PathBuf::from(dir));
        }
        config
    }

    #[must_use]
    pub fn with_remote_url<S: Into<String>>(mut self, url: S) -> Self {
        self.remote_url = url.into();
        self
    }

    #[must_use]
    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_config_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// `<config dir>/<namespace>`, without touching the filesystem.
    pub fn namespace_dir(&self) -> TakeoverResult<PathBuf> {
        let base = self.config_dir.clone().or_else(dirs::config_dir).ok_or_else(|| {
            TakeoverError::io(
                "locating user config directory",
                io::Error::new(io::ErrorKind::NotFound, "no config directory on this platform"),
            )
        })?;
        Ok(base.join(&self.namespace))
    }
}
