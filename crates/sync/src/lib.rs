//! Fingerprint Synchronizer - keeps the local fingerprint document current
//!
//! Fetches the authoritative document from a GitHub "contents" endpoint,
//! decodes its base64 envelope, installs it atomically under the user's
//! config directory, and compares local and remote copies on demand.

mod config;
mod envelope;
mod synchronizer;

pub use config::{SyncConfig, DEFAULT_FINGERPRINTS_URL, DEFAULT_NAMESPACE};
pub use envelope::decode_envelope;
pub use synchronizer::{digest, DownloadReport, Synchronizer};
