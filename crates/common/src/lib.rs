//! Takeover Common - Shared types and traits
//!
//! This crate provides the data model (fingerprints, verdicts, settings),
//! the error taxonomy, and the probing seam used across the takeover
//! detector workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{TakeoverError, TakeoverResult};
pub use traits::Prober;
pub use types::{ErrorKind, Fingerprint, IntegrityResult, ScanStats, Settings, Status, Verdict};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
