//! Fingerprint Store - the signature database used for detection
//!
//! This crate provides:
//! - Parsing of the fingerprint document into an ordered collection
//! - Loading the persisted document from disk
//! - First-match lookup of a response body against the collection

mod matcher;
mod store;

pub use matcher::first_match;
pub use store::FingerprintStore;

/// File name of the persisted fingerprint document.
pub const FINGERPRINTS_FILE: &str = "fingerprints.json";
