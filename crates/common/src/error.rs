//! Error types for the takeover detector
//!
//! Every variant names the stage that failed so a caller can tell a broken
//! download apart from a broken local file.

use std::io;
use thiserror::Error;

use crate::types::ErrorKind;

#[derive(Error, Debug)]
pub enum TakeoverError {
    #[error("I/O error ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl TakeoverError {
    /// Wrap an I/O error with the stage it came from.
    pub fn io<C: Into<String>>(context: C, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Verdict classification for a failure that happened while probing a candidate.
    ///
    /// Anything that is neither a timeout nor a cancellation counts as a network
    /// failure: the candidate could not be reached or read.
    #[must_use]
    pub fn verdict_kind(&self) -> ErrorKind {
        match self {
            TakeoverError::Timeout(_) => ErrorKind::Timeout,
            TakeoverError::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::Network,
        }
    }
}

/// Result type alias for takeover operations
pub type TakeoverResult<T> = Result<T, TakeoverError>;
