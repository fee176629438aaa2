//! Decoding of the GitHub contents API envelope

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

use takeover_common::{TakeoverError, TakeoverResult};

#[derive(Debug, Deserialize)]
struct ContentEnvelope {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Extract the raw document bytes from a contents API response body.
///
/// GitHub wraps the base64 payload at 60 columns, so ASCII whitespace is
/// removed before decoding. An empty payload is rejected.
pub fn decode_envelope(body: &[u8]) -> TakeoverResult<Vec<u8>> {
    let envelope: ContentEnvelope = serde_json::from_slice(body)
        .map_err(|e| TakeoverError::Decode(format!("malformed envelope JSON: {e}")))?;

    if let Some(encoding) = envelope.encoding.as_deref() {
        if !encoding.eq_ignore_ascii_case("base64") {
            return Err(TakeoverError::Decode(format!(
                "unsupported content encoding '{encoding}'"
            )));
        }
    }

    let compact: String = envelope
        .content
        .split_ascii_whitespace()
        .collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| TakeoverError::Decode(format!("invalid base64 content: {e}")))?;

    if bytes.is_empty() {
        return Err(TakeoverError::Decode("envelope content is empty".into()));
    }
    Ok(bytes)
}
