//! Probe Client - fetches candidate hosts over HTTP(S)

mod client;
mod normalize;

pub use client::{HttpProber, DEFAULT_MAX_BODY_BYTES};
pub use normalize::{is_absolute_http_url, normalize_candidate};
