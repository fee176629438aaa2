//! Response body matching

use takeover_common::Fingerprint;

/// Return the earliest fingerprint whose signature occurs in `body`.
///
/// Order matters: when several signatures match the same body, the one listed
/// first in the document wins.
#[must_use]
pub fn first_match<'a>(fingerprints: &'a [Fingerprint], body: &str) -> Option<&'a Fingerprint> {
    fingerprints.iter().find(|fp| fp.matches(body))
}
