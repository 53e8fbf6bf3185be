//! Request fingerprinting and fixture base names
//!
//! A fixture is identified by two values derived from the normalized request:
//!
//! 1. The base name, `host + path`, readable and grouping related fixtures
//! 2. The fingerprint, the first 8 hex characters of a SHA-256 digest over
//!    the full URL (query included) and the canonicalized body
//!
//! Two requests that differ only in their query string therefore share a
//! base name but not a fingerprint.

use sha2::{Digest, Sha256};
use url::Url;

use crate::canonical::canonical_body;
use crate::exchange::RequestRecord;

/// Number of hex characters in a fingerprint
pub const FINGERPRINT_LEN: usize = 8;

/// Identity values used to name a request's fixture files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureIdentity {
    base_name: Option<String>,
    fingerprint: String,
}

impl FixtureIdentity {
    /// Compute the identity of a normalized request.
    ///
    /// Only a body already held in memory contributes; callers drain any
    /// pending stream first.
    #[must_use]
    pub(crate) fn of(request: &RequestRecord) -> Self {
        let url = request.url.as_ref();
        let body = request.buffered_body().map(|bytes| &bytes[..]);

        Self {
            base_name: base_name(url),
            fingerprint: fingerprint(url, body),
        }
    }

    /// `host + path`, absent without a URL host
    pub fn base_name(&self) -> Option<&str> {
        self.base_name.as_deref()
    }

    /// Content fingerprint, empty when there was nothing to hash
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Whether fixture files can be derived from this identity
    pub fn is_identifiable(&self) -> bool {
        self.base_name.is_some() && !self.fingerprint.is_empty()
    }

    /// Shared `<base name>-<fingerprint>` prefix of every fixture file name
    pub fn stem(&self) -> Option<String> {
        self.base_name
            .as_ref()
            .map(|base| format!("{base}-{}", self.fingerprint))
    }
}

/// Compute the fingerprint of a URL and body
///
/// JSON bodies are hashed in canonical form so key order does not matter;
/// any other body is hashed as raw bytes.
#[must_use]
pub fn fingerprint(url: Option<&Url>, body: Option<&[u8]>) -> String {
    let mut material = Vec::new();

    if let Some(url) = url {
        material.extend_from_slice(url.as_str().as_bytes());
    }

    if let Some(body) = body {
        match canonical_body(body) {
            Some(canonical) => material.extend_from_slice(canonical.as_bytes()),
            None => material.extend_from_slice(body),
        }
    }

    if material.is_empty() {
        return String::new();
    }

    let digest = Sha256::digest(&material);
    hex::encode(&digest[..FINGERPRINT_LEN / 2])
}

/// Derive the base name (`host` or `host + path`) of a URL
///
/// The query string and fragment are never part of the base name. The bare
/// root path `/` counts as empty, since hierarchical URLs always carry one.
#[must_use]
pub fn base_name(url: Option<&Url>) -> Option<String> {
    let url = url?;
    let host = url.host_str()?;

    match url.path() {
        "" | "/" => Some(host.to_string()),
        path => Some(format!("{host}{path}")),
    }
}
