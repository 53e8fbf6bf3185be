//! Pluggable request normalization

use super::RequestRecord;

/// Rewrites a request before it is fingerprinted.
///
/// Typical implementations strip volatile query parameters or rewrite
/// hosts. The fingerprint covers the full URL including the query string,
/// so a normalizer that wants parameter order to be irrelevant must sort
/// the query itself.
///
/// Implementations should be pure: the result is memoized per exchange and
/// the hook runs once per [`ExchangeRecord`](super::ExchangeRecord).
pub trait RequestNormalizer: Send + Sync {
    /// Produce the normalized form of `request`
    fn normalize(&self, request: RequestRecord) -> RequestRecord;
}

/// Normalizer that returns the request unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl RequestNormalizer for IdentityNormalizer {
    fn normalize(&self, request: RequestRecord) -> RequestRecord {
        request
    }
}

impl<F> RequestNormalizer for F
where
    F: Fn(RequestRecord) -> RequestRecord + Send + Sync,
{
    fn normalize(&self, request: RequestRecord) -> RequestRecord {
        self(request)
    }
}
