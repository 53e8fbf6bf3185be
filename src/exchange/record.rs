//! Exchange record with memoized identity

use std::sync::Arc;

use bytes::Bytes;

use super::{IdentityNormalizer, RequestNormalizer, RequestRecord, ResponseRecord};
use crate::fingerprint::FixtureIdentity;
use crate::naming::{FixtureFileNamer, FixturePart};
use crate::Result;

/// Lifecycle state of an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// Request captured, no response yet
    Captured,
    /// Response attached
    Completed,
}

/// A captured request with its response, once recorded
///
/// The normalized request and the identity derived from it are computed on
/// first access and cached for the lifetime of the record. Both accessors
/// take `&mut self`, so the cache has a single writer.
pub struct ExchangeRecord {
    request: RequestRecord,
    response: Option<ResponseRecord>,
    normalizer: Arc<dyn RequestNormalizer>,
    normalized: Option<RequestRecord>,
    identity: Option<FixtureIdentity>,
}

impl ExchangeRecord {
    /// Capture a request using the identity normalizer
    #[must_use]
    pub fn new(request: RequestRecord) -> Self {
        Self::with_normalizer(request, Arc::new(IdentityNormalizer))
    }

    /// Capture a request with a normalization hook
    pub fn with_normalizer(request: RequestRecord, normalizer: Arc<dyn RequestNormalizer>) -> Self {
        Self {
            request,
            response: None,
            normalizer,
            normalized: None,
            identity: None,
        }
    }

    /// Rebuild an exchange from persisted parts
    #[must_use]
    pub fn from_parts(request: RequestRecord, response: Option<ResponseRecord>) -> Self {
        let mut exchange = Self::new(request);
        exchange.response = response;
        exchange
    }

    /// The request as captured
    pub fn request(&self) -> &RequestRecord {
        &self.request
    }

    /// Captured request body, draining a pending stream once
    ///
    /// # Errors
    ///
    /// Returns error if the body stream cannot be drained
    pub fn request_body(&mut self) -> Result<Option<&Bytes>> {
        self.request.body()
    }

    /// The recorded response, if any
    pub fn response(&self) -> Option<&ResponseRecord> {
        self.response.as_ref()
    }

    /// Mutable access to the recorded response for setting body or headers
    pub fn response_mut(&mut self) -> Option<&mut ResponseRecord> {
        self.response.as_mut()
    }

    /// Attach (or overwrite) the response
    pub fn set_response(&mut self, response: ResponseRecord) {
        self.response = Some(response);
    }

    /// Current lifecycle state
    pub fn state(&self) -> ExchangeState {
        if self.response.is_some() {
            ExchangeState::Completed
        } else {
            ExchangeState::Captured
        }
    }

    /// The request after the normalization hook, computed once
    ///
    /// # Errors
    ///
    /// Returns error if the captured or normalized body stream cannot be drained
    pub fn normalized_request(&mut self) -> Result<&RequestRecord> {
        let mut normalized = match self.normalized.take() {
            Some(normalized) => normalized,
            None => self.normalizer.normalize(self.request.to_buffered()?),
        };

        // The hook may hand back a fresh stream. A failed drain is cached too,
        // so later calls report `BodyUnavailable` without rerunning the hook.
        let drained = normalized.body().map(|_| ());
        let normalized = self.normalized.insert(normalized);
        drained?;
        Ok(&*normalized)
    }

    /// Identity of the normalized request, computed once
    ///
    /// # Errors
    ///
    /// Returns error if the request body cannot be drained
    pub fn identity(&mut self) -> Result<&FixtureIdentity> {
        let identity = match self.identity.take() {
            Some(identity) => identity,
            None => FixtureIdentity::of(self.normalized_request()?),
        };

        Ok(&*self.identity.insert(identity))
    }

    /// Fingerprint of the normalized request
    ///
    /// # Errors
    ///
    /// Returns error if the request body cannot be drained
    pub fn fingerprint(&mut self) -> Result<&str> {
        Ok(self.identity()?.fingerprint())
    }

    /// Name the fixture file for `part`.
    ///
    /// Body parts use the declared content type of the captured request or
    /// the recorded response; a response body has no name before a response
    /// is attached.
    ///
    /// # Errors
    ///
    /// Returns error if the request body cannot be drained
    pub fn file_name(&mut self, namer: &FixtureFileNamer, part: FixturePart) -> Result<Option<String>> {
        let content_type = match part {
            FixturePart::Metadata => None,
            FixturePart::RequestBody => self.request.content_type().map(str::to_owned),
            FixturePart::ResponseBody => match &self.response {
                Some(response) => response.content_type().map(str::to_owned),
                None => return Ok(None),
            },
        };

        let identity = self.identity()?;
        Ok(namer.file_name(identity, part, content_type.as_deref()))
    }
}

impl std::fmt::Debug for ExchangeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeRecord")
            .field("request", &self.request)
            .field("response", &self.response)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
