//! Captured request and one-shot body streams

use std::fmt;
use std::io::{self, Read};

use bytes::{Bytes, BytesMut};
use url::Url;

use super::{header_value, Headers};
use crate::{FixtureError, Result};

/// Default bounded read size when draining a body stream
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// A request body that can be read exactly once
pub struct BodyStream {
    reader: Box<dyn Read + Send>,
    chunk_size: usize,
}

impl BodyStream {
    /// Wrap a reader as a one-shot body stream
    pub fn new<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            reader: Box::new(reader),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the bounded read size (clamped to at least one byte)
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Read the stream to exhaustion in bounded chunks.
    ///
    /// Consumes the stream, so the underlying reader is released on every
    /// exit path. On error the partially filled buffer is dropped.
    ///
    /// # Errors
    ///
    /// Returns the first non-interrupt read error
    pub fn drain(mut self) -> io::Result<Bytes> {
        let mut buffer = BytesMut::new();
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }

        Ok(buffer.freeze())
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyStream")
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
enum Body {
    Empty,
    Buffered(Bytes),
    Stream(BodyStream),
    /// Drain failed; the stream is gone and its partial contents discarded
    Failed,
}

/// A captured HTTP request
#[derive(Debug)]
pub struct RequestRecord {
    /// HTTP method (e.g., "GET", "POST")
    pub method: String,
    /// Absolute request URL
    pub url: Option<Url>,
    /// Request headers
    pub headers: Headers,
    body: Body,
}

impl RequestRecord {
    /// Create a request without headers or body
    pub fn new(method: impl Into<String>, url: Option<Url>) -> Self {
        Self {
            method: method.into(),
            url,
            headers: Headers::new(),
            body: Body::Empty,
        }
    }

    /// Parse `url` and create a request
    ///
    /// # Errors
    ///
    /// Returns error if the URL is not absolute or cannot be parsed
    pub fn parse(method: impl Into<String>, url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| FixtureError::InvalidFormat(format!("Invalid URL '{url}': {e}")))?;
        Ok(Self::new(method, Some(url)))
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach an eagerly held body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Body::Buffered(body.into());
        self
    }

    /// Attach a one-shot body stream, drained on first access
    #[must_use]
    pub fn with_body_stream(mut self, stream: BodyStream) -> Self {
        self.body = Body::Stream(stream);
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Declared content type
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body bytes, draining a pending stream exactly once.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if draining fails, and
    /// [`FixtureError::BodyUnavailable`] on every access after a failed drain
    pub fn body(&mut self) -> Result<Option<&Bytes>> {
        let pending = std::mem::replace(&mut self.body, Body::Failed);
        self.body = match pending {
            Body::Stream(stream) => Body::Buffered(stream.drain()?),
            settled => settled,
        };

        match &self.body {
            Body::Empty => Ok(None),
            Body::Buffered(bytes) => Ok(Some(bytes)),
            Body::Stream(_) | Body::Failed => Err(FixtureError::BodyUnavailable),
        }
    }

    /// Body bytes if already held in memory; never drains
    pub fn buffered_body(&self) -> Option<&Bytes> {
        match &self.body {
            Body::Buffered(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Whether a body stream is still waiting to be drained
    pub fn has_pending_stream(&self) -> bool {
        matches!(self.body, Body::Stream(_))
    }

    /// Drain the body and return an independent, fully buffered copy
    ///
    /// # Errors
    ///
    /// Returns error if the body stream cannot be drained
    pub fn to_buffered(&mut self) -> Result<Self> {
        let body = match self.body()? {
            Some(bytes) => Body::Buffered(bytes.clone()),
            None => Body::Empty,
        };

        Ok(Self {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body,
        })
    }
}
