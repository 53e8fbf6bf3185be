//! Metadata record encoding
//!
//! A fixture's metadata file is a JSON object with a required `request`
//! record and an optional `response` record. Each record carries its body
//! either as a reference to a separate asset file (`body_file`) or inline as
//! base64 (`body`), depending on whether the body's content type maps to a
//! file extension.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::exchange::{ExchangeRecord, Headers, RequestRecord, ResponseRecord};
use crate::naming::{FixtureFileNamer, FixturePart};
use crate::{FixtureError, Result};

/// Top-level metadata record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureDocument {
    /// Encoded request
    pub request: RequestEntry,
    /// Encoded response; omitted before a response is recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseEntry>,
}

/// Encoded request record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEntry {
    /// HTTP method
    pub method: String,
    /// Absolute URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Request headers
    #[serde(default)]
    pub headers: Headers,
    /// Body reference or inline body
    #[serde(flatten)]
    pub body: BodyEntry,
}

/// Encoded response record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEntry {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    #[serde(default)]
    pub headers: Headers,
    /// Body reference or inline body
    #[serde(flatten)]
    pub body: BodyEntry,
}

/// Where a body lives; at most one field is set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyEntry {
    /// Asset file name, relative to the fixture root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_file: Option<String>,
    /// Base64 body embedded in the metadata file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// A body asset to be written next to the metadata file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureAsset {
    /// File name relative to the fixture root
    pub file_name: String,
    /// Body bytes
    pub bytes: Bytes,
}

/// Result of encoding an exchange
#[derive(Debug, Clone)]
pub struct EncodedFixture {
    /// Metadata file name, absent for unidentifiable requests
    pub metadata_name: Option<String>,
    /// Metadata record
    pub document: FixtureDocument,
    /// Body assets referenced by the document
    pub assets: Vec<FixtureAsset>,
}

impl EncodedFixture {
    /// Serialize the metadata record as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn metadata_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.document)?)
    }
}

/// Supplies body assets referenced by `body_file` while decoding
pub trait AssetSource {
    /// Load the asset named `file_name`
    ///
    /// # Errors
    ///
    /// Returns error if the asset is missing or unreadable
    fn load(&self, file_name: &str) -> Result<Bytes>;
}

impl AssetSource for [FixtureAsset] {
    fn load(&self, file_name: &str) -> Result<Bytes> {
        self.iter()
            .find(|asset| asset.file_name == file_name)
            .map(|asset| asset.bytes.clone())
            .ok_or_else(|| FixtureError::FixtureNotFound(file_name.to_string()))
    }
}

/// Encodes and decodes exchanges to and from metadata records
#[derive(Debug, Clone, Default)]
pub struct ExchangeCodec {
    namer: FixtureFileNamer,
}

impl ExchangeCodec {
    /// Create a codec naming body assets with `namer`
    #[must_use]
    pub fn new(namer: FixtureFileNamer) -> Self {
        Self { namer }
    }

    /// The namer used for body assets
    pub fn namer(&self) -> &FixtureFileNamer {
        &self.namer
    }

    /// Encode an exchange into its metadata record and body assets.
    ///
    /// Bodies whose part has a file name become assets; all others are
    /// embedded inline.
    ///
    /// # Errors
    ///
    /// Returns error if the request body stream cannot be drained
    pub fn encode(&self, exchange: &mut ExchangeRecord) -> Result<EncodedFixture> {
        let metadata_name = exchange.file_name(&self.namer, FixturePart::Metadata)?;
        let request_body_name = exchange.file_name(&self.namer, FixturePart::RequestBody)?;
        let response_body_name = exchange.file_name(&self.namer, FixturePart::ResponseBody)?;

        let mut assets = Vec::new();

        let request_body = exchange.request_body()?.cloned();
        let request = exchange.request();
        let request = RequestEntry {
            method: request.method.clone(),
            url: request.url.as_ref().map(|url| url.as_str().to_string()),
            headers: request.headers.clone(),
            body: encode_body(request_body_name, request_body, &mut assets),
        };

        let response = exchange.response().map(|response| ResponseEntry {
            status: response.status,
            headers: response.headers.clone(),
            body: encode_body(response_body_name, response.body.clone(), &mut assets),
        });

        Ok(EncodedFixture {
            metadata_name,
            document: FixtureDocument { request, response },
            assets,
        })
    }

    /// Decode a metadata file's bytes
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not JSON or the record is malformed
    pub fn decode_slice<A>(&self, bytes: &[u8], assets: &A) -> Result<ExchangeRecord>
    where
        A: AssetSource + ?Sized,
    {
        let value: Value = serde_json::from_slice(bytes)?;
        self.decode_value(value, assets)
    }

    /// Decode a parsed metadata record.
    ///
    /// The `request` record is required; a missing or `null` `response`
    /// decodes to an exchange without a response.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidFormat`] if the record is malformed
    pub fn decode_value<A>(&self, value: Value, assets: &A) -> Result<ExchangeRecord>
    where
        A: AssetSource + ?Sized,
    {
        let Value::Object(mut root) = value else {
            return Err(FixtureError::InvalidFormat(
                "Fixture metadata must be a JSON object".to_string(),
            ));
        };

        let request = root
            .remove("request")
            .ok_or_else(|| FixtureError::InvalidFormat("Missing `request` record".to_string()))?;
        let request: RequestEntry = serde_json::from_value(request).map_err(|e| {
            FixtureError::InvalidFormat(format!("Malformed `request` record: {e}"))
        })?;

        let response = match root.remove("response") {
            None | Some(Value::Null) => None,
            Some(value) => Some(serde_json::from_value::<ResponseEntry>(value).map_err(|e| {
                FixtureError::InvalidFormat(format!("Malformed `response` record: {e}"))
            })?),
        };

        self.decode_document(FixtureDocument { request, response }, assets)
    }

    /// Decode a typed metadata record
    ///
    /// # Errors
    ///
    /// Returns error if a field is invalid or an asset cannot be loaded
    pub fn decode_document<A>(&self, document: FixtureDocument, assets: &A) -> Result<ExchangeRecord>
    where
        A: AssetSource + ?Sized,
    {
        let request = decode_request(document.request, assets)?;
        let response = document
            .response
            .map(|entry| decode_response(entry, assets))
            .transpose()?;

        Ok(ExchangeRecord::from_parts(request, response))
    }
}

fn encode_body(
    file_name: Option<String>,
    bytes: Option<Bytes>,
    assets: &mut Vec<FixtureAsset>,
) -> BodyEntry {
    let Some(bytes) = bytes else {
        return BodyEntry::default();
    };

    match file_name {
        Some(file_name) => {
            assets.push(FixtureAsset {
                file_name: file_name.clone(),
                bytes,
            });
            BodyEntry {
                body_file: Some(file_name),
                body: None,
            }
        }
        None => BodyEntry {
            body_file: None,
            body: Some(STANDARD.encode(&bytes)),
        },
    }
}

fn decode_body<A>(entry: BodyEntry, assets: &A, record: &str) -> Result<Option<Bytes>>
where
    A: AssetSource + ?Sized,
{
    match (entry.body_file, entry.body) {
        (Some(_), Some(_)) => Err(FixtureError::InvalidFormat(format!(
            "`{record}` record has both `body` and `body_file`"
        ))),
        (Some(file_name), None) => assets.load(&file_name).map(Some),
        (None, Some(encoded)) => STANDARD
            .decode(encoded.as_bytes())
            .map(|bytes| Some(Bytes::from(bytes)))
            .map_err(|e| {
                FixtureError::InvalidFormat(format!("`{record}` body is not valid base64: {e}"))
            }),
        (None, None) => Ok(None),
    }
}

fn decode_request<A>(entry: RequestEntry, assets: &A) -> Result<RequestRecord>
where
    A: AssetSource + ?Sized,
{
    if entry.method.trim().is_empty() {
        return Err(FixtureError::InvalidFormat(
            "`request` record has an empty method".to_string(),
        ));
    }

    let url = entry
        .url
        .as_deref()
        .map(Url::parse)
        .transpose()
        .map_err(|e| FixtureError::InvalidFormat(format!("`request` URL is invalid: {e}")))?;

    let mut request = RequestRecord::new(entry.method, url);
    request.headers = entry.headers;

    match decode_body(entry.body, assets, "request")? {
        Some(bytes) => Ok(request.with_body(bytes)),
        None => Ok(request),
    }
}

fn decode_response<A>(entry: ResponseEntry, assets: &A) -> Result<ResponseRecord>
where
    A: AssetSource + ?Sized,
{
    Ok(ResponseRecord {
        status: entry.status,
        headers: entry.headers,
        body: decode_body(entry.body, assets, "response")?,
    })
}
