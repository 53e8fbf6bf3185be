//! Fixture file naming
//!
//! Every fixture has a metadata file and up to two body assets:
//!
//! ```text
//! <host><path>-<fingerprint>.json
//! <host><path>-<fingerprint>-request.<ext>
//! <host><path>-<fingerprint>-response.<ext>
//! ```
//!
//! A body whose content type has no known extension gets no asset name and
//! is embedded inline in the metadata file instead.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::fingerprint::FixtureIdentity;

/// Extension of the metadata file
pub const METADATA_EXTENSION: &str = "json";

/// Which file of a fixture to name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixturePart {
    /// Metadata record holding request and response
    Metadata,
    /// Request body asset
    RequestBody,
    /// Response body asset
    ResponseBody,
}

/// Maps a MIME content type to a file extension
pub trait ExtensionResolver: Send + Sync {
    /// Extension without the leading dot, or `None` when the type is unmapped
    fn extension_for(&self, content_type: &str) -> Option<String>;
}

/// Table-driven [`ExtensionResolver`]
///
/// Lookups ignore content-type parameters (`; charset=utf-8`) and case.
/// `application/octet-stream` is unmapped on purpose: opaque binary bodies
/// are embedded inline.
#[derive(Debug, Clone)]
pub struct ExtensionTable {
    extensions: BTreeMap<String, String>,
}

const BUILTIN_EXTENSIONS: &[(&str, &str)] = &[
    ("application/json", "json"),
    ("application/javascript", "js"),
    ("application/pdf", "pdf"),
    ("application/xml", "xml"),
    ("image/gif", "gif"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("text/css", "css"),
    ("text/html", "html"),
    ("text/javascript", "js"),
    ("text/plain", "txt"),
    ("text/xml", "xml"),
];

impl ExtensionTable {
    /// Table without any mappings
    #[must_use]
    pub fn empty() -> Self {
        Self {
            extensions: BTreeMap::new(),
        }
    }

    /// Add or replace a mapping
    pub fn insert(&mut self, content_type: &str, extension: &str) {
        self.extensions.insert(
            essence(content_type),
            extension.trim_start_matches('.').to_string(),
        );
    }

    /// Number of mappings
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether the table has no mappings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for (content_type, extension) in BUILTIN_EXTENSIONS {
            table.insert(content_type, extension);
        }
        table
    }
}

impl ExtensionResolver for ExtensionTable {
    fn extension_for(&self, content_type: &str) -> Option<String> {
        self.extensions.get(&essence(content_type)).cloned()
    }
}

/// Lowercase MIME type without parameters
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Derives fixture file names from an identity
#[derive(Clone)]
pub struct FixtureFileNamer {
    resolver: Arc<dyn ExtensionResolver>,
    inline_bodies: bool,
}

impl FixtureFileNamer {
    /// Create a namer backed by `resolver`
    pub fn new(resolver: Arc<dyn ExtensionResolver>) -> Self {
        Self {
            resolver,
            inline_bodies: false,
        }
    }

    /// Never name body assets, so every body is embedded inline
    #[must_use]
    pub fn with_inline_bodies(mut self, inline: bool) -> Self {
        self.inline_bodies = inline;
        self
    }

    /// Name the file for `part`.
    ///
    /// `content_type` is the declared type of the body being named and is
    /// ignored for [`FixturePart::Metadata`]. Returns `None` when the base
    /// name is absent or, for bodies, when no extension can be derived.
    pub fn file_name(
        &self,
        identity: &FixtureIdentity,
        part: FixturePart,
        content_type: Option<&str>,
    ) -> Option<String> {
        let stem = identity.stem()?;

        let suffix = match part {
            FixturePart::Metadata => return Some(format!("{stem}.{METADATA_EXTENSION}")),
            FixturePart::RequestBody => "request",
            FixturePart::ResponseBody => "response",
        };

        if self.inline_bodies {
            return None;
        }

        let extension = self.resolver.extension_for(content_type?)?;
        if extension.is_empty() {
            return None;
        }

        Some(format!("{stem}-{suffix}.{extension}"))
    }
}

impl Default for FixtureFileNamer {
    fn default() -> Self {
        Self::new(Arc::new(ExtensionTable::default()))
    }
}

impl std::fmt::Debug for FixtureFileNamer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureFileNamer")
            .field("inline_bodies", &self.inline_bodies)
            .finish_non_exhaustive()
    }
}
