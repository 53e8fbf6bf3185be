//! Fixture reader

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use super::codec::{AssetSource, ExchangeCodec};
use super::resolve_fixture_path;
use crate::exchange::ExchangeRecord;
use crate::naming::FixturePart;
use crate::{FixtureError, Result};

/// Loads body assets from the fixture root
#[derive(Debug, Clone, Copy)]
pub struct DirectoryAssets<'a> {
    root: &'a Path,
}

impl<'a> DirectoryAssets<'a> {
    /// Assets resolved against `root`
    #[must_use]
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }
}

impl AssetSource for DirectoryAssets<'_> {
    fn load(&self, file_name: &str) -> Result<Bytes> {
        let path = resolve_fixture_path(self.root, file_name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FixtureError::FixtureNotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Reads fixtures from a root directory
#[derive(Debug, Clone)]
pub struct FixtureReader {
    root: PathBuf,
    codec: ExchangeCodec,
}

impl FixtureReader {
    /// Create a reader rooted at `root`
    #[must_use]
    pub fn new(root: PathBuf, codec: ExchangeCodec) -> Self {
        Self { root, codec }
    }

    /// Fixture root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Codec used to decode metadata records
    pub fn codec(&self) -> &ExchangeCodec {
        &self.codec
    }

    /// Read the fixture whose metadata file is `metadata_name`
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::FixtureNotFound`] if the metadata file is
    /// missing, or a decode error if it is malformed
    pub fn read(&self, metadata_name: &str) -> Result<ExchangeRecord> {
        let path = resolve_fixture_path(&self.root, metadata_name)?;
        self.read_path(&path)
    }

    /// Read a metadata file by path; body assets resolve against the root
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing or malformed
    pub fn read_path(&self, path: &Path) -> Result<ExchangeRecord> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FixtureError::FixtureNotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let exchange = self
            .codec
            .decode_slice(&bytes, &DirectoryAssets::new(&self.root))?;
        debug!("Loaded fixture: {}", path.display());
        Ok(exchange)
    }

    /// Find the recorded fixture for a newly issued request.
    ///
    /// Returns `Ok(None)` when the request is unidentifiable or nothing was
    /// recorded for it yet.
    ///
    /// # Errors
    ///
    /// Returns error if the request body cannot be drained, or the fixture
    /// on disk is malformed or references a missing body asset
    pub fn load_for(&self, exchange: &mut ExchangeRecord) -> Result<Option<ExchangeRecord>> {
        let metadata_name = exchange.file_name(self.codec.namer(), FixturePart::Metadata)?;
        let Some(metadata_name) = metadata_name else {
            return Ok(None);
        };

        if !exchange.identity()?.is_identifiable() {
            return Ok(None);
        }

        // Only a missing metadata file means "not recorded"; a missing body
        // asset is a broken fixture and propagates
        let path = resolve_fixture_path(&self.root, &metadata_name)?;
        if !path.is_file() {
            debug!("No fixture recorded at {}", path.display());
            return Ok(None);
        }

        self.read_path(&path).map(Some)
    }
}
