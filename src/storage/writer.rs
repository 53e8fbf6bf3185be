//! Fixture writer

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::codec::ExchangeCodec;
use super::resolve_fixture_path;
use crate::exchange::ExchangeRecord;
use crate::{FixtureError, Result};

/// Writes exchanges as fixture files under a root directory
#[derive(Debug, Clone)]
pub struct FixtureWriter {
    root: PathBuf,
    codec: ExchangeCodec,
}

impl FixtureWriter {
    /// Create a writer rooted at `root`
    #[must_use]
    pub fn new(root: PathBuf, codec: ExchangeCodec) -> Self {
        Self { root, codec }
    }

    /// Fixture root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist an exchange, returning the metadata file path.
    ///
    /// Body assets are written before the metadata file, so a metadata file
    /// on disk never references a missing asset. Existing files are
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Unidentifiable`] if the request has no base
    /// name or fingerprint, or an I/O error if a file cannot be written
    pub fn write(&self, exchange: &mut ExchangeRecord) -> Result<PathBuf> {
        if !exchange.identity()?.is_identifiable() {
            return Err(FixtureError::Unidentifiable(format!(
                "{} request has no URL host or fingerprint material",
                exchange.request().method
            )));
        }

        let encoded = self.codec.encode(exchange)?;
        let metadata_name = encoded.metadata_name.clone().ok_or_else(|| {
            FixtureError::Unidentifiable("no metadata file name".to_string())
        })?;

        for asset in &encoded.assets {
            let path = resolve_fixture_path(&self.root, &asset.file_name)?;
            write_file(&path, &asset.bytes)?;
            debug!("Wrote body asset: {} ({} bytes)", asset.file_name, asset.bytes.len());
        }

        let path = resolve_fixture_path(&self.root, &metadata_name)?;
        write_file(&path, &encoded.metadata_bytes()?)?;

        debug!(
            "Wrote fixture: {} (assets: {})",
            metadata_name,
            encoded.assets.len()
        );

        Ok(path)
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{RequestRecord, ResponseRecord};
    use tempfile::TempDir;

    #[test]
    fn test_write_fixture_files() {
        let temp_dir = TempDir::new().unwrap();
        let writer = FixtureWriter::new(temp_dir.path().to_path_buf(), ExchangeCodec::default());

        let mut exchange = ExchangeRecord::new(
            RequestRecord::parse("GET", "https://example.com/v1/items").unwrap(),
        );
        exchange.set_response(
            ResponseRecord::new(200)
                .with_header("Content-Type", "application/json")
                .with_body(r#"{"items":[]}"#),
        );
        let fp = exchange.fingerprint().unwrap().to_string();

        let path = writer.write(&mut exchange).unwrap();

        assert_eq!(
            path,
            temp_dir.path().join(format!("example.com/v1/items-{fp}.json"))
        );
        assert!(path.exists());

        let asset = temp_dir
            .path()
            .join(format!("example.com/v1/items-{fp}-response.json"));
        assert_eq!(fs::read(asset).unwrap(), br#"{"items":[]}"#);
    }

    #[test]
    fn test_write_rejects_unidentifiable() {
        let temp_dir = TempDir::new().unwrap();
        let writer = FixtureWriter::new(temp_dir.path().to_path_buf(), ExchangeCodec::default());

        let mut no_url = ExchangeRecord::new(RequestRecord::new("GET", None));
        assert!(matches!(
            writer.write(&mut no_url),
            Err(FixtureError::Unidentifiable(_))
        ));

        let mut body_only = ExchangeRecord::new(RequestRecord::new("POST", None).with_body("x"));
        assert!(matches!(
            writer.write(&mut body_only),
            Err(FixtureError::Unidentifiable(_))
        ));

        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
