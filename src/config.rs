//! Configuration types for Fixtape

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use crate::exchange::{BodyStream, DEFAULT_CHUNK_SIZE};
use crate::naming::{ExtensionTable, FixtureFileNamer};
use crate::storage::ExchangeCodec;
use crate::{FixtureError, Result};

/// Operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Record mode: persist captured exchanges as fixtures
    Record,
    /// Replay mode: serve responses from fixtures
    Replay,
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Operating mode
    pub mode: Mode,
    /// Root directory for storing/loading fixtures
    pub fixture_dir: PathBuf,
    /// Bytes per bounded read when draining a request body stream
    #[serde(default = "default_chunk_size")]
    pub drain_chunk_size: usize,
    /// Embed every body inline instead of writing body assets
    #[serde(default, alias = "inline_binary")]
    pub inline_bodies: bool,
    /// Content type to file extension mappings added to the built-in table
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl FixtureConfig {
    /// Configuration with defaults for everything but mode and directory
    #[must_use]
    pub fn new(mode: Mode, fixture_dir: PathBuf) -> Self {
        Self {
            mode,
            fixture_dir,
            drain_chunk_size: DEFAULT_CHUNK_SIZE,
            inline_bodies: false,
            extensions: BTreeMap::new(),
        }
    }

    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FixtureError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| FixtureError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        // Replay needs fixtures to exist; record creates the directory
        if self.mode == Mode::Replay && !self.fixture_dir.is_dir() {
            return Err(FixtureError::ConfigError(format!(
                "Fixture directory does not exist: {}",
                self.fixture_dir.display()
            )));
        }

        if self.drain_chunk_size == 0 {
            return Err(FixtureError::ConfigError(
                "drain_chunk_size must be > 0".to_string(),
            ));
        }

        for (content_type, extension) in &self.extensions {
            if content_type.trim().is_empty() {
                return Err(FixtureError::ConfigError(
                    "extensions: content type cannot be empty".to_string(),
                ));
            }

            let extension = extension.trim_start_matches('.');
            if extension.is_empty() || extension.contains(['/', '\\']) {
                return Err(FixtureError::ConfigError(format!(
                    "extensions: invalid extension for '{content_type}'"
                )));
            }
        }

        Ok(())
    }

    /// Built-in extension table extended with the configured mappings
    #[must_use]
    pub fn extension_table(&self) -> ExtensionTable {
        let mut table = ExtensionTable::default();
        for (content_type, extension) in &self.extensions {
            table.insert(content_type, extension);
        }
        table
    }

    /// File namer for this configuration
    #[must_use]
    pub fn namer(&self) -> FixtureFileNamer {
        FixtureFileNamer::new(Arc::new(self.extension_table()))
            .with_inline_bodies(self.inline_bodies)
    }

    /// Exchange codec for this configuration
    #[must_use]
    pub fn codec(&self) -> ExchangeCodec {
        ExchangeCodec::new(self.namer())
    }

    /// Wrap a reader as a body stream using the configured chunk size
    pub fn body_stream<R: Read + Send + 'static>(&self, reader: R) -> BodyStream {
        BodyStream::new(reader).with_chunk_size(self.drain_chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::ExtensionResolver;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_config_parse() {
        let config_toml = r#"
            mode = "record"
            fixture_dir = "/tmp/fixtures"

            [extensions]
            "application/x-protobuf" = "pb"
        "#;

        let config: FixtureConfig = toml::from_str(config_toml).unwrap();
        assert_eq!(config.mode, Mode::Record);
        assert_eq!(config.drain_chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(!config.inline_bodies);
        assert_eq!(config.extensions.len(), 1);
    }

    #[test]
    fn test_config_parse_inline_bodies() {
        let config_toml = r#"
            mode = "record"
            fixture_dir = "/tmp/fixtures"
            inline_bodies = true
        "#;
        let config: FixtureConfig = toml::from_str(config_toml).unwrap();
        assert!(config.inline_bodies);

        let legacy_toml = "mode = \"record\"\nfixture_dir = \"/tmp\"\ninline_binary = true\n";
        let config: FixtureConfig = toml::from_str(legacy_toml).unwrap();
        assert!(config.inline_bodies);
    }

    #[test]
    fn test_config_from_file() {
        let dir = TempDir::new().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        let config_toml = format!(
            "mode = \"replay\"\nfixture_dir = {:?}\ndrain_chunk_size = 4096\n",
            dir.path().display().to_string()
        );
        file.write_all(config_toml.as_bytes()).unwrap();

        let config = FixtureConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mode, Mode::Replay);
        assert_eq!(config.drain_chunk_size, 4096);
    }

    #[test]
    fn test_replay_requires_existing_dir() {
        let config = FixtureConfig::new(Mode::Replay, PathBuf::from("/nonexistent/fixtape"));
        assert!(config.validate().is_err());

        let config = FixtureConfig::new(Mode::Record, PathBuf::from("/nonexistent/fixtape"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_values() {
        let mut config = FixtureConfig::new(Mode::Record, PathBuf::from("/tmp"));
        config.drain_chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = FixtureConfig::new(Mode::Record, PathBuf::from("/tmp"));
        config
            .extensions
            .insert("application/x-thing".to_string(), ".".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_extension_overrides() {
        let mut config = FixtureConfig::new(Mode::Record, PathBuf::from("/tmp"));
        config
            .extensions
            .insert("application/json".to_string(), "jsonc".to_string());
        config
            .extensions
            .insert("application/x-protobuf".to_string(), "pb".to_string());

        let table = config.extension_table();
        assert_eq!(table.extension_for("application/json").as_deref(), Some("jsonc"));
        assert_eq!(table.extension_for("application/x-protobuf").as_deref(), Some("pb"));
        assert_eq!(table.extension_for("text/html").as_deref(), Some("html"));
    }
}
