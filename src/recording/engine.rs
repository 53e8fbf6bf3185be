//! Recording engine for capturing exchanges as fixtures

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::config::FixtureConfig;
use crate::exchange::{ExchangeRecord, ResponseRecord};
use crate::storage::FixtureWriter;
use crate::Result;

/// Attaches responses to captured requests and writes them as fixtures
pub struct RecordingEngine {
    writer: FixtureWriter,
    recorded: AtomicUsize,
}

impl RecordingEngine {
    /// Create a recording engine
    #[must_use]
    pub fn new(writer: FixtureWriter) -> Self {
        Self {
            writer,
            recorded: AtomicUsize::new(0),
        }
    }

    /// Create a recording engine from configuration
    #[must_use]
    pub fn from_config(config: &FixtureConfig) -> Self {
        Self::new(FixtureWriter::new(
            config.fixture_dir.clone(),
            config.codec(),
        ))
    }

    /// Attach `response` to a captured exchange and persist it
    ///
    /// # Errors
    ///
    /// Returns error if the request is unidentifiable or writing fails
    pub fn record(
        &self,
        exchange: &mut ExchangeRecord,
        response: ResponseRecord,
    ) -> Result<PathBuf> {
        debug!(
            "Recording {} {} -> {}",
            exchange.request().method,
            exchange
                .request()
                .url
                .as_ref()
                .map_or("<no url>", url::Url::as_str),
            response.status
        );

        exchange.set_response(response);
        self.persist(exchange)
    }

    /// Persist an exchange in its current state
    ///
    /// A captured-only exchange is written without a `response` record.
    ///
    /// # Errors
    ///
    /// Returns error if the request is unidentifiable or writing fails
    pub fn persist(&self, exchange: &mut ExchangeRecord) -> Result<PathBuf> {
        let path = self.writer.write(exchange)?;
        let count = self.recorded.fetch_add(1, Ordering::Relaxed) + 1;

        info!(
            "Recorded fixture: {} (fingerprint: {}, count: {})",
            path.display(),
            exchange.fingerprint()?,
            count
        );

        Ok(path)
    }

    /// Number of fixtures written by this engine
    #[must_use]
    pub fn recorded_count(&self) -> usize {
        self.recorded.load(Ordering::Relaxed)
    }
}
