//! Replay engine for serving recorded responses

use tracing::{debug, warn};

use crate::config::FixtureConfig;
use crate::exchange::{ExchangeRecord, ResponseRecord};
use crate::naming::FixturePart;
use crate::storage::FixtureReader;
use crate::Result;

use super::cache::FixtureCache;

/// Re-identifies newly issued requests and serves their recorded responses
pub struct ReplayEngine {
    reader: FixtureReader,
    cache: FixtureCache,
}

impl ReplayEngine {
    /// Create a replay engine
    #[must_use]
    pub fn new(reader: FixtureReader) -> Self {
        Self {
            reader,
            cache: FixtureCache::new(),
        }
    }

    /// Create a replay engine from configuration
    #[must_use]
    pub fn from_config(config: &FixtureConfig) -> Self {
        Self::new(FixtureReader::new(
            config.fixture_dir.clone(),
            config.codec(),
        ))
    }

    /// Find the recorded response for a newly issued request.
    ///
    /// Returns `Ok(None)` when the request is unidentifiable, no fixture
    /// exists, or the fixture was captured without a response.
    ///
    /// # Errors
    ///
    /// Returns error if the request body cannot be drained or the fixture
    /// on disk is malformed
    pub fn replay(&self, exchange: &mut ExchangeRecord) -> Result<Option<ResponseRecord>> {
        let metadata_name =
            exchange.file_name(self.reader.codec().namer(), FixturePart::Metadata)?;
        let Some(metadata_name) = metadata_name else {
            debug!(
                "Unidentifiable request: {} (no URL host)",
                exchange.request().method
            );
            return Ok(None);
        };

        if let Some(response) = self.cache.lookup(&metadata_name) {
            debug!("Cache hit: {} -> {}", metadata_name, response.status);
            return Ok(Some(response));
        }

        let recorded = self
            .reader
            .load_for(exchange)?
            .and_then(|recorded| recorded.response().cloned());

        match recorded {
            Some(response) => {
                debug!("Loaded: {} -> {}", metadata_name, response.status);
                self.cache.insert(metadata_name, response.clone());
                Ok(Some(response))
            }
            None => {
                warn!(
                    "No recorded response: {} {} (fixture: {})",
                    exchange.request().method,
                    exchange
                        .request()
                        .url
                        .as_ref()
                        .map_or("<no url>", url::Url::as_str),
                    metadata_name
                );
                Ok(None)
            }
        }
    }

    /// Get cache statistics
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.cache.hit_count(),
            misses: self.cache.miss_count(),
            hit_rate: self.cache.hit_rate(),
            size: self.cache.size(),
        }
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        debug!("Clearing replay cache");
        self.cache.clear();
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    /// Cache hits
    pub hits: usize,
    /// Cache misses (lookups that went to disk)
    pub misses: usize,
    /// Hit rate (0.0 to 1.0)
    pub hit_rate: f64,
    /// Cache size (number of entries)
    pub size: usize,
}
