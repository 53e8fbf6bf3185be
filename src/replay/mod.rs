//! Replay engine for serving recorded responses

mod cache;
mod engine;

pub use cache::FixtureCache;
pub use engine::{CacheStats, ReplayEngine};
