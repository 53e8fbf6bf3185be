//! Recording engine for persisting captured exchanges

mod engine;

pub use engine::RecordingEngine;
