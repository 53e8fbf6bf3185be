//! Fixtape - deterministic HTTP exchange fixtures
//!
//! Records a request and its response as a replayable fixture and later
//! re-identifies which fixture belongs to a newly issued request.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_precision_loss,
    clippy::multiple_crate_versions
)]

pub mod canonical;
pub mod config;
pub mod error;
pub mod exchange;
pub mod fingerprint;
pub mod naming;
pub mod recording;
pub mod replay;
pub mod storage;

pub use error::{FixtureError, Result};
