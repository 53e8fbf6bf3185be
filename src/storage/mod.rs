//! Fixture persistence: metadata records plus body asset files

mod codec;
mod reader;
mod writer;

use std::path::{Component, Path, PathBuf};

pub use codec::{
    AssetSource, BodyEntry, EncodedFixture, ExchangeCodec, FixtureAsset, FixtureDocument,
    RequestEntry, ResponseEntry,
};
pub use reader::{DirectoryAssets, FixtureReader};
pub use writer::FixtureWriter;

use crate::{FixtureError, Result};

/// Maximum length of a fixture file name
pub const FILE_NAME_MAX: usize = 1024;

/// Resolve a fixture file name against the fixture root
///
/// # Errors
///
/// Returns error if the name is empty, too long, absolute, or escapes the root
pub fn resolve_fixture_path(root: &Path, file_name: &str) -> Result<PathBuf> {
    validate_file_name(file_name)?;
    Ok(root.join(file_name))
}

/// Validate a fixture file name taken from a URL or a metadata record
///
/// # Errors
///
/// Returns error if the name could address a file outside the fixture root
fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FixtureError::InvalidFormat(
            "Fixture file name cannot be empty".to_string(),
        ));
    }

    if name.len() > FILE_NAME_MAX {
        return Err(FixtureError::InvalidFormat(format!(
            "Fixture file name too long: {} > {FILE_NAME_MAX}",
            name.len()
        )));
    }

    if name.contains('\0') {
        return Err(FixtureError::InvalidFormat(
            "Fixture file name cannot contain null bytes".to_string(),
        ));
    }

    let escapes = Path::new(name)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || name.contains('\\') {
        return Err(FixtureError::InvalidFormat(format!(
            "Fixture file name must stay inside the fixture root: {name}"
        )));
    }

    Ok(())
}
