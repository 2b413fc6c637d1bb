use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::types::Version;

/// Read and parse the version file
pub fn read_version(path: &Path) -> Result<Version> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read version file: {}", path.display()))?;
    Version::parse(&raw).with_context(|| format!("invalid version file: {}", path.display()))
}
