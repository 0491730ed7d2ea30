//! Producers of the [`RootManifest`] the analyzer consumes.
//!
//! - [`npm`] — runs `npm ls --all --json --long` and parses its buffered output.
//! - [`node_modules`] — walks installed packages on disk when npm is unavailable.
//! - [`read_manifest_file`] — loads a previously captured listing.

pub mod node_modules;
pub mod npm;

use std::path::Path;

use crate::error::ReportError;
use crate::models::RootManifest;

/// Parse a complete listing document.
pub fn parse_manifest(bytes: &[u8]) -> Result<RootManifest, ReportError> {
    serde_json::from_slice(bytes).map_err(|e| ReportError::InvalidManifest {
        details: e.to_string(),
    })
}

/// Read a listing previously saved with `npm ls --all --json --long > deps.json`.
pub fn read_manifest_file(path: &Path) -> Result<RootManifest, ReportError> {
    let bytes = std::fs::read(path).map_err(|source| ReportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&bytes)
}
