//! Turns a parsed [`RootManifest`] into the sorted [`Inventory`] the renderers consume.

use std::cmp::Ordering;

use crate::error::ReportError;
use crate::models::{Inventory, RootManifest};

pub mod tree;

use tree::{flatten, TopLevelNames};

/// Flatten the manifest's dependency graph and sort entries by package name.
pub fn analyze(manifest: &RootManifest) -> Result<Inventory, ReportError> {
    let deps = manifest
        .dependencies
        .as_ref()
        .ok_or(ReportError::MissingDependencies)?;

    // Dev packages the user declared are direct as well; `is_dev` keeps them apart.
    let names = TopLevelNames::new(
        manifest
            .direct_dependencies
            .keys()
            .chain(manifest.dev_dependencies.keys())
            .cloned(),
        manifest.dev_dependencies.keys().cloned(),
    );

    tracing::info!("Processing dependencies...");
    tracing::debug!(roots = deps.len(), "flattening dependency tree");
    let flattened = flatten(deps, &names);

    let mut licenses: Vec<_> = flattened.entries.into_values().collect();
    licenses.sort_by(|a, b| locale_cmp(&a.name, &b.name));

    tracing::debug!(
        entries = licenses.len(),
        licenses = flattened.license_count.len(),
        "flattened"
    );

    Ok(Inventory {
        licenses,
        license_count: flattened.license_count,
    })
}

/// Case-insensitive ordering, close to `localeCompare` for package names.
///
/// Names equal up to case put the lowercase spelling first: `buffer` sorts before `Buffer`.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}
