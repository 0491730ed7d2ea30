//! Online license lookup for packages whose installed metadata has none.
//!
//! Runs before flattening: resolved licenses are written back into the tree as plain
//! strings, so the flattener and its counts stay a function of the (enriched) manifest.

pub mod npm;

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::RegistryConfig;
use crate::license::extract::node_license;
use crate::models::{DependencyMap, LicenseDescriptor, RootManifest, UNKNOWN_LICENSE};

const BATCH_SIZE: usize = 75;

/// Query the registry for every `name@version` that resolves to `UNKNOWN`.
///
/// Returns the number of distinct package versions that gained a license.
pub async fn enrich(
    manifest: &mut RootManifest,
    registry: &RegistryConfig,
    quiet: bool,
) -> Result<usize> {
    let Some(deps) = manifest.dependencies.as_mut() else {
        return Ok(0);
    };

    let mut pending = BTreeSet::new();
    collect_unknown(deps, &mut pending);
    if pending.is_empty() {
        return Ok(0);
    }
    tracing::info!("Fetching {} unknown licenses from {}...", pending.len(), registry.url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(registry.timeout_secs))
        .build()?;

    let pb = if !quiet {
        let pb = ProgressBar::new(pending.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let pending: Vec<(String, String)> = pending.into_iter().collect();
    let mut found = HashMap::new();

    for batch in pending.chunks(BATCH_SIZE) {
        let futures: Vec<_> = batch
            .iter()
            .map(|(name, version)| {
                let client = client.clone();
                async move { npm::fetch_license(&client, &registry.url, name, version).await }
            })
            .collect();

        for ((name, version), result) in batch.iter().zip(join_all(futures).await) {
            match result {
                Ok(Some(license)) => {
                    found.insert((name.clone(), version.clone()), license);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(package = %name, %version, error = %e, "registry lookup failed")
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    apply_licenses(deps, &found);
    Ok(found.len())
}

fn collect_unknown(deps: &DependencyMap, pending: &mut BTreeSet<(String, String)>) {
    for (name, node) in deps.iter() {
        let version = node.version.as_deref().unwrap_or("");
        if !version.is_empty() && node_license(node) == UNKNOWN_LICENSE {
            pending.insert((name.to_string(), version.to_string()));
        }
        if let Some(children) = &node.dependencies {
            collect_unknown(children, pending);
        }
    }
}

fn apply_licenses(deps: &mut DependencyMap, found: &HashMap<(String, String), String>) {
    for (name, node) in deps.iter_mut() {
        if let Some(version) = node.version.clone() {
            if let Some(license) = found.get(&(name.to_string(), version)) {
                node.license = Some(LicenseDescriptor::PlainString(license.clone()));
                node.licenses = None;
            }
        }
        if let Some(children) = node.dependencies.as_mut() {
            apply_licenses(children, found);
        }
    }
}
