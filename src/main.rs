//! `license-report` — inventory an npm project's installed dependencies and their licenses.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and install logging ([`logging`]).
//! 2. Load config ([`config::load_config`]).
//! 3. Obtain the dependency listing ([`source`]): `npm ls`, a saved file, or `node_modules`.
//! 4. Optionally fill in missing licenses from the npm registry (`--online`, [`registry`]).
//! 5. Flatten the tree and count licenses ([`analyzer`]).
//! 6. Write the HTML report and print the summary, or dump JSON ([`report`]).
//! 7. Optionally open the report in a browser (`--open`, [`browser`]).

mod analyzer;
mod browser;
mod cli;
mod config;
mod error;
mod license;
mod logging;
mod models;
mod registry;
mod report;
mod source;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, ReportFormat};
use config::{load_config, Config};
use error::ReportError;
use models::RootManifest;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref(), cli.quiet);

    // Resolve project path
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let config = load_config(&path, cli.config.as_deref())?;

    let mut manifest = read_manifest(&cli, &path, &config).await?;

    if cli.online {
        let resolved = registry::enrich(&mut manifest, &config.registry, cli.quiet).await?;
        tracing::info!("Resolved {} licenses from the registry", resolved);
    }

    let inventory = analyzer::analyze(&manifest)?;

    match cli.report {
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&inventory)?);
        }
        ReportFormat::Html => {
            let output = cli.output.clone().unwrap_or(config.report.output);
            report::html::write(&inventory, &output)?;
            report::terminal::render(&inventory, Some(&output), cli.verbose, cli.quiet);

            if cli.open || config.report.open {
                browser::open(&output);
            }
        }
    }

    Ok(())
}

/// Pick the listing source: `--input`, `--from-fs`, or the configured lister.
///
/// A lister that cannot be started falls back to `node_modules` when one exists.
async fn read_manifest(cli: &Cli, path: &Path, config: &Config) -> Result<RootManifest> {
    if let Some(input) = &cli.input {
        return Ok(source::read_manifest_file(input)?);
    }

    if cli.from_fs {
        return source::node_modules::scan(path);
    }

    match source::npm::list(path, &config.lister).await {
        Ok(manifest) => Ok(manifest),
        Err(err @ ReportError::ListerSpawn { .. })
            if source::node_modules::has_node_modules(path) =>
        {
            tracing::warn!("{}", err);
            tracing::warn!("Falling back to reading node_modules directly");
            source::node_modules::scan(path)
        }
        Err(err) => Err(err).context("failed to list installed dependencies"),
    }
}
