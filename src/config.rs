use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use crate::error::ReportError;

/// Root configuration structure, deserialized from `.license-report/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report: ReportConfig,
    pub lister: ListerConfig,
    pub registry: RegistryConfig,
}

/// Where and how the HTML report is written.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output file; `--output` takes precedence.
    pub output: PathBuf,
    /// Open the report in the default browser after writing it.
    pub open: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("./license-report.html"),
            open: false,
        }
    }
}

/// The package-manager command whose JSON output describes the installed tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListerConfig {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for ListerConfig {
    fn default() -> Self {
        let command = if cfg!(windows) { "npm.cmd" } else { "npm" };
        Self {
            command: command.to_string(),
            args: ["ls", "--all", "--json", "--long"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// npm registry used by `--online`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "https://registry.npmjs.org".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.license-report/config.toml`
/// 3. `~/.config/license-report/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".license-report").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-report")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| ReportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&content).map_err(|e| ReportError::ConfigParse {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
