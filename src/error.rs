use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a run.
///
/// Data-quality problems (missing versions, odd license fields) never show up here; they
/// degrade to an empty version or `UNKNOWN`.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("dependency listing has no `dependencies` key\n\nHint: run the command from a project with installed packages (`npm install`)")]
    MissingDependencies,

    #[error("failed to run `{command}`: {source}\n\nHint: make sure it is installed and on PATH, or use --from-fs")]
    ListerSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dependency listing is not valid JSON: {details}")]
    InvalidManifest { details: String },

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory {dir} does not exist\n\nHint: create it or pass a different --output path")]
    OutputDirMissing { dir: PathBuf },

    #[error("invalid config file {path}: {details}")]
    ConfigParse { path: PathBuf, details: String },
}
