use std::path::Path;

use tokio::process::Command;

use crate::config::ListerConfig;
use crate::error::ReportError;
use crate::models::RootManifest;

/// Run the configured lister in `project` and parse its complete stdout.
///
/// `npm ls` exits non-zero for peer/extraneous problems while still printing a full tree,
/// so a failing status is only logged.
pub async fn list(project: &Path, lister: &ListerConfig) -> Result<RootManifest, ReportError> {
    tracing::info!("Reading dependencies...");
    tracing::debug!(command = %lister.command, args = ?lister.args, "spawning lister");

    let output = Command::new(&lister.command)
        .args(&lister.args)
        .current_dir(project)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ReportError::ListerSpawn {
            command: lister.command.clone(),
            source,
        })?;

    for line in String::from_utf8_lossy(&output.stderr).lines() {
        if !line.trim().is_empty() {
            tracing::warn!("{}: {}", lister.command, line);
        }
    }

    if !output.status.success() {
        tracing::warn!("{} process exited with {}", lister.command, output.status);
    }

    super::parse_manifest(&output.stdout)
}
