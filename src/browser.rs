use std::path::Path;
use std::process::{Command, Stdio};

/// Opener command and leading arguments for an OS name as in `std::env::consts::OS`.
fn opener(os: &str) -> Option<(&'static str, &'static [&'static str])> {
    match os {
        "aix" => Some(("defaultbrowser", &[])),
        "macos" => Some(("open", &[])),
        "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" | "solaris" | "illumos" => {
            Some(("xdg-open", &[]))
        }
        // `start` is a cmd builtin; the empty string is the window title.
        "windows" => Some(("cmd", &["/C", "start", ""])),
        _ => None,
    }
}

/// Open `path` in the default browser without waiting for it.
///
/// Unsupported platforms and launch failures are logged, never fatal.
pub fn open(path: &Path) {
    let Some((command, args)) = opener(std::env::consts::OS) else {
        tracing::warn!(
            "Opening the HTML report is not supported on platform: {}",
            std::env::consts::OS
        );
        return;
    };

    tracing::info!("Opening report in default browser...");
    let spawned = Command::new(command)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    if let Err(e) = spawned {
        tracing::warn!("Failed to launch {}: {}", command, e);
    }
}
