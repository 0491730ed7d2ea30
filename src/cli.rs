use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "license-report",
    about = "Inventory installed npm dependencies and their licenses into an HTML report",
    version
)]
pub struct Cli {
    /// Project path to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Report output path [default: ./license-report.html]
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Open the report in the default browser once written
    #[arg(long)]
    pub open: bool,

    /// Report format
    #[arg(long, default_value = "html", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Read a saved `npm ls --all --json --long` listing instead of running npm
    #[arg(long, value_name = "FILE", conflicts_with = "from_fs")]
    pub input: Option<PathBuf>,

    /// Walk node_modules directly instead of running npm
    #[arg(long)]
    pub from_fs: bool,

    /// Look up missing licenses in the npm registry
    #[arg(long)]
    pub online: bool,

    /// Config file [default: ./.license-report/config.toml, fallback ~/.config/license-report/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `license_report=trace` [default: $RUST_LOG or info]
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Also print every dependency in a table
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print a one-line summary
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum ReportFormat {
    Html,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["license-report"]);
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.output, None);
        assert!(!cli.open);
        assert_eq!(cli.report, ReportFormat::Html);
    }

    #[test]
    fn test_open_flag() {
        let cli = Cli::parse_from(["license-report", "--open"]);
        assert!(cli.open);
        assert_eq!(cli.output, None);
    }

    #[test]
    fn test_output_separate_value() {
        let cli = Cli::parse_from(["license-report", "--output", "custom-output.html"]);
        assert_eq!(cli.output, Some(PathBuf::from("custom-output.html")));
        assert!(!cli.open);
    }

    #[test]
    fn test_output_equals_value() {
        let cli = Cli::parse_from(["license-report", "--output=custom-output.html"]);
        assert_eq!(cli.output, Some(PathBuf::from("custom-output.html")));
    }

    #[test]
    fn test_input_conflicts_with_from_fs() {
        let result = Cli::try_parse_from(["license-report", "--input", "deps.json", "--from-fs"]);
        assert!(result.is_err());
    }
}
