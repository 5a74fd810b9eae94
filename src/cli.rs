//! Command-line interface definitions.
//!
//! Every option can also come from an environment variable. Values given
//! here override the optional YAML settings file passed with `--config`.

use clap::Parser;
use std::path::PathBuf;
use uredni_desky::config::Settings;
use uredni_desky::error::ConfigError;
use uredni_desky::extract::DocumentPolicy;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Basic usage
/// uredni_desky -e data/mesta.csv -j ./json
///
/// # Fewer workers, shorter timeout, give up after two minutes
/// uredni_desky -e data/mesta.csv -j ./json --workers 8 --timeout-secs 5 --deadline-secs 120
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// CSV table of cities and their notice board endpoints
    #[arg(short, long, env = "UREDNI_DESKY_ENDPOINTS")]
    pub endpoints: PathBuf,

    /// Output directory for the JSON files
    #[arg(short, long, env = "UREDNI_DESKY_JSON_OUTPUT_DIR")]
    pub json_output_dir: PathBuf,

    /// Optional path to a YAML settings file
    #[arg(short, long, env = "UREDNI_DESKY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum number of endpoints fetched at once
    #[arg(short, long, env = "UREDNI_DESKY_WORKERS")]
    pub workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, env = "UREDNI_DESKY_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Give up on outstanding endpoints after this many seconds
    #[arg(long, env = "UREDNI_DESKY_DEADLINE_SECS")]
    pub deadline_secs: Option<u64>,

    /// Skip notices that have no attached document link
    #[arg(long)]
    pub drop_without_document: bool,
}

impl Cli {
    /// Settings from the `--config` file (or defaults), with flags applied on top.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(workers) = self.workers {
            settings.workers = workers;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            settings.fetch.timeout_secs = timeout_secs;
        }
        if self.deadline_secs.is_some() {
            settings.deadline_secs = self.deadline_secs;
        }
        if self.drop_without_document {
            settings.document_policy = DocumentPolicy::Drop;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "uredni_desky",
            "--endpoints",
            "data/mesta.csv",
            "--json-output-dir",
            "./json",
        ]);

        assert_eq!(cli.endpoints, PathBuf::from("data/mesta.csv"));
        assert_eq!(cli.json_output_dir, PathBuf::from("./json"));
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "uredni_desky",
            "-e",
            "/tmp/mesta.csv",
            "-j",
            "/tmp/json",
            "-w",
            "8",
        ]);

        assert_eq!(cli.endpoints, PathBuf::from("/tmp/mesta.csv"));
        assert_eq!(cli.json_output_dir, PathBuf::from("/tmp/json"));
        assert_eq!(cli.workers, Some(8));
    }

    #[test]
    fn test_settings_defaults_without_flags() {
        let cli = Cli::parse_from(["uredni_desky", "-e", "mesta.csv", "-j", "json"]);
        assert_eq!(cli.settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_flags_override_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workers: 4\ndeadline_secs: 60\nfetch:\n  timeout_secs: 7").unwrap();
        let config = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from([
            "uredni_desky",
            "-e",
            "mesta.csv",
            "-j",
            "json",
            "-c",
            config.as_str(),
            "--workers",
            "32",
            "--drop-without-document",
        ]);
        let settings = cli.settings().unwrap();

        assert_eq!(settings.workers, 32);
        assert_eq!(settings.fetch.timeout_secs, 7);
        assert_eq!(settings.deadline_secs, Some(60));
        assert_eq!(settings.document_policy, DocumentPolicy::Drop);
    }
}
