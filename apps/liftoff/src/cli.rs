//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// liftoff - verified downloads and trusted clones from a manifest
#[derive(Parser)]
#[command(name = "liftoff")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verified downloads and trusted clones from a manifest")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write debug logs to the liftoff data directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate manifest file
    #[arg(long, global = true, value_name = "PATH", env = "LIFTOFF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Per-attempt timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Download every manifest file, then clone every repository
    Apply,

    /// Download manifest files only
    #[command(alias = "dl")]
    Download,

    /// Clone manifest repositories only
    Clone,

    /// Acquire a single file without a manifest
    Fetch {
        /// HTTPS URL to download
        url: String,

        /// Destination file path
        dest: PathBuf,

        /// Expected SHA-256 of the content (hex)
        #[arg(long, value_name = "HEX")]
        sha256: Option<String>,

        /// Store under this file name in the destination directory
        #[arg(long, value_name = "NAME")]
        rename: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from([
            "liftoff",
            "--timeout",
            "5",
            "fetch",
            "https://example.com/a.bin",
            "/tmp/a.bin",
            "--sha256",
            "abcd",
        ])
        .unwrap();

        assert_eq!(cli.global.timeout, Some(5));
        match cli.command {
            Commands::Fetch {
                url, sha256, rename, ..
            } => {
                assert_eq!(url, "https://example.com/a.bin");
                assert_eq!(sha256.as_deref(), Some("abcd"));
                assert!(rename.is_none());
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["liftoff", "apply", "--json"]).unwrap();
        assert!(cli.global.json);
        assert!(matches!(cli.command, Commands::Apply));
    }
}
