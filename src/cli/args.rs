//! CLI argument parsing using clap.
//!
//! Defines the command-line interface for leakshare-cli.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::share::{ActiveTab, LogLevel};

/// leakshare CLI - compose and open gitleaks playground share links
#[derive(Parser, Debug, Clone)]
#[command(name = "leakshare-cli")]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Output events and results as JSON lines (for scripting/parsing)
    #[arg(long, global = true)]
    pub json: bool,

    /// Only output results (suppress overlay and notification events)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Show verbose output (debug information)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compose a share link from a config file and input text
    Share {
        /// Configuration file (default: the engine's default configuration)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Input text file, or `-` for stdin
        #[arg(long)]
        input: Option<PathBuf>,

        /// Log level: Trace, Debug, Info, Warn, Error
        #[arg(long, default_value_t = LogLevel::Info)]
        log_level: LogLevel,

        /// Active tab: scan, config, wizard, entropy
        #[arg(long, default_value_t = ActiveTab::Scan)]
        tab: ActiveTab,

        /// Override `share.base_url` from settings
        #[arg(long, env = "LEAKSHARE_BASE_URL")]
        base_url: Option<String>,
    },

    /// Open a share link and print the reconciled session
    Open {
        /// Share link, `#fragment`, or bare fragment
        url: String,

        /// Write `config.toml` and `input.txt` here instead of printing
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Decode each fragment of a share link independently
    Inspect {
        /// Share link, `#fragment`, or bare fragment
        url: String,
    },

    /// Read or change persisted settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsAction {
    /// Print a setting by dotted key (e.g. share.base_url)
    Get { key: String },

    /// Set a setting; VALUE is parsed as JSON, falling back to a string
    Set { key: String, value: String },

    /// Restore defaults
    Reset,

    /// Print the settings file location
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_share_defaults() {
        let args = Args::parse_from(["leakshare-cli", "share"]);
        assert!(!args.json);
        assert!(!args.quiet);
        assert!(!args.verbose);
        match args.command {
            Command::Share {
                config,
                input,
                log_level,
                tab,
                ..
            } => {
                assert_eq!(config, None);
                assert_eq!(input, None);
                assert_eq!(log_level, LogLevel::Info);
                assert_eq!(tab, ActiveTab::Scan);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_args_share_values() {
        let args = Args::parse_from([
            "leakshare-cli",
            "share",
            "--config",
            "gitleaks.toml",
            "--input",
            "-",
            "--log-level",
            "debug",
            "--tab",
            "wizard",
        ]);
        match args.command {
            Command::Share {
                config,
                input,
                log_level,
                tab,
                ..
            } => {
                assert_eq!(config, Some(PathBuf::from("gitleaks.toml")));
                assert_eq!(input, Some(PathBuf::from("-")));
                assert_eq!(log_level, LogLevel::Debug);
                assert_eq!(tab, ActiveTab::Wizard);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_args_rejects_unknown_tab() {
        assert!(Args::try_parse_from(["leakshare-cli", "share", "--tab", "results"]).is_err());
    }

    #[test]
    fn test_args_global_flags_after_subcommand() {
        let args = Args::parse_from([
            "leakshare-cli",
            "open",
            "https://gitleaks.io/playground#default=1",
            "--json",
            "-q",
        ]);
        assert!(args.json);
        assert!(args.quiet);
        assert!(matches!(args.command, Command::Open { out_dir: None, .. }));
    }

    #[test]
    fn test_args_settings_set() {
        let args = Args::parse_from(["leakshare-cli", "settings", "set", "ui.theme", "dark"]);
        match args.command {
            Command::Settings {
                action: SettingsAction::Set { key, value },
            } => {
                assert_eq!(key, "ui.theme");
                assert_eq!(value, "dark");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
