//! Command-line interface for fieldlog.
//!
//! This module provides the CLI structure and command arguments for the
//! `fieldlog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    fire_filter, ConfigCommand, DateArg, DraftCommand, DraftKind, EmtCommand, EmtFormArgs,
    FireCommand, FireFormArgs, ListArgs, NoteCommand, OutputFormat, ServeCommand, SeverityArg,
    SortArg, StatusCommand,
};

/// fieldlog - Incident logging for first responders
///
/// Keeps notes, EMT incidents and fire incidents on this device, with
/// autosaved drafts and filterable history.
#[derive(Debug, Parser)]
#[command(name = "fieldlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write and browse notes
    #[command(subcommand)]
    Note(NoteCommand),

    /// Log EMT incidents
    #[command(subcommand)]
    Emt(EmtCommand),

    /// Log fire incidents
    #[command(subcommand)]
    Fire(FireCommand),

    /// Inspect or discard autosaved drafts
    #[command(subcommand)]
    Draft(DraftCommand),

    /// Show what is stored
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Run the health check backend
    Serve(ServeCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn status_cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "fieldlog");
    }

    #[test]
    fn test_verbosity() {
        use crate::logging::Verbosity;

        assert_eq!(status_cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(status_cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(status_cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_note_add() {
        let cli = Cli::try_parse_from([
            "fieldlog", "note", "add", "Quiet shift", "-t", "Log", "--tag", "shift", "--lat",
            "45.5", "--lng", "-122.6",
        ])
        .unwrap();
        match cli.command {
            Command::Note(NoteCommand::Add {
                title,
                content,
                tags,
                lat,
                lng,
            }) => {
                assert_eq!(title, "Log");
                assert_eq!(content, "Quiet shift");
                assert_eq!(tags, vec!["shift".to_string()]);
                assert_eq!(lat, Some(45.5));
                assert_eq!(lng, Some(-122.6));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_note_add_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["fieldlog", "note", "add", "x", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn test_parse_emt_list() {
        let cli = Cli::try_parse_from([
            "fieldlog",
            "emt",
            "list",
            "--search",
            "ladder",
            "--condition",
            "Trauma",
            "--date",
            "last7",
            "--sort",
            "oldest",
        ])
        .unwrap();
        match cli.command {
            Command::Emt(EmtCommand::List {
                filter, conditions, ..
            }) => {
                assert_eq!(filter.search.as_deref(), Some("ladder"));
                assert_eq!(filter.date, DateArg::Last7);
                assert_eq!(filter.sort, Some(SortArg::Oldest));
                assert_eq!(conditions, vec!["Trauma".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_fire_list() {
        let cli = Cli::try_parse_from([
            "fieldlog",
            "fire",
            "list",
            "--type",
            "Vehicle Fire",
            "--severity",
            "critical",
            "--unit",
            "Engine 1",
            "-f",
            "json",
        ])
        .unwrap();
        match cli.command {
            Command::Fire(FireCommand::List {
                fire_type,
                severity,
                unit,
                format,
                ..
            }) => {
                assert_eq!(fire_type.as_deref(), Some("Vehicle Fire"));
                assert_eq!(severity, Some(SeverityArg::Critical));
                assert_eq!(unit.as_deref(), Some("Engine 1"));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_fire_new_draft() {
        let cli = Cli::try_parse_from([
            "fieldlog", "fire", "new", "--type", "Structure Fire", "--unit", "Ladder 3", "--draft",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Fire(FireCommand::New { draft: true, .. })
        ));
    }

    #[test]
    fn test_parse_emt_edit_defaults_to_latest() {
        let cli = Cli::try_parse_from(["fieldlog", "emt", "edit", "--vital", "HR 88"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Emt(EmtCommand::Edit { index: None, .. })
        ));
    }

    #[test]
    fn test_parse_draft_discard() {
        let cli = Cli::try_parse_from(["fieldlog", "draft", "discard", "fire"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Draft(DraftCommand::Discard {
                kind: DraftKind::Fire
            })
        ));
    }

    #[test]
    fn test_parse_serve_port() {
        let cli = Cli::try_parse_from(["fieldlog", "serve", "--port", "8080"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Serve(ServeCommand { port: Some(8080) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["fieldlog", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["fieldlog", "status", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let cli = Cli::try_parse_from(["fieldlog", "status", "-q"]).unwrap();
        assert!(cli.quiet);
    }
}
