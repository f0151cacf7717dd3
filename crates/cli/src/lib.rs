//! # ArchSync CLI
//!
//! Command-line front end for the schema-evolution engine.
//!
//! ## Commands
//!
//! - `diff` - Compare two entity spec files
//! - `baseline` - Record the current spec as the known schema
//! - `generate` - Generate (and save) a migration for spec changes
//! - `status` - Summarize baseline, history, and pending migrations
//! - `pending` - List migration files not yet applied
//! - `record` - Record a migration as applied
//! - `reset-state` - Recover from a corrupt state file
//!

mod commands;
mod output;

use archsync_codegen::migrations::Direction;
use archsync_core::{Dialect, EngineError};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "archsync")]
#[command(about = "Schema evolution engine: diff entity specs and generate SQL migrations")]
#[command(version)]
pub struct Cli {
    /// Project root (config, state file and migrations resolve against it)
    #[arg(long, global = true, env = "ARCHSYNC_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Configuration file [default: <root>/archsync.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQL dialect: postgresql, mysql or sqlite
    #[arg(long, global = true)]
    pub dialect: Option<Dialect>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare two entity spec files
    Diff {
        /// Old spec (JSON)
        #[arg(long)]
        from: PathBuf,

        /// New spec (JSON)
        #[arg(long)]
        to: PathBuf,

        /// Print the diff as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record the entities in a spec file as the known schema
    Baseline {
        /// Entity spec (JSON)
        #[arg(long)]
        spec: PathBuf,
    },

    /// Generate a migration from the last snapshot to a spec file
    Generate {
        /// Entity spec (JSON)
        #[arg(long)]
        spec: PathBuf,

        /// Migration name [default: migration_<timestamp>]
        #[arg(long)]
        name: Option<String>,

        /// Print the migration without writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show migration status
    Status {
        /// Print status as JSON
        #[arg(long)]
        json: bool,
    },

    /// List migrations that have not been applied
    Pending,

    /// Record a migration as applied
    Record {
        /// Migration name (without timestamp prefix and extension)
        name: String,

        /// Direction the migration was applied in
        #[arg(long, default_value = "up")]
        direction: Direction,
    },

    /// Move the state file aside and start with an empty state
    ResetState,
}

impl Cli {
    /// Default `tracing` filter for the requested verbosity
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Parse command-line arguments
pub fn parse() -> Cli {
    Cli::parse()
}

/// Execute a parsed command
pub fn run(cli: Cli) -> anyhow::Result<()> {
    commands::execute(cli)
}

/// Print an error chain to stderr
pub fn report_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "error:".red().bold(), err);

    let corrupt = err
        .chain()
        .any(|e| matches!(e.downcast_ref::<EngineError>(), Some(EngineError::StateCorrupt { .. })));
    if corrupt {
        eprintln!(
            "{} run `archsync reset-state` to move the file aside and start over",
            "hint:".yellow().bold()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "archsync",
            "--dialect",
            "mysql",
            "-vv",
            "generate",
            "--spec",
            "entities.json",
            "--name",
            "add users",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.dialect, Some(Dialect::MySQL));
        assert_eq!(cli.log_directive(), "debug");
        match cli.command {
            Commands::Generate {
                spec,
                name,
                dry_run,
            } => {
                assert_eq!(spec, PathBuf::from("entities.json"));
                assert_eq!(name.as_deref(), Some("add users"));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_record_direction() {
        let cli = Cli::try_parse_from(["archsync", "record", "add_users", "--direction", "down"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Record {
                direction: Direction::Down,
                ..
            }
        ));
        assert_eq!(cli.log_directive(), "warn");
    }

    #[test]
    fn test_rejects_unknown_dialect() {
        assert!(Cli::try_parse_from(["archsync", "--dialect", "oracle", "pending"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["archsync", "status", "--root", "/tmp/project", "-v"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("/tmp/project"));
        assert_eq!(cli.log_directive(), "info");
    }
}
