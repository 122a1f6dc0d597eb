//! CLI command definitions and dispatch for the `primus` binary.
//!
//! Uses clap derive macros for argument parsing. Character commands take the
//! owner explicitly (`--owner`), since the CLI operates on the local store
//! directly and bypasses API key authentication.

pub mod catalog;
pub mod character;
pub mod key;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use primus_observe::tracing_setup::LogFormat;

/// Manage tabletop character sheets.
#[derive(Parser)]
#[command(name = "primus", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file to use instead of `{data_dir}/config.toml`.
    #[arg(long, global = true, env = "PRIMUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log line format (text or json).
    #[arg(long, global = true, default_value = "text", env = "PRIMUS_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `server.port`).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to `server.host`).
        #[arg(long)]
        host: Option<String>,
    },

    /// Manage API keys (SQLite backend only).
    Key {
        #[command(subcommand)]
        action: KeyCommand,
    },

    /// Show the game catalog.
    Catalog {
        /// Only one table.
        #[arg(value_enum)]
        section: Option<CatalogSection>,
    },

    /// Dry-run validation of a character draft stored as JSON.
    Validate {
        /// Path to the draft (`name`, `level`, `role`, `archetype`, `stats`, `skills`).
        file: PathBuf,
    },

    /// List an owner's characters.
    #[command(alias = "ls")]
    List {
        /// Owner id.
        #[arg(long)]
        owner: String,

        /// Filter by role id.
        #[arg(long)]
        role: Option<String>,

        /// Filter by level.
        #[arg(long)]
        level: Option<u32>,

        /// Sort field (created_at, updated_at, name, level).
        #[arg(long, default_value = "created_at")]
        sort: String,

        /// Sort order (asc, desc).
        #[arg(long, default_value = "desc")]
        order: String,
    },

    /// Print a character sheet.
    Show {
        /// Owner id.
        #[arg(long)]
        owner: String,

        /// Character id.
        id: String,
    },

    /// Export a character sheet as JSON.
    Export {
        /// Owner id.
        #[arg(long)]
        owner: String,

        /// Character id.
        id: String,

        /// Write to this file instead of stdout.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Delete a character permanently.
    #[command(alias = "rm")]
    Delete {
        /// Owner id.
        #[arg(long)]
        owner: String,

        /// Character id.
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Owner-scoped statistics.
    Stats {
        /// Owner id.
        #[arg(long)]
        owner: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum KeyCommand {
    /// Issue a new key. The plaintext is printed once.
    Create {
        /// Owner the key authenticates as.
        #[arg(long)]
        owner: String,

        /// Label for the key.
        #[arg(long, default_value = "default")]
        name: String,
    },

    /// List an owner's keys.
    List {
        #[arg(long)]
        owner: String,
    },

    /// Revoke a key by id.
    Revoke {
        #[arg(long)]
        owner: String,

        /// Key id (from `key list`).
        id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogSection {
    Roles,
    Archetypes,
    Skills,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "primus", "list", "--owner", "alice", "--json", "-vv", "--log-format", "json",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::List { ref owner, .. } if owner == "alice"));
    }

    #[test]
    fn test_catalog_section_is_optional() {
        let cli = Cli::try_parse_from(["primus", "catalog", "skills"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Catalog {
                section: Some(CatalogSection::Skills)
            }
        ));
        let cli = Cli::try_parse_from(["primus", "catalog"]).unwrap();
        assert!(matches!(cli.command, Commands::Catalog { section: None }));
    }

    #[test]
    fn test_key_create_requires_owner() {
        assert!(Cli::try_parse_from(["primus", "key", "create"]).is_err());
        let cli = Cli::try_parse_from(["primus", "key", "create", "--owner", "bob"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Key {
                action: KeyCommand::Create { ref name, .. }
            } if name == "default"
        ));
    }
}
