//! # Leadflow CLI Module
//!
//! This module implements the CLI interface for Leadflow.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize a new database
//! - `create` - Create a lead
//! - `show` - Show one lead
//! - `stage` - Move a lead to another stage
//! - `analyze` - Score a lead
//! - `activity` - Record a contact activity
//! - `list` - List leads
//! - `sale` - Show the sale opened for a lead
//! - `status` - Show pipeline counts

mod commands;

use crate::config::{Backend, Config};
use clap::{Parser, Subcommand};
use leadflow_core::LeadError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Leadflow - lead tracking server
///
/// Tracks leads through new, contacted, qualified and transferred,
/// scores them, and opens a sale when one is handed over.
#[derive(Parser, Debug)]
#[command(name = "leadflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the lead database (overrides config)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend (overrides config)
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Path to a TOML config file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Initialize a new empty database
    Init {
        /// Overwrite an existing database
        #[arg(short, long)]
        force: bool,
    },

    /// Create a lead
    Create {
        /// Lead source (scanner, partner, manual)
        #[arg(short, long)]
        source: String,

        /// Business domain (first, second, third); omit when unknown
        #[arg(short, long)]
        domain: Option<String>,
    },

    /// Show one lead
    Show {
        /// Lead ID
        id: u64,
    },

    /// Move a lead to another stage
    Stage {
        /// Lead ID
        id: u64,

        /// Target stage (contacted, qualified, transferred, lost)
        stage: String,
    },

    /// Score a lead and store the recommendation
    Analyze {
        /// Lead ID
        id: u64,
    },

    /// Record one contact activity on a lead
    Activity {
        /// Lead ID
        id: u64,
    },

    /// List leads
    List {
        /// Only leads in this stage
        #[arg(short, long)]
        stage: Option<String>,
    },

    /// Show the sale opened for a transferred lead
    Sale {
        /// Lead ID
        id: u64,
    },

    /// Show pipeline counts
    Status,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

impl Cli {
    /// Resolve configuration: defaults, config file, environment, then flags.
    pub fn resolve_config(&self) -> Result<Config, LeadError> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(database) = &self.database {
            config.database.clone_from(database);
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        Ok(config)
    }
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), LeadError> {
    let mut config = cli.resolve_config()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            cmd_server(&config).await
        }
        Some(Commands::Init { force }) => cmd_init(&config, force),
        Some(Commands::Create { source, domain }) => {
            cmd_create(&config, json_mode, &source, domain.as_deref())
        }
        Some(Commands::Show { id }) => cmd_show(&config, json_mode, id),
        Some(Commands::Stage { id, stage }) => cmd_stage(&config, json_mode, id, &stage),
        Some(Commands::Analyze { id }) => cmd_analyze(&config, json_mode, id),
        Some(Commands::Activity { id }) => cmd_activity(&config, json_mode, id),
        Some(Commands::List { stage }) => cmd_list(&config, json_mode, stage.as_deref()),
        Some(Commands::Sale { id }) => cmd_sale(&config, json_mode, id),
        Some(Commands::Status) | None => cmd_status(&config, json_mode),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "leadflow",
            "--backend",
            "memory",
            "--database",
            "other.redb",
            "status",
        ])
        .expect("parse");
        let config = cli.resolve_config().expect("config");
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.database, PathBuf::from("other.redb"));
    }

    #[test]
    fn stage_command_takes_positionals() {
        let cli = Cli::try_parse_from(["leadflow", "stage", "7", "contacted"]).expect("parse");
        assert!(matches!(
            cli.command,
            Some(Commands::Stage { id: 7, ref stage }) if stage == "contacted"
        ));
    }

    #[test]
    fn unknown_backend_rejected() {
        assert!(Cli::try_parse_from(["leadflow", "--backend", "sqlite", "status"]).is_err());
    }
}
