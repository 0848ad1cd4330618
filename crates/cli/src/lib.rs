//! # fk_migrations CLI
//!
//! Command-line interface for generating foreign key DDL from migration
//! documents.
//!
//! ## Commands
//!
//! - `generate` - Print (or write) the `up` statements of migration documents
//! - `drop` - Print the `down` statements that revert them
//! - `check` - Validate documents and report what would be generated
//!

pub mod commands;
pub mod config;

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fkm_core::{Dialect, ReferentialAction};

pub use config::{DEFAULT_CONFIG_FILE, FileConfig, load_config};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Arguments
// ============================================================================

/// Foreign key migration helper
#[derive(Parser, Debug)]
#[command(name = "fkm")]
#[command(author, version, about = "Generate foreign key DDL for schema migrations", long_about = None)]
pub struct Cli {
    /// Path to config file (default: fkm.toml if present)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub generator: GeneratorArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for the `[generator]` table of the config file
#[derive(Args, Debug, Default, Clone)]
pub struct GeneratorArgs {
    /// Target dialect (postgresql, mysql, sqlserver)
    #[arg(short, long, global = true, env = "FKM_DIALECT", value_parser = parse_dialect)]
    pub dialect: Option<Dialect>,

    /// Maximum constraint name length
    #[arg(long, global = true, value_name = "N")]
    pub identifier_limit: Option<usize>,

    /// Default ON DELETE action
    #[arg(long, global = true, value_parser = parse_action)]
    pub on_delete: Option<ReferentialAction>,

    /// Default ON UPDATE action
    #[arg(long, global = true, value_parser = parse_action)]
    pub on_update: Option<ReferentialAction>,

    /// Quote identifiers
    #[arg(long, global = true)]
    pub quote: bool,

    /// Fail on over-long constraint names instead of shortening them
    #[arg(long, global = true)]
    pub no_truncate: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the statements that add the declared foreign keys
    Generate {
        /// Migration documents or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write migrations/<version>_<name>/{up,down}.sql below this directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Replace migration files that already exist
        #[arg(long, requires = "output")]
        overwrite: bool,
    },

    /// Generate the statements that revert the declared foreign keys
    Drop {
        /// Migration documents or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Validate migration documents without printing SQL
    Check {
        /// Migration documents or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn parse_dialect(s: &str) -> Result<Dialect, String> {
    s.parse().map_err(|e: fkm_core::MigrationError| e.to_string())
}

fn parse_action(s: &str) -> Result<ReferentialAction, String> {
    s.parse().map_err(|e: fkm_core::MigrationError| e.to_string())
}

// ============================================================================
// Entry point
// ============================================================================

/// Run a parsed command, writing its report to `out`
pub fn run(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), &cli.generator)?;

    tracing::debug!(
        dialect = %config.dialect,
        limit = config.identifier_limit(),
        "generator configured",
    );

    match cli.command {
        Command::Generate {
            paths,
            output,
            overwrite,
        } => commands::generate(config, &paths, output.as_deref(), overwrite, out),
        Command::Drop { paths } => commands::drop_statements(config, &paths, out),
        Command::Check { paths } => commands::check(config, &paths, out),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "fkm_cli");
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generator_flags() {
        let cli = Cli::try_parse_from([
            "fkm",
            "generate",
            "blog.toml",
            "--dialect",
            "mssql",
            "--on-delete",
            "set null",
            "--quote",
        ])
        .unwrap();

        assert_eq!(cli.generator.dialect, Some(Dialect::SqlServer));
        assert_eq!(cli.generator.on_delete, Some(ReferentialAction::SetNull));
        assert!(cli.generator.quote);
        assert!(matches!(cli.command, Command::Generate { ref paths, .. } if paths.len() == 1));
    }

    #[test]
    fn test_parse_rejects_unknown_dialect() {
        let err = Cli::try_parse_from(["fkm", "check", "a.toml", "--dialect", "sqlite"]).unwrap_err();
        assert!(err.to_string().contains("Unsupported SQL dialect"));
    }

    #[test]
    fn test_overwrite_requires_output() {
        assert!(Cli::try_parse_from(["fkm", "generate", "a.toml", "--overwrite"]).is_err());
    }
}
