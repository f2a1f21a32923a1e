//! Binary entry point for aurora-memory.
//!
//! This binary provides the CLI interface over the memory engine library.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use aurora_memory::config::{AuroraConfig, ContextMode};
use aurora_memory::models::Category;
use aurora_memory::observability;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Aurora memory - file-backed memory for a conversational agent.
#[derive(Parser)]
#[command(name = "aurora-memory")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    ///
    /// Not global: `search` uses `-c` for categories.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Ingest raw conversation dumps into the memory store.
    Ingest {
        /// Directory holding `<name>_DD_MM_YYYY.txt` dumps.
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Rebuild the memory index.
    Index {
        /// Rebuild even if the index is current.
        #[arg(short, long)]
        force: bool,
    },

    /// Search memory items.
    Search {
        /// The search query.
        query: String,

        /// Restrict to a category (repeatable).
        #[arg(short = 'c', long = "category")]
        categories: Vec<Category>,

        /// Maximum number of results.
        #[arg(short = 'k', long, default_value = "8")]
        top_k: usize,
    },

    /// Print the assembled memory context.
    Context {
        /// Query used to select short and long-term items.
        #[arg(short, long)]
        query: Option<String>,

        /// Context mode: fast or precise (defaults to the configured mode).
        #[arg(short, long)]
        mode: Option<ContextMode>,
    },

    /// Print a generator prompt with memory context.
    Prompt {
        /// The user turn.
        query: String,

        /// Context mode: fast or precise (defaults to the configured mode).
        #[arg(short, long)]
        mode: Option<ContextMode>,
    },

    /// Print or rebuild the digest of a category.
    Canonical {
        /// Category name.
        category: Category,

        /// Discard the cached digest and build a new one.
        #[arg(long)]
        rebuild: bool,
    },

    /// Show status.
    Status,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            "aurora-memory",
            &mut std::io::stdout(),
        );
        return ExitCode::SUCCESS;
    }

    let config = match AuroraConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_config(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: &AuroraConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Ingest { data_dir } => commands::cmd_ingest(config, data_dir),

        Commands::Index { force } => commands::cmd_index(config, force),

        Commands::Search {
            query,
            categories,
            top_k,
        } => commands::cmd_search(config, &query, &categories, top_k),

        Commands::Context { query, mode } => {
            commands::cmd_context(config, query.as_deref(), mode.unwrap_or(config.mode))
        },

        Commands::Prompt { query, mode } => {
            commands::cmd_prompt(config, &query, mode.unwrap_or(config.mode))
        },

        Commands::Canonical { category, rebuild } => {
            commands::cmd_canonical(config, category, rebuild)
        },

        Commands::Status => commands::cmd_status(config),

        // Handled before configuration is loaded.
        Commands::Completions { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_categories_do_not_clash_with_config() {
        let cli = Cli::try_parse_from([
            "aurora-memory",
            "-c",
            "cfg.toml",
            "search",
            "cafe",
            "-c",
            "long_term",
            "-c",
            "short-term",
            "-k",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("cfg.toml")));
        let Commands::Search {
            query,
            categories,
            top_k,
        } = cli.command
        else {
            unreachable!("expected search command");
        };
        assert_eq!(query, "cafe");
        assert_eq!(categories, vec![Category::LongTerm, Category::ShortTerm]);
        assert_eq!(top_k, 3);
    }

    #[test]
    fn test_mode_parsing() {
        let cli = Cli::try_parse_from(["aurora-memory", "prompt", "oi", "--mode", "precise"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Prompt {
                mode: Some(ContextMode::Precise),
                ..
            }
        ));

        assert!(Cli::try_parse_from(["aurora-memory", "context", "--mode", "slow"]).is_err());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["aurora-memory", "canonical", "episodic"]).is_err());
    }
}
