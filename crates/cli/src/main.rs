//! datasift CLI, the main entry point.
//!
//! Commands:
//! - `profile`:  Column schema of the input tables
//! - `estimate`: Token estimate of the input tables
//! - `reduce`:   Shrink the input until it fits the token budget
//! - `select`:   Pick a bounded, diverse subset of rows
//! - `run`:      Profile, reduce, and select in one go
//! - `config`:   Show, validate, locate, or initialize configuration
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod loader;

#[derive(Parser)]
#[command(
    name = "datasift",
    about = "datasift: fit tabular data into a token budget and pick a diverse subset",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ~/.datasift/config.toml)
    #[arg(short, long, global = true, env = "DATASIFT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Input files shared by the data commands.
#[derive(clap::Args)]
struct Inputs {
    /// Delimited input files; all must share one header
    #[arg(short, long = "input", required = true, num_args = 1..)]
    input: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile every column of the input
    Profile {
        #[command(flatten)]
        inputs: Inputs,

        /// Business enrichment document (TOML)
        #[arg(short, long)]
        enrichment: Option<PathBuf>,
    },

    /// Estimate the token cost of the input
    Estimate {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Reduce the input until it fits the token budget
    Reduce {
        #[command(flatten)]
        inputs: Inputs,

        #[arg(short, long)]
        enrichment: Option<PathBuf>,

        /// Override budget.max_tokens
        #[arg(long)]
        max_tokens: Option<usize>,
    },

    /// Select a bounded, diverse subset of rows
    Select {
        #[command(flatten)]
        inputs: Inputs,

        #[arg(short, long)]
        enrichment: Option<PathBuf>,

        /// Override selection.target_count
        #[arg(short, long)]
        target: Option<usize>,
    },

    /// Profile, reduce, and select
    Run {
        #[command(flatten)]
        inputs: Inputs,

        #[arg(short, long)]
        enrichment: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Load and validate the configuration
    Validate,
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Profile { inputs, enrichment } => {
            commands::profile::run(config, &inputs.input, enrichment.as_deref())?
        }
        Commands::Estimate { inputs } => commands::estimate::run(config, &inputs.input)?,
        Commands::Reduce {
            inputs,
            enrichment,
            max_tokens,
        } => commands::reduce::run(config, &inputs.input, enrichment.as_deref(), max_tokens)?,
        Commands::Select {
            inputs,
            enrichment,
            target,
        } => commands::select::run(config, &inputs.input, enrichment.as_deref(), target)?,
        Commands::Run { inputs, enrichment } => {
            commands::run::run(config, &inputs.input, enrichment.as_deref())?
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config)?,
            ConfigAction::Validate => commands::config_cmd::validate(config)?,
            ConfigAction::Path => commands::config_cmd::path(config)?,
            ConfigAction::Init { force } => commands::config_cmd::init(config, force)?,
        },
    }

    Ok(())
}
