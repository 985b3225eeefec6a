//! coprior CLI - Class co-occurrence priors from detection datasets.
//!
//! coprior merges COCO-format annotation files, optionally joins precomputed
//! region proposals, and tallies a class co-occurrence matrix for use as an
//! attention prior in relation-detection models.
//!
//! # Usage
//!
//! ```bash
//! # Compute a prior from a dataset file
//! coprior compute --dataset instances_train.json --output prior.json
//!
//! # Summarize a dataset
//! coprior inspect instances_train.json
//!
//! # View configuration
//! coprior config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// coprior - Class co-occurrence priors from detection datasets.
#[derive(Parser, Debug)]
#[command(name = "coprior")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge datasets and compute the co-occurrence prior
    Compute(cli::compute::ComputeArgs),

    /// Summarize datasets: images, instances, per-class appearances
    Inspect(cli::inspect::InspectArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match coprior_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `coprior config path`."
            );
            coprior_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("coprior v{}", coprior_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Compute(args) => cli::compute::execute(args, &config),
        Commands::Inspect(args) => cli::inspect::execute(args, &config),
        Commands::Config(args) => cli::config::execute(args),
    }
}
