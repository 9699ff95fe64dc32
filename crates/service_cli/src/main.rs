//! Lifepath CLI - Command Line Operations for Retirement Simulation
//!
//! This is the operational entry point for the Lifepath simulation engine.
//!
//! # Commands
//!
//! - `lifepath simulate --plan <file>` - Run the full Monte Carlo study
//! - `lifepath safe-rate --plan <file>` - Solve the 90%-success spending rate
//! - `lifepath template` - Emit a starter plan file
//!
//! # Architecture
//!
//! As the service layer of the workspace, this crate orchestrates plan_core
//! and plan_engine behind a unified command-line interface; nothing in the
//! engine depends back on it.

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

/// Lifepath Retirement Simulation CLI
#[derive(Parser)]
#[command(name = "lifepath")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full Monte Carlo study for a plan
    Simulate {
        /// Path to the plan file (TOML)
        #[arg(short, long)]
        plan: String,

        /// Number of Monte Carlo realizations
        #[arg(short, long, default_value = "5000")]
        iterations: u32,

        /// Root seed for the batch
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output format (summary, json)
        #[arg(short, long, default_value = "summary")]
        format: String,

        /// Write results to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Solve the highest spending rate that clears 90% success
    SafeRate {
        /// Path to the plan file (TOML)
        #[arg(short, long)]
        plan: String,

        /// Number of Monte Carlo realizations for the main batch
        #[arg(short, long, default_value = "2000")]
        iterations: u32,

        /// Root seed for the batch
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Emit a starter plan file
    Template {
        /// Write the template to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    // Initialise tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Simulate {
            plan,
            iterations,
            seed,
            format,
            output,
        } => commands::simulate::run(&plan, iterations, seed, &format, output.as_deref()),
        Commands::SafeRate {
            plan,
            iterations,
            seed,
        } => commands::safe_rate::run(&plan, iterations, seed),
        Commands::Template { output } => commands::template::run(output.as_deref()),
    }
}
