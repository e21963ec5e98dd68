//! Pyro CLI - headless driver and tooling for Pyro effects

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, run, styles};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pyro")]
#[command(about = "Run and inspect firework particle effects without a window", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fireworks effect headlessly and report statistics
    Run {
        /// Settings file (TOML)
        #[arg(long)]
        config: Option<String>,

        /// Frames to render
        #[arg(long, default_value = "600")]
        frames: u64,

        /// Render rate in frames per second
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Simulation rate in steps per second
        #[arg(long, default_value = "60")]
        sim_hz: f64,

        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Starting style (overrides the config file)
        #[arg(long)]
        style: Option<String>,

        /// Simulate a click every N seconds
        #[arg(long)]
        click_interval: Option<f64>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the available styles and their default tuning
    Styles {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a settings file for unknown keys and bad values
    CheckConfig {
        /// Settings file (TOML)
        file: String,
    },
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Run {
            config,
            frames,
            fps,
            sim_hz,
            seed,
            style,
            click_interval,
            json,
        } => run::run(run::RunArgs {
            config,
            frames,
            fps,
            sim_hz,
            seed,
            style,
            click_interval,
            json,
        }),
        Commands::Styles { json } => styles::run(json),
        Commands::CheckConfig { file } => check::run(&file),
    }
}
