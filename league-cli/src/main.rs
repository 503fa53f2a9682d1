//! League CLI - Command-line interface
//!
//! Commands:
//! - serve: Start the HTTP API
//! - play: Simulate a whole season in the terminal

mod roster;
mod season_cmd;
mod server;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "league")]
#[command(about = "Round-robin league simulator")]
struct Cli {
    /// Random seed for reproducible seasons
    #[arg(long, global = true, env = "LEAGUE_SEED")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve(server::ServerArgs),
    /// Simulate a whole season and print the results
    Play(season_cmd::PlayArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => server::run(args, cli.seed),
        Commands::Play(args) => season_cmd::run(args, cli.seed),
    }
}
