//! Example to run the league server standalone with an in-memory season
//!
//! Run with: cargo run -p league-server --example run_server

use league_core::{Season, SeasonConfig, DEFAULT_ROSTER};
use league_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ServerConfig::default();
    let season = Season::in_memory(&DEFAULT_ROSTER, SeasonConfig::default())?;

    println!("Starting league server on port {}", config.port);
    println!("Try: curl -X POST http://localhost:{}/api/matches/simulate/1", config.port);

    run_server(config, season).await
}
