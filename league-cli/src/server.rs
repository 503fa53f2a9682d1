//! Server command - start the league HTTP API
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), open_season(), start_server()
//! - Level 3: open_store()
//! - Level 4: (delegated to league-server crate)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use league_core::{MemoryStore, Repository, Season, SeasonConfig, SqliteStore};
use league_server::{run_server, ServerConfig};

use crate::roster::RosterArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, env = "APP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port number to listen on
    #[arg(long, env = "APP_PORT", default_value = "8081")]
    pub port: u16,

    /// SQLite database file; the season is kept in memory when omitted
    #[arg(long, env = "LEAGUE_DB", value_name = "FILE")]
    pub db: Option<PathBuf>,

    #[command(flatten)]
    pub roster: RosterArgs,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run server command
///
/// This function reads like a table of contents:
/// 1. Configure server
/// 2. Open the season on the chosen store
/// 3. Start server (blocking)
pub fn run(args: ServerArgs, seed: Option<u64>) -> Result<()> {
    let config = configure_server(&args);
    let season = open_season(&args, seed)?;

    tracing::info!(
        "Starting league server on {}:{} ({})",
        config.host,
        config.port,
        args.db
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "in-memory".to_string())
    );

    start_server(config, season)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Configure server from command arguments
fn configure_server(args: &ServerArgs) -> ServerConfig {
    ServerConfig {
        host: args.host.clone(),
        port: args.port,
    }
}

/// Build the season the server will drive
fn open_season(args: &ServerArgs, seed: Option<u64>) -> Result<Season> {
    let names = args.roster.names()?;
    let store = open_store(args.db.as_ref(), &names)?;

    let mut config = SeasonConfig::default();
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    Season::new(store, config).context("Invalid season configuration")
}

/// Start the server (blocking)
fn start_server(config: ServerConfig, season: Season) -> Result<()> {
    // Create tokio runtime for async server
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config, season).await })
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Open SQLite when a path is given, otherwise a fresh in-memory store.
/// An existing database keeps its own roster.
fn open_store(db: Option<&PathBuf>, names: &[String]) -> Result<Arc<dyn Repository>> {
    match db {
        Some(path) => {
            let store = SqliteStore::open(path, names)
                .with_context(|| format!("Failed to open database: {}", path.display()))?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryStore::new(names))),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use league_core::DEFAULT_ROSTER;

    fn args(db: Option<PathBuf>) -> ServerArgs {
        ServerArgs {
            host: "127.0.0.1".to_string(),
            port: 9090,
            db,
            roster: RosterArgs {
                teams: DEFAULT_ROSTER.iter().map(|t| t.to_string()).collect(),
            },
        }
    }

    #[test]
    fn test_configure_server() {
        let config = configure_server(&args(None));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_in_memory_season() {
        let season = open_season(&args(None), Some(1)).unwrap();
        assert_eq!(season.competitors().unwrap().len(), 4);
        assert!(season.fixtures().unwrap().is_empty());
    }

    #[test]
    fn test_sqlite_season() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("league.db");

        let season = open_season(&args(Some(path.clone())), Some(1)).unwrap();
        season.simulate_week(1).unwrap();
        drop(season);

        let reopened = open_season(&args(Some(path)), Some(1)).unwrap();
        assert_eq!(reopened.fixtures().unwrap().len(), 12);
    }
}
