//! League Core - round-robin league simulation engine
//!
//! This crate provides the season logic for the league simulator:
//! - Double round-robin fixture generation
//! - Random match simulation
//! - Incremental standings with the canonical league ordering
//! - Week-by-week round execution, one transaction per fixture
//! - Heuristic championship predictions
//! - In-memory and SQLite repositories behind one trait pair

pub mod config;
pub mod error;
pub mod fixtures;
pub mod model;
pub mod predictions;
pub mod rounds;
pub mod season;
pub mod simulator;
pub mod standings;
pub mod store;

// Re-exports for convenient access
pub use config::{create_rng, SeasonConfig, DEFAULT_MAX_GOALS, DEFAULT_TOTAL_WEEKS};
pub use error::{ErrorKind, LeagueError, LeagueResult};
pub use fixtures::{matches_per_competitor, FixtureGenerator};
pub use model::{
    Competitor, CompetitorId, Fixture, FixtureFilter, FixtureId, NewFixture, Outcome, Prediction,
    StandingsDelta, StandingsRow, DRAW_POINTS, WIN_POINTS,
};
pub use predictions::PredictionGenerator;
pub use rounds::RoundExecutor;
pub use season::{checked_week, parse_week, Season, SimulationReport};
pub use simulator::{MatchSimulator, RandomSimulator};
pub use standings::{compare_rows, rank, StandingsLedger};
pub use store::{MemoryStore, Repository, SqliteStore, Transaction};

/// Competitors used when no roster is supplied
pub const DEFAULT_ROSTER: [&str; 4] = ["Chelsea", "Arsenal", "Manchester City", "Liverpool"];
