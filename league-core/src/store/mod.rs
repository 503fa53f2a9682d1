//! Persistence boundary
//!
//! The engine only talks to storage through [`Repository`] (reads) and
//! [`Transaction`] (atomic writes). Dropping a transaction without calling
//! [`Transaction::commit`] rolls it back.
//!
//! Never call a `Repository` read while holding a `Transaction` on the same
//! thread: both implementations serialize on one lock.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::LeagueResult;
use crate::model::{
    Competitor, CompetitorId, Fixture, FixtureFilter, FixtureId, NewFixture, Prediction,
    StandingsDelta, StandingsRow,
};

/// Read access to league state plus the transactional entry point
pub trait Repository: Send + Sync {
    /// All competitors, ordered by id
    fn list_competitors(&self) -> LeagueResult<Vec<Competitor>>;

    fn get_competitor(&self, id: CompetitorId) -> LeagueResult<Competitor>;

    fn count_fixtures(&self) -> LeagueResult<usize>;

    /// Fixtures matching `filter`, ordered by (week, id)
    fn list_fixtures(&self, filter: FixtureFilter) -> LeagueResult<Vec<Fixture>>;

    fn get_standings_row(&self, competitor: CompetitorId) -> LeagueResult<StandingsRow>;

    /// One row per competitor, ordered by competitor id (not ranked)
    fn list_standings(&self) -> LeagueResult<Vec<StandingsRow>>;

    /// Stored predictions, ordered by predicted position
    fn list_predictions(&self) -> LeagueResult<Vec<Prediction>>;

    /// Open a write transaction. Holds the store's writer lock until it is
    /// committed or dropped.
    fn begin(&self) -> LeagueResult<Box<dyn Transaction + '_>>;
}

/// One atomic unit of writes
pub trait Transaction {
    fn get_fixture(&self, id: FixtureId) -> LeagueResult<Fixture>;

    fn count_fixtures(&self) -> LeagueResult<usize>;

    /// Insert a complete schedule. Fails with `FixturesAlreadyGenerated`
    /// if any fixture exists.
    fn insert_fixture_batch(&mut self, fixtures: &[NewFixture]) -> LeagueResult<Vec<Fixture>>;

    /// Set both scores and mark the fixture played. Fails with
    /// `FixtureAlreadyPlayed` on a played fixture.
    fn update_fixture_result(
        &mut self,
        id: FixtureId,
        home_score: u32,
        away_score: u32,
    ) -> LeagueResult<Fixture>;

    fn apply_standings_delta(
        &mut self,
        competitor: CompetitorId,
        delta: &StandingsDelta,
    ) -> LeagueResult<()>;

    /// Zero every standings row in place
    fn reset_standings(&mut self) -> LeagueResult<()>;

    fn clear_fixtures(&mut self) -> LeagueResult<()>;

    /// Delete all predictions and insert `predictions`
    fn replace_predictions(&mut self, predictions: &[Prediction]) -> LeagueResult<()>;

    fn clear_predictions(&mut self) -> LeagueResult<()>;

    fn commit(self: Box<Self>) -> LeagueResult<()>;
}
