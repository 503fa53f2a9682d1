//! In-memory store
//!
//! State lives behind one `RwLock`. A transaction takes the write guard and
//! edits a working copy; commit swaps the copy in, drop discards it.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::{Repository, Transaction};
use crate::error::{LeagueError, LeagueResult};
use crate::model::{
    Competitor, CompetitorId, Fixture, FixtureFilter, FixtureId, NewFixture, Prediction,
    StandingsDelta, StandingsRow,
};

#[derive(Clone, Debug, Default)]
struct LeagueData {
    competitors: Vec<Competitor>,
    fixtures: Vec<Fixture>,
    standings: Vec<StandingsRow>,
    predictions: Vec<Prediction>,
    next_fixture_id: FixtureId,
}

impl LeagueData {
    fn fixtures(&self, filter: FixtureFilter) -> Vec<Fixture> {
        let mut fixtures: Vec<Fixture> = self
            .fixtures
            .iter()
            .filter(|f| filter.matches(f))
            .cloned()
            .collect();
        fixtures.sort_by_key(|f| (f.week, f.id));
        fixtures
    }

    fn fixture_mut(&mut self, id: FixtureId) -> LeagueResult<&mut Fixture> {
        self.fixtures
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(LeagueError::FixtureNotFound(id))
    }

    fn standings_row_mut(&mut self, competitor: CompetitorId) -> LeagueResult<&mut StandingsRow> {
        self.standings
            .iter_mut()
            .find(|row| row.competitor.id == competitor)
            .ok_or(LeagueError::CompetitorNotFound(competitor))
    }

    fn has_competitor(&self, id: CompetitorId) -> bool {
        self.competitors.iter().any(|c| c.id == id)
    }
}

/// Volatile store, used by default by the server and in tests
pub struct MemoryStore {
    data: RwLock<LeagueData>,
}

impl MemoryStore {
    /// Store seeded with competitors named `names`, ids starting at 1
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let competitors = names
            .iter()
            .zip(1..)
            .map(|(name, id)| Competitor::new(id, name.as_ref()))
            .collect();
        Self::with_competitors(competitors)
    }

    pub fn with_competitors(mut competitors: Vec<Competitor>) -> Self {
        competitors.sort_by_key(|c| c.id);
        let standings = competitors.iter().cloned().map(StandingsRow::new).collect();
        Self {
            data: RwLock::new(LeagueData {
                competitors,
                fixtures: Vec::new(),
                standings,
                predictions: Vec::new(),
                next_fixture_id: 1,
            }),
        }
    }

    fn read(&self) -> LeagueResult<RwLockReadGuard<'_, LeagueData>> {
        self.data.read().map_err(|_| LeagueError::poisoned("memory store"))
    }
}

impl Repository for MemoryStore {
    fn list_competitors(&self) -> LeagueResult<Vec<Competitor>> {
        Ok(self.read()?.competitors.clone())
    }

    fn get_competitor(&self, id: CompetitorId) -> LeagueResult<Competitor> {
        self.read()?
            .competitors
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(LeagueError::CompetitorNotFound(id))
    }

    fn count_fixtures(&self) -> LeagueResult<usize> {
        Ok(self.read()?.fixtures.len())
    }

    fn list_fixtures(&self, filter: FixtureFilter) -> LeagueResult<Vec<Fixture>> {
        Ok(self.read()?.fixtures(filter))
    }

    fn get_standings_row(&self, competitor: CompetitorId) -> LeagueResult<StandingsRow> {
        self.read()?
            .standings
            .iter()
            .find(|row| row.competitor.id == competitor)
            .cloned()
            .ok_or(LeagueError::CompetitorNotFound(competitor))
    }

    fn list_standings(&self) -> LeagueResult<Vec<StandingsRow>> {
        Ok(self.read()?.standings.clone())
    }

    fn list_predictions(&self) -> LeagueResult<Vec<Prediction>> {
        let mut predictions = self.read()?.predictions.clone();
        predictions.sort_by_key(|p| p.predicted_position);
        Ok(predictions)
    }

    fn begin(&self) -> LeagueResult<Box<dyn Transaction + '_>> {
        let guard = self
            .data
            .write()
            .map_err(|_| LeagueError::poisoned("memory store"))?;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

struct MemoryTransaction<'a> {
    guard: RwLockWriteGuard<'a, LeagueData>,
    working: LeagueData,
}

impl Transaction for MemoryTransaction<'_> {
    fn get_fixture(&self, id: FixtureId) -> LeagueResult<Fixture> {
        self.working
            .fixtures
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or(LeagueError::FixtureNotFound(id))
    }

    fn count_fixtures(&self) -> LeagueResult<usize> {
        Ok(self.working.fixtures.len())
    }

    fn insert_fixture_batch(&mut self, fixtures: &[NewFixture]) -> LeagueResult<Vec<Fixture>> {
        if !self.working.fixtures.is_empty() {
            return Err(LeagueError::FixturesAlreadyGenerated);
        }

        let created_at = Utc::now();
        let mut inserted = Vec::with_capacity(fixtures.len());
        for new in fixtures {
            for side in [&new.home, &new.away] {
                if !self.working.has_competitor(side.id) {
                    return Err(LeagueError::CompetitorNotFound(side.id));
                }
            }
            let fixture = Fixture {
                id: self.working.next_fixture_id,
                home: new.home.clone(),
                away: new.away.clone(),
                week: new.week,
                played: false,
                home_score: None,
                away_score: None,
                created_at,
            };
            self.working.next_fixture_id += 1;
            self.working.fixtures.push(fixture.clone());
            inserted.push(fixture);
        }
        Ok(inserted)
    }

    fn update_fixture_result(
        &mut self,
        id: FixtureId,
        home_score: u32,
        away_score: u32,
    ) -> LeagueResult<Fixture> {
        let fixture = self.working.fixture_mut(id)?;
        if fixture.played {
            return Err(LeagueError::FixtureAlreadyPlayed(id));
        }
        fixture.record_score(home_score, away_score);
        Ok(fixture.clone())
    }

    fn apply_standings_delta(
        &mut self,
        competitor: CompetitorId,
        delta: &StandingsDelta,
    ) -> LeagueResult<()> {
        self.working.standings_row_mut(competitor)?.apply(delta);
        Ok(())
    }

    fn reset_standings(&mut self) -> LeagueResult<()> {
        self.working.standings.iter_mut().for_each(StandingsRow::reset);
        Ok(())
    }

    fn clear_fixtures(&mut self) -> LeagueResult<()> {
        self.working.fixtures.clear();
        Ok(())
    }

    fn replace_predictions(&mut self, predictions: &[Prediction]) -> LeagueResult<()> {
        if let Some(unknown) = predictions
            .iter()
            .find(|p| !self.working.has_competitor(p.competitor.id))
        {
            return Err(LeagueError::CompetitorNotFound(unknown.competitor.id));
        }
        self.working.predictions = predictions.to_vec();
        Ok(())
    }

    fn clear_predictions(&mut self) -> LeagueResult<()> {
        self.working.predictions.clear();
        Ok(())
    }

    fn commit(self: Box<Self>) -> LeagueResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
