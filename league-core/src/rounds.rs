//! Round execution - simulating scheduled fixtures into the standings
//!
//! Each fixture is one transaction: simulate, record the score, update both
//! standings rows, commit. A failure stops the call and leaves earlier
//! fixtures committed.

use std::sync::Arc;

use crate::error::{LeagueError, LeagueResult};
use crate::fixtures::FixtureGenerator;
use crate::model::{Fixture, FixtureFilter, FixtureId};
use crate::simulator::MatchSimulator;
use crate::standings::StandingsLedger;
use crate::store::Repository;

pub struct RoundExecutor {
    store: Arc<dyn Repository>,
    simulator: Arc<dyn MatchSimulator>,
    generator: Arc<FixtureGenerator>,
}

impl RoundExecutor {
    pub fn new(
        store: Arc<dyn Repository>,
        simulator: Arc<dyn MatchSimulator>,
        generator: Arc<FixtureGenerator>,
    ) -> Self {
        Self {
            store,
            simulator,
            generator,
        }
    }

    /// Simulate every unplayed fixture of `week`, in fixture id order.
    ///
    /// Weeks must be played in order: any unplayed fixture from an earlier
    /// week fails the call before anything is simulated.
    pub fn simulate_week(&self, week: u32) -> LeagueResult<Vec<Fixture>> {
        if week == 0 {
            return Err(LeagueError::InvalidWeek(0));
        }
        self.generator.ensure_schedule(self.store.as_ref())?;

        let unplayed_before = self
            .store
            .list_fixtures(FixtureFilter::unplayed())?
            .iter()
            .filter(|f| f.week < week)
            .count();
        if unplayed_before > 0 {
            return Err(LeagueError::PriorWeeksIncomplete {
                week,
                unplayed: unplayed_before,
            });
        }

        let pending = self.store.list_fixtures(FixtureFilter::unplayed_in_week(week))?;
        let played = self.play_all(&pending)?;

        tracing::info!("Simulated week {} ({} fixtures)", week, played.len());
        Ok(played)
    }

    /// Simulate every unplayed fixture of the season in (week, id) order
    pub fn simulate_all_remaining(&self) -> LeagueResult<Vec<Fixture>> {
        self.generator.ensure_schedule(self.store.as_ref())?;

        let pending = self.store.list_fixtures(FixtureFilter::unplayed())?;
        let played = self.play_all(&pending)?;

        tracing::info!("Simulated all remaining fixtures ({})", played.len());
        Ok(played)
    }

    fn play_all(&self, pending: &[Fixture]) -> LeagueResult<Vec<Fixture>> {
        let mut played = Vec::with_capacity(pending.len());
        for fixture in pending {
            if let Some(updated) = self.play_fixture(fixture.id)? {
                played.push(updated);
            }
        }
        Ok(played)
    }

    /// Play one fixture as a single atomic unit. Returns `None` if another
    /// caller played it first.
    fn play_fixture(&self, id: FixtureId) -> LeagueResult<Option<Fixture>> {
        let mut tx = self.store.begin()?;

        let fixture = tx.get_fixture(id)?;
        if fixture.played {
            return Ok(None);
        }

        let (home_score, away_score) = self.simulator.simulate(&fixture)?;
        let updated = tx.update_fixture_result(id, home_score, away_score)?;
        StandingsLedger::apply_result(
            &mut *tx,
            fixture.home.id,
            fixture.away.id,
            home_score,
            away_score,
        )?;
        tx.commit()?;

        tracing::debug!(
            "Week {}: {} {} - {} {}",
            updated.week,
            updated.home.name,
            home_score,
            away_score,
            updated.away.name
        );
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::create_rng;
    use crate::model::{
        Competitor, CompetitorId, NewFixture, Prediction, StandingsDelta, StandingsRow,
    };
    use crate::simulator::RandomSimulator;
    use crate::store::{MemoryStore, Transaction};
    use std::sync::Mutex;

    const ROSTER: [&str; 4] = ["Chelsea", "Arsenal", "Manchester City", "Liverpool"];

    /// Replays a fixed list of scores
    struct ScriptedSimulator {
        scores: Mutex<Vec<(u32, u32)>>,
    }

    impl ScriptedSimulator {
        fn new(mut scores: Vec<(u32, u32)>) -> Self {
            scores.reverse();
            Self {
                scores: Mutex::new(scores),
            }
        }
    }

    impl MatchSimulator for ScriptedSimulator {
        fn simulate(&self, _fixture: &Fixture) -> LeagueResult<(u32, u32)> {
            Ok(self.scores.lock().unwrap().pop().unwrap_or((1, 1)))
        }
    }

    /// Memory store whose transactions fail standings updates for one team
    struct FailingStore {
        inner: MemoryStore,
        fail_for: CompetitorId,
    }

    struct FailingTransaction<'a> {
        inner: Box<dyn Transaction + 'a>,
        fail_for: CompetitorId,
    }

    impl Repository for FailingStore {
        fn list_competitors(&self) -> LeagueResult<Vec<Competitor>> {
            self.inner.list_competitors()
        }
        fn get_competitor(&self, id: CompetitorId) -> LeagueResult<Competitor> {
            self.inner.get_competitor(id)
        }
        fn count_fixtures(&self) -> LeagueResult<usize> {
            self.inner.count_fixtures()
        }
        fn list_fixtures(&self, filter: FixtureFilter) -> LeagueResult<Vec<Fixture>> {
            self.inner.list_fixtures(filter)
        }
        fn get_standings_row(&self, competitor: CompetitorId) -> LeagueResult<StandingsRow> {
            self.inner.get_standings_row(competitor)
        }
        fn list_standings(&self) -> LeagueResult<Vec<StandingsRow>> {
            self.inner.list_standings()
        }
        fn list_predictions(&self) -> LeagueResult<Vec<Prediction>> {
            self.inner.list_predictions()
        }
        fn begin(&self) -> LeagueResult<Box<dyn Transaction + '_>> {
            Ok(Box::new(FailingTransaction {
                inner: self.inner.begin()?,
                fail_for: self.fail_for,
            }))
        }
    }

    impl Transaction for FailingTransaction<'_> {
        fn get_fixture(&self, id: FixtureId) -> LeagueResult<Fixture> {
            self.inner.get_fixture(id)
        }
        fn count_fixtures(&self) -> LeagueResult<usize> {
            self.inner.count_fixtures()
        }
        fn insert_fixture_batch(&mut self, fixtures: &[NewFixture]) -> LeagueResult<Vec<Fixture>> {
            self.inner.insert_fixture_batch(fixtures)
        }
        fn update_fixture_result(&mut self, id: FixtureId, h: u32, a: u32) -> LeagueResult<Fixture> {
            self.inner.update_fixture_result(id, h, a)
        }
        fn apply_standings_delta(
            &mut self,
            competitor: CompetitorId,
            delta: &StandingsDelta,
        ) -> LeagueResult<()> {
            if competitor == self.fail_for {
                return Err(LeagueError::Persistence("disk full".into()));
            }
            self.inner.apply_standings_delta(competitor, delta)
        }
        fn reset_standings(&mut self) -> LeagueResult<()> {
            self.inner.reset_standings()
        }
        fn clear_fixtures(&mut self) -> LeagueResult<()> {
            self.inner.clear_fixtures()
        }
        fn replace_predictions(&mut self, predictions: &[Prediction]) -> LeagueResult<()> {
            self.inner.replace_predictions(predictions)
        }
        fn clear_predictions(&mut self) -> LeagueResult<()> {
            self.inner.clear_predictions()
        }
        fn commit(self: Box<Self>) -> LeagueResult<()> {
            let this = *self;
            this.inner.commit()
        }
    }

    fn executor_with(
        store: Arc<dyn Repository>,
        simulator: Arc<dyn MatchSimulator>,
    ) -> RoundExecutor {
        let generator = Arc::new(FixtureGenerator::new(6, create_rng(Some(5))));
        RoundExecutor::new(store, simulator, generator)
    }

    fn executor(store: Arc<MemoryStore>) -> RoundExecutor {
        executor_with(store, Arc::new(RandomSimulator::new(5, create_rng(Some(11)))))
    }

    #[test]
    fn test_week_zero_rejected() {
        let store = Arc::new(MemoryStore::new(&ROSTER));
        let result = executor(store.clone()).simulate_week(0);
        assert!(matches!(result, Err(LeagueError::InvalidWeek(0))));
        assert_eq!(store.count_fixtures().unwrap(), 0);
    }

    #[test]
    fn test_first_simulation_generates_schedule() {
        let store = Arc::new(MemoryStore::new(&ROSTER));
        let played = executor(store.clone()).simulate_week(1).unwrap();

        assert_eq!(store.count_fixtures().unwrap(), 12);
        assert_eq!(played.len(), 2);
        assert!(played.iter().all(|f| f.week == 1 && f.played));
        assert!(played[0].id < played[1].id);
    }

    #[test]
    fn test_weeks_must_be_played_in_order() {
        let store = Arc::new(MemoryStore::new(&ROSTER));
        let executor = executor(store.clone());

        let err = executor.simulate_week(2).unwrap_err();
        assert!(matches!(
            err,
            LeagueError::PriorWeeksIncomplete { week: 2, unplayed: 2 }
        ));
        assert!(store
            .list_fixtures(FixtureFilter::all())
            .unwrap()
            .iter()
            .all(|f| !f.played));

        executor.simulate_week(1).unwrap();
        let played = executor.simulate_week(2).unwrap();
        assert_eq!(played.len(), 2);

        let fixtures = store.list_fixtures(FixtureFilter::all()).unwrap();
        for f in &fixtures {
            assert_eq!(f.played, f.week <= 2, "fixture {} week {}", f.id, f.week);
        }
    }

    #[test]
    fn test_replaying_a_week_is_a_no_op() {
        let store = Arc::new(MemoryStore::new(&ROSTER));
        let executor = executor(store.clone());
        executor.simulate_week(1).unwrap();
        let before = store.list_standings().unwrap();

        assert!(executor.simulate_week(1).unwrap().is_empty());
        assert_eq!(store.list_standings().unwrap(), before);
    }

    #[test]
    fn test_scores_flow_into_standings() {
        let store = Arc::new(MemoryStore::new(&ROSTER));
        let simulator = Arc::new(ScriptedSimulator::new(vec![(3, 1), (2, 2)]));
        executor_with(store.clone(), simulator).simulate_week(1).unwrap();

        // week 1: Chelsea 3-1 Arsenal, Manchester City 2-2 Liverpool
        let chelsea = store.get_standings_row(1).unwrap();
        assert_eq!((chelsea.points, chelsea.goal_difference), (3, 2));
        let arsenal = store.get_standings_row(2).unwrap();
        assert_eq!((arsenal.points, arsenal.losses), (0, 1));
        let city = store.get_standings_row(3).unwrap();
        assert_eq!((city.points, city.draws), (1, 1));
    }

    #[test]
    fn test_simulate_all_remaining_completes_season() {
        let store = Arc::new(MemoryStore::new(&ROSTER));
        let executor = executor(store.clone());
        executor.simulate_week(1).unwrap();

        let played = executor.simulate_all_remaining().unwrap();
        assert_eq!(played.len(), 10);
        let weeks: Vec<u32> = played.iter().map(|f| f.week).collect();
        let mut sorted = weeks.clone();
        sorted.sort();
        assert_eq!(weeks, sorted);

        for row in store.list_standings().unwrap() {
            assert_eq!(row.played, 6);
            assert!(row.is_consistent());
        }
    }

    #[test]
    fn test_failure_keeps_committed_fixtures_and_stops() {
        let inner = MemoryStore::new(&ROSTER);
        // Liverpool plays the second fixture of week 1
        let store = Arc::new(FailingStore { inner, fail_for: 4 });
        let executor = executor_with(store.clone(), Arc::new(ScriptedSimulator::new(vec![])));

        let err = executor.simulate_week(1).unwrap_err();
        assert!(matches!(err, LeagueError::Persistence(_)));

        let fixtures = store.list_fixtures(FixtureFilter::week(1)).unwrap();
        assert!(fixtures[0].played, "first fixture stays committed");
        assert!(!fixtures[1].played, "failed fixture rolled back");

        // Manchester City's half of the failed fixture was rolled back too
        assert_eq!(store.get_standings_row(3).unwrap().played, 0);
        assert_eq!(store.get_standings_row(1).unwrap().played, 1);
        assert_eq!(store.get_standings_row(2).unwrap().played, 1);
    }
}
