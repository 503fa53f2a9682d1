//! Season facade
//!
//! Wires the repository, fixture generator, simulator, standings ledger and
//! prediction generator together and is the one type the request layer
//! talks to.
//!
//! Generating the schedule and resetting take the write side of the season
//! gate. Everything else takes the read side, so simulations may overlap
//! each other and the per-fixture transaction settles who plays a fixture.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::{create_rng, SeasonConfig};
use crate::error::{LeagueError, LeagueResult};
use crate::fixtures::{matches_per_competitor, FixtureGenerator};
use crate::model::{Competitor, CompetitorId, Fixture, FixtureFilter, Prediction, StandingsRow};
use crate::predictions::PredictionGenerator;
use crate::rounds::RoundExecutor;
use crate::simulator::{MatchSimulator, RandomSimulator};
use crate::standings::{table_from_fixtures, StandingsLedger};
use crate::store::{MemoryStore, Repository};

/// Outcome of a simulation call
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Fixtures played by this call, in the order they were played
    pub fixtures: Vec<Fixture>,
    /// Fresh prediction set, present when the call reached the
    /// prediction threshold
    pub predictions: Option<Vec<Prediction>>,
}

/// Validate a caller supplied week number
/// Read a week number from text, such as a URL segment
pub fn parse_week(raw: &str) -> LeagueResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| LeagueError::MalformedWeek(raw.to_string()))
}

pub fn checked_week(week: i64) -> LeagueResult<u32> {
    if week < 1 {
        return Err(LeagueError::InvalidWeek(week));
    }
    u32::try_from(week).map_err(|_| LeagueError::InvalidWeek(week))
}

pub struct Season {
    config: SeasonConfig,
    store: Arc<dyn Repository>,
    generator: Arc<FixtureGenerator>,
    rounds: RoundExecutor,
    ledger: StandingsLedger,
    predictor: PredictionGenerator,
    gate: RwLock<()>,
}

impl Season {
    /// Season with the uniform random simulator
    pub fn new(store: Arc<dyn Repository>, config: SeasonConfig) -> LeagueResult<Self> {
        config.validate()?;
        let mut rng = create_rng(config.seed);
        let simulator = Arc::new(RandomSimulator::new(
            config.max_goals,
            ChaCha8Rng::seed_from_u64(rng.gen()),
        ));
        Ok(Self::assemble(store, config, simulator, rng))
    }

    /// Season driven by a caller supplied simulator
    pub fn with_simulator(
        store: Arc<dyn Repository>,
        config: SeasonConfig,
        simulator: Arc<dyn MatchSimulator>,
    ) -> LeagueResult<Self> {
        config.validate()?;
        let rng = create_rng(config.seed);
        Ok(Self::assemble(store, config, simulator, rng))
    }

    /// Volatile season over the named competitors
    pub fn in_memory<S: AsRef<str>>(names: &[S], config: SeasonConfig) -> LeagueResult<Self> {
        Self::new(Arc::new(MemoryStore::new(names)), config)
    }

    fn assemble(
        store: Arc<dyn Repository>,
        config: SeasonConfig,
        simulator: Arc<dyn MatchSimulator>,
        mut rng: ChaCha8Rng,
    ) -> Self {
        let generator = Arc::new(FixtureGenerator::new(
            config.total_weeks,
            ChaCha8Rng::seed_from_u64(rng.gen()),
        ));
        let predictor = PredictionGenerator::new(store.clone(), ChaCha8Rng::seed_from_u64(rng.gen()));
        Self {
            rounds: RoundExecutor::new(store.clone(), simulator, generator.clone()),
            ledger: StandingsLedger::new(store.clone()),
            predictor,
            generator,
            store,
            config,
            gate: RwLock::new(()),
        }
    }

    pub fn config(&self) -> &SeasonConfig {
        &self.config
    }

    fn shared(&self) -> LeagueResult<RwLockReadGuard<'_, ()>> {
        self.gate.read().map_err(|_| LeagueError::poisoned("season gate"))
    }

    fn exclusive(&self) -> LeagueResult<RwLockWriteGuard<'_, ()>> {
        self.gate.write().map_err(|_| LeagueError::poisoned("season gate"))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn competitors(&self) -> LeagueResult<Vec<Competitor>> {
        self.store.list_competitors()
    }

    pub fn competitor(&self, id: CompetitorId) -> LeagueResult<Competitor> {
        self.store.get_competitor(id)
    }

    /// Every scheduled fixture, ordered by (week, id)
    pub fn fixtures(&self) -> LeagueResult<Vec<Fixture>> {
        self.store.list_fixtures(FixtureFilter::all())
    }

    pub fn fixtures_for_week(&self, week: i64) -> LeagueResult<Vec<Fixture>> {
        let week = checked_week(week)?;
        self.store.list_fixtures(FixtureFilter::week(week))
    }

    /// Highest scheduled week, 0 before the schedule exists
    pub fn last_week(&self) -> LeagueResult<u32> {
        Ok(self.fixtures()?.iter().map(|f| f.week).max().unwrap_or(0))
    }

    /// Current table in league order
    pub fn table(&self) -> LeagueResult<Vec<StandingsRow>> {
        self.ledger.current_table()
    }

    /// Table as it stood after `week`, rebuilt from played fixtures
    pub fn table_at_week(&self, week: i64) -> LeagueResult<Vec<StandingsRow>> {
        let week = checked_week(week)?;
        let competitors = self.store.list_competitors()?;
        let fixtures: Vec<Fixture> = self
            .store
            .list_fixtures(FixtureFilter::all())?
            .into_iter()
            .filter(|f| f.played && f.week <= week)
            .collect();
        Ok(table_from_fixtures(&competitors, &fixtures))
    }

    pub fn predictions(&self) -> LeagueResult<Vec<Prediction>> {
        self.store.list_predictions()
    }

    // ------------------------------------------------------------------
    // Season progression
    // ------------------------------------------------------------------

    /// Create the schedule explicitly. Simulation does this on demand.
    pub fn generate_fixtures(&self) -> LeagueResult<Vec<Fixture>> {
        let _exclusive = self.exclusive()?;
        self.generator.schedule(self.store.as_ref())
    }

    pub fn simulate_week(&self, week: i64) -> LeagueResult<SimulationReport> {
        let week = checked_week(week)?;
        self.ensure_schedule()?;
        let _shared = self.shared()?;

        let fixtures = self.rounds.simulate_week(week)?;
        let predictions = self.refresh_predictions(week)?;
        Ok(SimulationReport {
            fixtures,
            predictions,
        })
    }

    /// Play out the season. The prediction threshold is checked against
    /// the last scheduled week, which is where the season now stands.
    pub fn simulate_all_remaining(&self) -> LeagueResult<SimulationReport> {
        self.ensure_schedule()?;
        let _shared = self.shared()?;

        let fixtures = self.rounds.simulate_all_remaining()?;
        let reached = self.last_week()?;
        let predictions = self.refresh_predictions(reached)?;
        Ok(SimulationReport {
            fixtures,
            predictions,
        })
    }

    /// Forecast from the current table regardless of season progress
    pub fn generate_predictions(&self) -> LeagueResult<Vec<Prediction>> {
        let _shared = self.shared()?;
        self.forecast()
    }

    /// Lazy generation is a schedule write, so it takes the exclusive side
    /// before any simulation starts.
    fn ensure_schedule(&self) -> LeagueResult<()> {
        let _exclusive = self.exclusive()?;
        self.generator.ensure_schedule(self.store.as_ref())?;
        Ok(())
    }

    fn refresh_predictions(&self, week: u32) -> LeagueResult<Option<Vec<Prediction>>> {
        if !self.config.predicts_after(week) {
            return Ok(None);
        }
        self.forecast().map(Some)
    }

    fn forecast(&self) -> LeagueResult<Vec<Prediction>> {
        let table = self.ledger.current_table()?;
        self.predictor
            .generate(&table, matches_per_competitor(table.len()))
    }

    // ------------------------------------------------------------------
    // Resets
    // ------------------------------------------------------------------

    /// Zero the standings. Fixtures and their results are left alone.
    pub fn reset_standings(&self) -> LeagueResult<()> {
        let _exclusive = self.exclusive()?;
        self.ledger.reset()
    }

    /// Start the season over: no fixtures, no predictions, zero standings
    pub fn reset_season(&self) -> LeagueResult<()> {
        let _exclusive = self.exclusive()?;

        let mut tx = self.store.begin()?;
        tx.clear_predictions()?;
        tx.clear_fixtures()?;
        tx.reset_standings()?;
        tx.commit()?;

        tracing::info!("Season reset");
        Ok(())
    }
}
