//! Fixture generation - the week-indexed double round-robin
//!
//! Four competitors get a hand-balanced schedule: three weeks where every
//! pair meets once, then three weeks of return fixtures with home and away
//! swapped. Any other count falls back to shuffling every ordered pairing
//! across the configured number of weeks. The fallback does not guarantee
//! that a team plays exactly once per week.

use std::sync::Mutex;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::error::{LeagueError, LeagueResult};
use crate::model::{Competitor, Fixture, NewFixture};
use crate::store::Repository;

/// Week-by-week pairings for four teams, as indices into the roster
const FOUR_TEAM_SCHEDULE: [(usize, usize, u32); 12] = [
    (0, 1, 1),
    (2, 3, 1),
    (0, 2, 2),
    (1, 3, 2),
    (0, 3, 3),
    (1, 2, 3),
    // return fixtures
    (1, 0, 4),
    (3, 2, 4),
    (2, 0, 5),
    (3, 1, 5),
    (3, 0, 6),
    (2, 1, 6),
];

/// Matches each competitor plays in a season: everyone twice
pub fn matches_per_competitor(competitors: usize) -> u32 {
    2 * competitors.saturating_sub(1) as u32
}

/// Builds and stores a season's schedule
pub struct FixtureGenerator {
    total_weeks: u32,
    rng: Mutex<ChaCha8Rng>,
}

impl FixtureGenerator {
    pub fn new(total_weeks: u32, rng: ChaCha8Rng) -> Self {
        Self {
            total_weeks,
            rng: Mutex::new(rng),
        }
    }

    /// Produce the schedule for `competitors`, in the supplied order
    pub fn generate(&self, competitors: &[Competitor]) -> LeagueResult<Vec<NewFixture>> {
        if competitors.len() < 2 {
            return Err(LeagueError::InsufficientCompetitors(competitors.len()));
        }

        if competitors.len() == 4 {
            return Ok(four_team_schedule(competitors));
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| LeagueError::poisoned("fixture generator rng"))?;
        Ok(shuffled_schedule(competitors, self.total_weeks, &mut *rng))
    }

    /// Generate the schedule for the stored roster and insert it as one
    /// batch. Fails with `FixturesAlreadyGenerated` if a schedule exists.
    pub fn schedule(&self, store: &dyn Repository) -> LeagueResult<Vec<Fixture>> {
        let competitors = store.list_competitors()?;
        let new_fixtures = self.generate(&competitors)?;

        let mut tx = store.begin()?;
        let fixtures = tx.insert_fixture_batch(&new_fixtures)?;
        tx.commit()?;

        tracing::info!(
            "Generated {} fixtures for {} competitors",
            fixtures.len(),
            competitors.len()
        );
        Ok(fixtures)
    }

    /// Generate the schedule only if none exists yet. Returns whether this
    /// call created it.
    pub fn ensure_schedule(&self, store: &dyn Repository) -> LeagueResult<bool> {
        if store.count_fixtures()? > 0 {
            return Ok(false);
        }
        match self.schedule(store) {
            Ok(_) => Ok(true),
            // another caller won the race
            Err(LeagueError::FixturesAlreadyGenerated) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

fn four_team_schedule(teams: &[Competitor]) -> Vec<NewFixture> {
    FOUR_TEAM_SCHEDULE
        .iter()
        .map(|&(home, away, week)| NewFixture::new(&teams[home], &teams[away], week))
        .collect()
}

fn shuffled_schedule<R: Rng + ?Sized>(
    teams: &[Competitor],
    total_weeks: u32,
    rng: &mut R,
) -> Vec<NewFixture> {
    let mut pairings: Vec<(usize, usize)> = Vec::new();
    for i in 0..teams.len() {
        for j in 0..teams.len() {
            if i != j {
                pairings.push((i, j));
            }
        }
    }
    pairings.shuffle(rng);

    let total_weeks = total_weeks.max(1) as usize;
    pairings
        .into_iter()
        .enumerate()
        .map(|(i, (home, away))| {
            let week = (i % total_weeks) as u32 + 1;
            NewFixture::new(&teams[home], &teams[away], week)
        })
        .collect()
}
