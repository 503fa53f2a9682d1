//! Match simulation

use std::sync::Mutex;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::error::{LeagueError, LeagueResult};
use crate::model::Fixture;

/// Produces the final score of an unplayed fixture
pub trait MatchSimulator: Send + Sync {
    fn simulate(&self, fixture: &Fixture) -> LeagueResult<(u32, u32)>;
}

/// Draws both scores independently and uniformly from `0..=max_goals`.
///
/// The generator is seeded once, when the simulator is built, so calls
/// within a run never replay the same sequence.
pub struct RandomSimulator {
    max_goals: u32,
    rng: Mutex<ChaCha8Rng>,
}

impl RandomSimulator {
    pub fn new(max_goals: u32, rng: ChaCha8Rng) -> Self {
        Self {
            max_goals,
            rng: Mutex::new(rng),
        }
    }
}

impl MatchSimulator for RandomSimulator {
    fn simulate(&self, fixture: &Fixture) -> LeagueResult<(u32, u32)> {
        if fixture.played {
            return Err(LeagueError::FixtureAlreadyPlayed(fixture.id));
        }
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| LeagueError::poisoned("simulator rng"))?;
        let home = rng.gen_range(0..=self.max_goals);
        let away = rng.gen_range(0..=self.max_goals);
        Ok((home, away))
    }
}
