//! Season configuration

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{LeagueError, LeagueResult};

/// Weeks in the reference season (double round-robin of four teams)
pub const DEFAULT_TOTAL_WEEKS: u32 = 6;
/// Highest score a simulated side can reach
pub const DEFAULT_MAX_GOALS: u32 = 5;

/// Tunables for one simulated season
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeasonConfig {
    /// Weeks the fallback scheduler spreads fixtures over. The four-team
    /// schedule always spans six weeks.
    pub total_weeks: u32,
    /// First week whose simulation refreshes the predictions
    pub prediction_start_week: u32,
    /// Scores are drawn uniformly from `0..=max_goals`
    pub max_goals: u32,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            total_weeks: DEFAULT_TOTAL_WEEKS,
            prediction_start_week: halfway_week(DEFAULT_TOTAL_WEEKS),
            max_goals: DEFAULT_MAX_GOALS,
            seed: None,
        }
    }
}

impl SeasonConfig {
    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Change the schedule length, moving the prediction threshold to the
    /// new halfway point
    pub fn with_total_weeks(mut self, total_weeks: u32) -> Self {
        self.total_weeks = total_weeks;
        self.prediction_start_week = halfway_week(total_weeks);
        self
    }

    pub fn with_prediction_start_week(mut self, week: u32) -> Self {
        self.prediction_start_week = week;
        self
    }

    pub fn validate(&self) -> LeagueResult<()> {
        if self.total_weeks == 0 {
            return Err(LeagueError::InvalidWeek(0));
        }
        if self.prediction_start_week == 0 {
            return Err(LeagueError::InvalidWeek(0));
        }
        Ok(())
    }

    /// Whether reaching `week` should regenerate predictions
    pub fn predicts_after(&self, week: u32) -> bool {
        week >= self.prediction_start_week
    }
}

/// First week of the second half of a season
fn halfway_week(total_weeks: u32) -> u32 {
    total_weeks / 2 + 1
}

/// Create RNG from seed or random
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
