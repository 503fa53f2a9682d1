//! Championship predictions
//!
//! A deliberately rough heuristic, not a statistical model. Predicted
//! position is the current rank, predicted points assume every remaining
//! match is won, and the title percentage comes from rank bands:
//!
//! | rank | percentage |
//! |------|------------|
//! | 1st  | 40..50     |
//! | 2nd  | 25..35     |
//! | 3rd  | 10..20     |
//! | rest | share of what is left of 100 |
//!
//! Everyone from fourth place down splits the remainder evenly; with four
//! teams the last team simply takes it. A remainder below zero is floored
//! at 0.1 per team.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::error::{LeagueError, LeagueResult};
use crate::model::{Prediction, StandingsRow, WIN_POINTS};
use crate::store::Repository;

/// Percentage bands `(low, width)` for the top three ranks
const RANK_BANDS: [(f64, f64); 3] = [(40.0, 10.0), (25.0, 10.0), (10.0, 10.0)];
/// Floor applied when the top three already exceed 100
const MIN_PERCENTAGE: f64 = 0.1;

/// Title percentages for `teams` ranked competitors
pub fn assign_percentages<R: Rng + ?Sized>(teams: usize, rng: &mut R) -> Vec<f64> {
    let mut percentages: Vec<f64> = RANK_BANDS
        .iter()
        .take(teams)
        .map(|&(low, width)| low + rng.gen::<f64>() * width)
        .collect();

    if teams > RANK_BANDS.len() {
        let rest = teams - RANK_BANDS.len();
        let share = (100.0 - percentages.iter().sum::<f64>()) / rest as f64;
        let share = if share < 0.0 { MIN_PERCENTAGE } else { share };
        percentages.extend(std::iter::repeat(share).take(rest));
    }

    percentages
}

/// Owner of the prediction set
pub struct PredictionGenerator {
    store: Arc<dyn Repository>,
    rng: Mutex<ChaCha8Rng>,
}

impl PredictionGenerator {
    pub fn new(store: Arc<dyn Repository>, rng: ChaCha8Rng) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
        }
    }

    /// Build one prediction per row of `standings`, which must already be
    /// in league order
    pub fn forecast(
        &self,
        standings: &[StandingsRow],
        total_season_matches: u32,
    ) -> LeagueResult<Vec<Prediction>> {
        let percentages = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| LeagueError::poisoned("prediction rng"))?;
            assign_percentages(standings.len(), &mut *rng)
        };

        let created_at = Utc::now();
        Ok(standings
            .iter()
            .zip(percentages)
            .enumerate()
            .map(|(rank, (row, percentage))| {
                let remaining = total_season_matches.saturating_sub(row.played);
                Prediction {
                    competitor: row.competitor.clone(),
                    predicted_position: rank as u32 + 1,
                    predicted_points: row.points + WIN_POINTS * remaining,
                    prediction_percentage: percentage,
                    created_at,
                }
            })
            .collect())
    }

    /// Forecast and replace the stored prediction set in one transaction
    pub fn generate(
        &self,
        standings: &[StandingsRow],
        total_season_matches: u32,
    ) -> LeagueResult<Vec<Prediction>> {
        let predictions = self.forecast(standings, total_season_matches)?;

        let mut tx = self.store.begin()?;
        tx.replace_predictions(&predictions)?;
        tx.commit()?;

        tracing::info!("Generated {} championship predictions", predictions.len());
        Ok(predictions)
    }
}
