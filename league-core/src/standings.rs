//! Standings ledger - cumulative table and its canonical ranking

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::LeagueResult;
use crate::model::{Competitor, CompetitorId, Fixture, StandingsDelta, StandingsRow};
use crate::store::{Repository, Transaction};

/// Canonical league ordering: points, then goal difference, then goals
/// scored, all descending. Competitor id breaks any remaining tie so the
/// order is total.
pub fn compare_rows(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.competitor.id.cmp(&b.competitor.id))
}

/// Sort rows into league order
pub fn rank(rows: &mut [StandingsRow]) {
    rows.sort_by(compare_rows);
}

/// Rebuild a ranked table from played fixtures
pub fn table_from_fixtures(competitors: &[Competitor], fixtures: &[Fixture]) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = competitors.iter().cloned().map(StandingsRow::new).collect();

    for fixture in fixtures {
        let Some((home_score, away_score)) = fixture.score() else {
            continue;
        };
        for (side, own, opponent) in [
            (fixture.home.id, home_score, away_score),
            (fixture.away.id, away_score, home_score),
        ] {
            if let Some(row) = rows.iter_mut().find(|r| r.competitor.id == side) {
                row.apply(&StandingsDelta::for_side(own, opponent));
            }
        }
    }

    rank(&mut rows);
    rows
}

/// Owner of the standings rows
pub struct StandingsLedger {
    store: Arc<dyn Repository>,
}

impl StandingsLedger {
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    /// Add one fixture's result to both sides' rows inside `tx`. Nothing is
    /// visible until the caller commits, so both rows (and whatever else
    /// the caller wrote) land together or not at all.
    pub fn apply_result(
        tx: &mut dyn Transaction,
        home: CompetitorId,
        away: CompetitorId,
        home_score: u32,
        away_score: u32,
    ) -> LeagueResult<()> {
        tx.apply_standings_delta(home, &StandingsDelta::for_side(home_score, away_score))?;
        tx.apply_standings_delta(away, &StandingsDelta::for_side(away_score, home_score))?;
        Ok(())
    }

    /// Current table in league order
    pub fn current_table(&self) -> LeagueResult<Vec<StandingsRow>> {
        let mut rows = self.store.list_standings()?;
        rank(&mut rows);
        Ok(rows)
    }

    /// Zero every row; the competitor set is unchanged
    pub fn reset(&self) -> LeagueResult<()> {
        let mut tx = self.store.begin()?;
        tx.reset_standings()?;
        tx.commit()?;
        tracing::info!("Standings reset");
        Ok(())
    }
}
