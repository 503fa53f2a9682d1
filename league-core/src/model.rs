//! League data model - competitors, fixtures, standings rows, predictions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type CompetitorId = u32;
pub type FixtureId = u32;

/// Points awarded for a win
pub const WIN_POINTS: u32 = 3;
/// Points awarded for a draw
pub const DRAW_POINTS: u32 = 1;

/// A team taking part in the league
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub name: String,
}

impl Competitor {
    pub fn new(id: CompetitorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A scheduled match for a given week, played or not
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    #[serde(rename = "home_team")]
    pub home: Competitor,
    #[serde(rename = "away_team")]
    pub away: Competitor,
    pub week: u32,
    pub played: bool,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Fixture {
    /// Final score, present only once the fixture has been played
    pub fn score(&self) -> Option<(u32, u32)> {
        match (self.played, self.home_score, self.away_score) {
            (true, Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }

    /// Whether the given competitor takes part in this fixture
    pub fn involves(&self, competitor: CompetitorId) -> bool {
        self.home.id == competitor || self.away.id == competitor
    }

    /// Record the final score. Scores and the played flag change together.
    pub(crate) fn record_score(&mut self, home_score: u32, away_score: u32) {
        self.home_score = Some(home_score);
        self.away_score = Some(away_score);
        self.played = true;
    }
}

/// A fixture produced by the generator, before the store assigns an id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewFixture {
    pub home: Competitor,
    pub away: Competitor,
    pub week: u32,
}

impl NewFixture {
    pub fn new(home: &Competitor, away: &Competitor, week: u32) -> Self {
        Self {
            home: home.clone(),
            away: away.clone(),
            week,
        }
    }
}

/// Which fixtures a listing should return
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixtureFilter {
    pub week: Option<u32>,
    pub unplayed_only: bool,
}

impl FixtureFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn week(week: u32) -> Self {
        Self {
            week: Some(week),
            unplayed_only: false,
        }
    }

    pub fn unplayed() -> Self {
        Self {
            week: None,
            unplayed_only: true,
        }
    }

    pub fn unplayed_in_week(week: u32) -> Self {
        Self {
            week: Some(week),
            unplayed_only: true,
        }
    }

    pub fn matches(&self, fixture: &Fixture) -> bool {
        self.week.map_or(true, |w| fixture.week == w) && !(self.unplayed_only && fixture.played)
    }
}

/// Result class of one side of a match
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    pub fn from_scores(own: u32, opponent: u32) -> Self {
        match own.cmp(&opponent) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::Loss,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            Outcome::Win => WIN_POINTS,
            Outcome::Draw => DRAW_POINTS,
            Outcome::Loss => 0,
        }
    }
}

/// Additive change to one standings row caused by a single fixture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StandingsDelta {
    pub points: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl StandingsDelta {
    /// Delta for the side that scored `own` against `opponent`
    pub fn for_side(own: u32, opponent: u32) -> Self {
        let outcome = Outcome::from_scores(own, opponent);
        Self {
            points: outcome.points(),
            wins: u32::from(outcome == Outcome::Win),
            draws: u32::from(outcome == Outcome::Draw),
            losses: u32::from(outcome == Outcome::Loss),
            goals_for: own,
            goals_against: opponent,
        }
    }

    pub fn goal_difference(&self) -> i32 {
        self.goals_for as i32 - self.goals_against as i32
    }
}

/// Cumulative statistics of one competitor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    #[serde(rename = "team")]
    pub competitor: Competitor,
    pub points: u32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
}

impl StandingsRow {
    /// Empty row for the start of a season
    pub fn new(competitor: Competitor) -> Self {
        Self {
            competitor,
            points: 0,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
        }
    }

    pub fn apply(&mut self, delta: &StandingsDelta) {
        self.points += delta.points;
        self.played += 1;
        self.wins += delta.wins;
        self.draws += delta.draws;
        self.losses += delta.losses;
        self.goals_for += delta.goals_for;
        self.goals_against += delta.goals_against;
        self.goal_difference += delta.goal_difference();
    }

    /// Zero every counter, keeping the competitor
    pub fn reset(&mut self) {
        *self = StandingsRow::new(self.competitor.clone());
    }

    /// Check the accumulator invariants
    pub fn is_consistent(&self) -> bool {
        self.played == self.wins + self.draws + self.losses
            && self.goal_difference == self.goals_for as i32 - self.goals_against as i32
            && self.points == WIN_POINTS * self.wins + DRAW_POINTS * self.draws
    }
}

/// Heuristic forecast of a competitor's finish
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "team")]
    pub competitor: Competitor,
    pub predicted_position: u32,
    pub predicted_points: u32,
    pub prediction_percentage: f64,
    pub created_at: DateTime<Utc>,
}
