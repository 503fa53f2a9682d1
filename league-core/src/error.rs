//! Error taxonomy for the league engine

use crate::model::{CompetitorId, FixtureId};

/// Broad class of a failure, used by callers to decide how to report it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; nothing was mutated
    Validation,
    /// The season is not in a state that allows the operation
    Precondition,
    /// Unknown competitor or fixture
    NotFound,
    /// Storage failed; the in-flight unit was rolled back
    Persistence,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Precondition => "precondition",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Persistence => "persistence",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LeagueError {
    #[error("invalid week number {0}: weeks start at 1")]
    InvalidWeek(i64),

    #[error("invalid week number {0:?}: expected a whole number")]
    MalformedWeek(String),

    #[error("not enough competitors to generate fixtures: need at least 2, got {0}")]
    InsufficientCompetitors(usize),

    #[error("cannot simulate week {week}: {unplayed} fixture(s) from previous weeks must be simulated first")]
    PriorWeeksIncomplete { week: u32, unplayed: usize },

    #[error("fixtures have already been generated for this season")]
    FixturesAlreadyGenerated,

    #[error("fixture {0} has already been played")]
    FixtureAlreadyPlayed(FixtureId),

    #[error("competitor {0} not found")]
    CompetitorNotFound(CompetitorId),

    #[error("fixture {0} not found")]
    FixtureNotFound(FixtureId),

    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl LeagueError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LeagueError::InvalidWeek(_)
            | LeagueError::MalformedWeek(_)
            | LeagueError::InsufficientCompetitors(_) => ErrorKind::Validation,
            LeagueError::PriorWeeksIncomplete { .. }
            | LeagueError::FixturesAlreadyGenerated
            | LeagueError::FixtureAlreadyPlayed(_) => ErrorKind::Precondition,
            LeagueError::CompetitorNotFound(_) | LeagueError::FixtureNotFound(_) => {
                ErrorKind::NotFound
            }
            LeagueError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// Build a persistence error for a poisoned lock
    pub(crate) fn poisoned(what: &str) -> Self {
        LeagueError::Persistence(format!("{what} lock poisoned"))
    }
}

impl From<rusqlite::Error> for LeagueError {
    fn from(err: rusqlite::Error) -> Self {
        LeagueError::Persistence(err.to_string())
    }
}

pub type LeagueResult<T> = Result<T, LeagueError>;
