//! SQLite-backed store
//!
//! Tables mirror the league database: `teams`, `matches`, `league_table`
//! and `predictions`. One connection sits behind a mutex; a transaction
//! holds the mutex from `BEGIN IMMEDIATE` until commit or rollback.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Repository, Transaction};
use crate::error::{LeagueError, LeagueResult};
use crate::model::{
    Competitor, CompetitorId, Fixture, FixtureFilter, FixtureId, NewFixture, Prediction,
    StandingsDelta, StandingsRow,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS teams (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS matches (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    home_team_id INTEGER NOT NULL REFERENCES teams(id),
    away_team_id INTEGER NOT NULL REFERENCES teams(id),
    home_score   INTEGER,
    away_score   INTEGER,
    week         INTEGER NOT NULL CHECK (week >= 1),
    played       INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL,
    CHECK ((played = 0 AND home_score IS NULL AND away_score IS NULL)
        OR (played = 1 AND home_score IS NOT NULL AND away_score IS NOT NULL))
);

CREATE TABLE IF NOT EXISTS league_table (
    team_id         INTEGER PRIMARY KEY REFERENCES teams(id),
    points          INTEGER NOT NULL DEFAULT 0,
    played          INTEGER NOT NULL DEFAULT 0,
    wins            INTEGER NOT NULL DEFAULT 0,
    draws           INTEGER NOT NULL DEFAULT 0,
    losses          INTEGER NOT NULL DEFAULT 0,
    goals_for       INTEGER NOT NULL DEFAULT 0,
    goals_against   INTEGER NOT NULL DEFAULT 0,
    goal_difference INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS predictions (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    team_id               INTEGER NOT NULL REFERENCES teams(id),
    predicted_position    INTEGER NOT NULL,
    predicted_points      INTEGER NOT NULL,
    prediction_percentage REAL NOT NULL,
    created_at            TEXT NOT NULL
);
";

const FIXTURE_SELECT: &str = "
SELECT m.id, m.week, m.played, m.home_score, m.away_score, m.created_at,
       ht.id, ht.name, at.id, at.name
FROM matches m
JOIN teams ht ON m.home_team_id = ht.id
JOIN teams at ON m.away_team_id = at.id";

const STANDINGS_SELECT: &str = "
SELECT t.id, t.name, lt.points, lt.played, lt.wins, lt.draws, lt.losses,
       lt.goals_for, lt.goals_against, lt.goal_difference
FROM league_table lt
JOIN teams t ON lt.team_id = t.id";

/// Durable store on a single SQLite connection
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`. `roster` seeds the teams
    /// table the first time only.
    pub fn open<S: AsRef<str>>(path: impl AsRef<Path>, roster: &[S]) -> LeagueResult<Self> {
        Self::init(Connection::open(path)?, roster)
    }

    pub fn open_in_memory<S: AsRef<str>>(roster: &[S]) -> LeagueResult<Self> {
        Self::init(Connection::open_in_memory()?, roster)
    }

    fn init<S: AsRef<str>>(mut conn: Connection, roster: &[S]) -> LeagueResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        seed_roster(&mut conn, roster)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> LeagueResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| LeagueError::poisoned("sqlite connection"))
    }
}

fn seed_roster<S: AsRef<str>>(conn: &mut Connection, roster: &[S]) -> LeagueResult<()> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM teams", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (name, id) in roster.iter().zip(1u32..) {
        tx.execute(
            "INSERT INTO teams (id, name) VALUES (?1, ?2)",
            params![id, name.as_ref()],
        )?;
        tx.execute("INSERT INTO league_table (team_id) VALUES (?1)", params![id])?;
    }
    tx.commit()?;
    tracing::info!(teams = roster.len(), "seeded league roster");
    Ok(())
}

fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn fixture_from_row(row: &Row<'_>) -> rusqlite::Result<Fixture> {
    Ok(Fixture {
        id: row.get(0)?,
        week: row.get(1)?,
        played: row.get(2)?,
        home_score: row.get(3)?,
        away_score: row.get(4)?,
        created_at: parse_timestamp(5, row.get(5)?)?,
        home: Competitor::new(row.get(6)?, row.get::<_, String>(7)?),
        away: Competitor::new(row.get(8)?, row.get::<_, String>(9)?),
    })
}

fn standings_from_row(row: &Row<'_>) -> rusqlite::Result<StandingsRow> {
    Ok(StandingsRow {
        competitor: Competitor::new(row.get(0)?, row.get::<_, String>(1)?),
        points: row.get(2)?,
        played: row.get(3)?,
        wins: row.get(4)?,
        draws: row.get(5)?,
        losses: row.get(6)?,
        goals_for: row.get(7)?,
        goals_against: row.get(8)?,
        goal_difference: row.get(9)?,
    })
}

fn query_fixtures(conn: &Connection, filter: FixtureFilter) -> LeagueResult<Vec<Fixture>> {
    let sql = format!(
        "{FIXTURE_SELECT}
         WHERE (?1 IS NULL OR m.week = ?1) AND (?2 = 0 OR m.played = 0)
         ORDER BY m.week, m.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![filter.week, filter.unplayed_only], fixture_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn query_fixture(conn: &Connection, id: FixtureId) -> LeagueResult<Fixture> {
    let sql = format!("{FIXTURE_SELECT} WHERE m.id = ?1");
    conn.query_row(&sql, params![id], fixture_from_row)
        .optional()?
        .ok_or(LeagueError::FixtureNotFound(id))
}

fn count_fixtures(conn: &Connection) -> LeagueResult<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))?;
    Ok(count as usize)
}

impl Repository for SqliteStore {
    fn list_competitors(&self) -> LeagueResult<Vec<Competitor>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name FROM teams ORDER BY id")?;
        let rows = stmt.query_map([], |row| Ok(Competitor::new(row.get(0)?, row.get::<_, String>(1)?)))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_competitor(&self, id: CompetitorId) -> LeagueResult<Competitor> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name FROM teams WHERE id = ?1",
            params![id],
            |row| Ok(Competitor::new(row.get(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?
        .ok_or(LeagueError::CompetitorNotFound(id))
    }

    fn count_fixtures(&self) -> LeagueResult<usize> {
        count_fixtures(&*self.lock()?)
    }

    fn list_fixtures(&self, filter: FixtureFilter) -> LeagueResult<Vec<Fixture>> {
        query_fixtures(&*self.lock()?, filter)
    }

    fn get_standings_row(&self, competitor: CompetitorId) -> LeagueResult<StandingsRow> {
        let conn = self.lock()?;
        let sql = format!("{STANDINGS_SELECT} WHERE t.id = ?1");
        conn.query_row(&sql, params![competitor], standings_from_row)
            .optional()?
            .ok_or(LeagueError::CompetitorNotFound(competitor))
    }

    fn list_standings(&self) -> LeagueResult<Vec<StandingsRow>> {
        let conn = self.lock()?;
        let sql = format!("{STANDINGS_SELECT} ORDER BY t.id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], standings_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn list_predictions(&self) -> LeagueResult<Vec<Prediction>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, p.predicted_position, p.predicted_points,
                    p.prediction_percentage, p.created_at
             FROM predictions p
             JOIN teams t ON p.team_id = t.id
             ORDER BY p.predicted_position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Prediction {
                competitor: Competitor::new(row.get(0)?, row.get::<_, String>(1)?),
                predicted_position: row.get(2)?,
                predicted_points: row.get(3)?,
                prediction_percentage: row.get(4)?,
                created_at: parse_timestamp(5, row.get(5)?)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn begin(&self) -> LeagueResult<Box<dyn Transaction + '_>> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Box::new(SqliteTransaction {
            conn,
            finished: false,
        }))
    }
}

struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(err) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!("sqlite rollback failed: {}", err);
            }
        }
    }
}

impl Transaction for SqliteTransaction<'_> {
    fn get_fixture(&self, id: FixtureId) -> LeagueResult<Fixture> {
        query_fixture(&self.conn, id)
    }

    fn count_fixtures(&self) -> LeagueResult<usize> {
        count_fixtures(&self.conn)
    }

    fn insert_fixture_batch(&mut self, fixtures: &[NewFixture]) -> LeagueResult<Vec<Fixture>> {
        if count_fixtures(&self.conn)? > 0 {
            return Err(LeagueError::FixturesAlreadyGenerated);
        }

        let created_at = Utc::now().to_rfc3339();
        let mut ids = Vec::with_capacity(fixtures.len());
        {
            let mut stmt = self.conn.prepare(
                "INSERT INTO matches (home_team_id, away_team_id, week, played, created_at)
                 VALUES (?1, ?2, ?3, 0, ?4)",
            )?;
            for new in fixtures {
                stmt.execute(params![new.home.id, new.away.id, new.week, created_at])?;
                ids.push(self.conn.last_insert_rowid() as FixtureId);
            }
        }

        ids.into_iter()
            .map(|id| query_fixture(&self.conn, id))
            .collect()
    }

    fn update_fixture_result(
        &mut self,
        id: FixtureId,
        home_score: u32,
        away_score: u32,
    ) -> LeagueResult<Fixture> {
        if query_fixture(&self.conn, id)?.played {
            return Err(LeagueError::FixtureAlreadyPlayed(id));
        }
        self.conn.execute(
            "UPDATE matches SET home_score = ?1, away_score = ?2, played = 1 WHERE id = ?3",
            params![home_score, away_score, id],
        )?;
        query_fixture(&self.conn, id)
    }

    fn apply_standings_delta(
        &mut self,
        competitor: CompetitorId,
        delta: &StandingsDelta,
    ) -> LeagueResult<()> {
        let changed = self.conn.execute(
            "UPDATE league_table SET
                points = points + ?1,
                played = played + 1,
                wins = wins + ?2,
                draws = draws + ?3,
                losses = losses + ?4,
                goals_for = goals_for + ?5,
                goals_against = goals_against + ?6,
                goal_difference = goal_difference + ?7
             WHERE team_id = ?8",
            params![
                delta.points,
                delta.wins,
                delta.draws,
                delta.losses,
                delta.goals_for,
                delta.goals_against,
                delta.goal_difference(),
                competitor,
            ],
        )?;
        if changed == 0 {
            return Err(LeagueError::CompetitorNotFound(competitor));
        }
        Ok(())
    }

    fn reset_standings(&mut self) -> LeagueResult<()> {
        self.conn.execute(
            "UPDATE league_table SET
                points = 0, played = 0, wins = 0, draws = 0, losses = 0,
                goals_for = 0, goals_against = 0, goal_difference = 0",
            [],
        )?;
        Ok(())
    }

    fn clear_fixtures(&mut self) -> LeagueResult<()> {
        self.conn.execute("DELETE FROM matches", [])?;
        Ok(())
    }

    fn replace_predictions(&mut self, predictions: &[Prediction]) -> LeagueResult<()> {
        self.conn.execute("DELETE FROM predictions", [])?;
        let mut stmt = self.conn.prepare(
            "INSERT INTO predictions
                (team_id, predicted_position, predicted_points, prediction_percentage, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for prediction in predictions {
            stmt.execute(params![
                prediction.competitor.id,
                prediction.predicted_position,
                prediction.predicted_points,
                prediction.prediction_percentage,
                prediction.created_at.to_rfc3339(),
            ])?;
        }
        Ok(())
    }

    fn clear_predictions(&mut self) -> LeagueResult<()> {
        self.conn.execute("DELETE FROM predictions", [])?;
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> LeagueResult<()> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }
}
