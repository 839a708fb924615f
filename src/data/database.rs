//! SQLite storage for teams, players, matches and goals
//!
//! Rows are never removed: deletion sets `deleted_at`, and every read
//! filters on it so callers only see live records.

use crate::data::store::EntityStore;
use crate::data::validation::{
    validate_match, NewMatch, NewPlayer, NewTeam, DATE_FORMAT, TIME_FORMAT,
};
use crate::{
    Entity, FootballError, GoalDetail, GoalEntry, GoalId, Match, MatchId, MatchStatus, Player,
    PlayerId, Position, Result, Score, Side, Team, TeamId, TeamRef,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const TEAM_COLUMNS: &str =
    "id, name, founded_year, home_address, home_city, logo_url, created_at, updated_at";

const PLAYER_SELECT: &str = "
    SELECT p.id, p.team_id, t.name, p.name, p.height, p.weight, p.position,
           p.jersey_number, p.created_at, p.updated_at
    FROM players p
    JOIN teams t ON t.id = p.team_id";

const MATCH_SELECT: &str = "
    SELECT m.id, m.match_date, m.match_time, m.status, m.home_score, m.away_score,
           m.created_at, m.updated_at,
           ht.id, ht.name, ht.home_city, ht.logo_url,
           at.id, at.name, at.home_city, at.logo_url
    FROM matches m
    JOIN teams ht ON ht.id = m.home_team_id
    JOIN teams at ON at.id = m.away_team_id";

const GOAL_SELECT: &str = "
    SELECT g.id, g.match_id, g.player_id, p.name, t.id, t.name, g.goal_time, g.created_at
    FROM goals g
    JOIN players p ON p.id = g.player_id
    JOIN teams t ON t.id = p.team_id";

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// How long to wait on a database locked by another writer
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        self.conn.busy_timeout(timeout)?;
        Ok(())
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS teams (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                founded_year INTEGER NOT NULL,
                home_address TEXT NOT NULL DEFAULT '',
                home_city TEXT NOT NULL,
                logo_url TEXT,
                deleted_at TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                team_id INTEGER NOT NULL REFERENCES teams(id),
                name TEXT NOT NULL,
                height REAL NOT NULL,
                weight REAL NOT NULL,
                position TEXT NOT NULL,
                jersey_number INTEGER NOT NULL,
                deleted_at TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS matches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                match_date TEXT NOT NULL,
                match_time TEXT NOT NULL,
                home_team_id INTEGER NOT NULL REFERENCES teams(id),
                away_team_id INTEGER NOT NULL REFERENCES teams(id),
                home_score INTEGER CHECK (home_score >= 0),
                away_score INTEGER CHECK (away_score >= 0),
                status TEXT NOT NULL DEFAULT 'Scheduled'
                    CHECK (status IN ('Scheduled', 'Completed', 'Cancelled')),
                deleted_at TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                CHECK (home_team_id <> away_team_id),
                CHECK (
                    (status = 'Completed' AND home_score IS NOT NULL AND away_score IS NOT NULL)
                    OR (status <> 'Completed' AND home_score IS NULL AND away_score IS NULL)
                )
            );

            CREATE TABLE IF NOT EXISTS goals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                match_id INTEGER NOT NULL REFERENCES matches(id),
                player_id INTEGER NOT NULL REFERENCES players(id),
                goal_time TEXT NOT NULL,
                deleted_at TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_teams_live_name
                ON teams(LOWER(name)) WHERE deleted_at IS NULL;
            CREATE UNIQUE INDEX IF NOT EXISTS idx_players_live_jersey
                ON players(team_id, jersey_number) WHERE deleted_at IS NULL;
            CREATE INDEX IF NOT EXISTS idx_matches_teams ON matches(home_team_id, away_team_id);
            CREATE INDEX IF NOT EXISTS idx_goals_match ON goals(match_id) WHERE deleted_at IS NULL;
            CREATE INDEX IF NOT EXISTS idx_goals_player ON goals(player_id) WHERE deleted_at IS NULL;
            "#,
        )?;
        Ok(())
    }

    /// Begin a write transaction that takes the database write lock up front
    fn immediate(&self) -> Result<Transaction<'_>> {
        Ok(Transaction::new_unchecked(
            &self.conn,
            TransactionBehavior::Immediate,
        )?)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    // ==================== Team Operations ====================

    /// Create a team; the name must be unique among live teams
    pub fn create_team(&self, team: &NewTeam) -> Result<Team> {
        let tx = self.immediate()?;
        ensure_team_name_free(&tx, &team.name, None)?;

        tx.execute(
            "INSERT INTO teams (name, founded_year, home_address, home_city, logo_url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                team.name.trim(),
                team.founded_year,
                team.home_address,
                team.home_city,
                team.logo_url,
            ],
        )
        .map_err(|e| unique_conflict(e, || team_name_taken(&team.name)))?;

        let id = TeamId(tx.last_insert_rowid());
        tx.commit()?;
        log::info!("Created team {} ({})", team.name, id);
        self.get_team(id)
    }

    /// Replace a live team's fields, keeping its name unique
    pub fn update_team(&self, id: TeamId, team: &NewTeam) -> Result<Team> {
        let tx = self.immediate()?;
        self.get_team(id)?;
        ensure_team_name_free(&tx, &team.name, Some(id))?;

        tx.execute(
            "UPDATE teams
             SET name = ?1, founded_year = ?2, home_address = ?3, home_city = ?4,
                 logo_url = ?5, updated_at = datetime('now')
             WHERE id = ?6 AND deleted_at IS NULL",
            params![
                team.name.trim(),
                team.founded_year,
                team.home_address,
                team.home_city,
                team.logo_url,
                id.0,
            ],
        )
        .map_err(|e| unique_conflict(e, || team_name_taken(&team.name)))?;

        tx.commit()?;
        log::info!("Updated team {} ({})", team.name, id);
        self.get_team(id)
    }

    /// Get team by ID
    pub fn get_team(&self, id: TeamId) -> Result<Team> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM teams WHERE id = ?1 AND deleted_at IS NULL",
                    TEAM_COLUMNS
                ),
                params![id.0],
                Self::row_to_team,
            )
            .optional()?
            .ok_or_else(|| FootballError::not_found(Entity::Team, id.0))
    }

    /// Get all live teams
    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM teams WHERE deleted_at IS NULL ORDER BY name",
            TEAM_COLUMNS
        ))?;

        let teams = stmt
            .query_map([], Self::row_to_team)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(teams)
    }

    pub fn delete_team(&self, id: TeamId) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE teams SET deleted_at = datetime('now') WHERE id = ?1 AND deleted_at IS NULL",
            params![id.0],
        )?;
        if updated == 0 {
            return Err(FootballError::not_found(Entity::Team, id.0));
        }
        log::info!("Deleted team {}", id);
        Ok(())
    }

    fn row_to_team(row: &Row) -> rusqlite::Result<Team> {
        Ok(Team {
            id: TeamId(row.get(0)?),
            name: row.get(1)?,
            founded_year: row.get(2)?,
            home_address: row.get(3)?,
            home_city: row.get(4)?,
            logo_url: row.get(5)?,
            created_at: timestamp_at(row, 6)?,
            updated_at: timestamp_at(row, 7)?,
        })
    }

    // ==================== Player Operations ====================

    /// Register a player; the jersey number must be free within the team
    pub fn create_player(&self, player: &NewPlayer) -> Result<Player> {
        let tx = self.immediate()?;
        self.get_team(player.team_id)?;
        ensure_jersey_free(&tx, player.team_id, player.jersey_number, None)?;

        tx.execute(
            "INSERT INTO players (team_id, name, height, weight, position, jersey_number)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                player.team_id.0,
                player.name.trim(),
                player.height,
                player.weight,
                player.position.as_str(),
                player.jersey_number,
            ],
        )
        .map_err(|e| unique_conflict(e, || jersey_taken(player.team_id, player.jersey_number)))?;

        let id = PlayerId(tx.last_insert_rowid());
        tx.commit()?;
        log::info!("Registered player {} ({}) with team {}", player.name, id, player.team_id);
        self.get_player(id)
    }

    /// Replace a live player's fields.
    ///
    /// A player with live goals stays with their team, since those goals
    /// must keep belonging to one of the two sides of their match.
    pub fn update_player(&self, id: PlayerId, player: &NewPlayer) -> Result<Player> {
        let tx = self.immediate()?;
        let current = self.get_player(id)?;

        if player.team_id != current.team_id {
            self.get_team(player.team_id)?;
            let goals: i64 = tx.query_row(
                "SELECT COUNT(*) FROM goals WHERE player_id = ?1 AND deleted_at IS NULL",
                params![id.0],
                |row| row.get(0),
            )?;
            if goals > 0 {
                return Err(FootballError::InvalidState(format!(
                    "player {} has {} recorded goals for team {} and cannot change team",
                    id, goals, current.team_id
                )));
            }
        }
        ensure_jersey_free(&tx, player.team_id, player.jersey_number, Some(id))?;

        tx.execute(
            "UPDATE players
             SET team_id = ?1, name = ?2, height = ?3, weight = ?4, position = ?5,
                 jersey_number = ?6, updated_at = datetime('now')
             WHERE id = ?7 AND deleted_at IS NULL",
            params![
                player.team_id.0,
                player.name.trim(),
                player.height,
                player.weight,
                player.position.as_str(),
                player.jersey_number,
                id.0,
            ],
        )
        .map_err(|e| unique_conflict(e, || jersey_taken(player.team_id, player.jersey_number)))?;

        tx.commit()?;
        log::info!("Updated player {} ({})", player.name, id);
        self.get_player(id)
    }

    /// Get player by ID
    pub fn get_player(&self, id: PlayerId) -> Result<Player> {
        self.conn
            .query_row(
                &format!("{} WHERE p.id = ?1 AND p.deleted_at IS NULL", PLAYER_SELECT),
                params![id.0],
                |row| Self::row_to_player(row, 0),
            )
            .optional()?
            .ok_or_else(|| FootballError::not_found(Entity::Player, id.0))
    }

    /// Get live players, optionally only those of one team
    pub fn list_players(&self, team: Option<TeamId>) -> Result<Vec<Player>> {
        let players = match team {
            Some(team_id) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} WHERE p.team_id = ?1 AND p.deleted_at IS NULL ORDER BY p.jersey_number",
                    PLAYER_SELECT
                ))?;
                let rows = stmt
                    .query_map(params![team_id.0], |row| Self::row_to_player(row, 0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} WHERE p.deleted_at IS NULL ORDER BY t.name, p.jersey_number",
                    PLAYER_SELECT
                ))?;
                let rows = stmt
                    .query_map([], |row| Self::row_to_player(row, 0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(players)
    }

    pub fn delete_player(&self, id: PlayerId) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE players SET deleted_at = datetime('now') WHERE id = ?1 AND deleted_at IS NULL",
            params![id.0],
        )?;
        if updated == 0 {
            return Err(FootballError::not_found(Entity::Player, id.0));
        }
        log::info!("Deleted player {}", id);
        Ok(())
    }

    fn row_to_player(row: &Row, offset: usize) -> rusqlite::Result<Player> {
        let position: String = row.get(offset + 6)?;
        let position = position
            .parse::<Position>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(offset + 6, Type::Text, Box::new(e)))?;

        Ok(Player {
            id: PlayerId(row.get(offset)?),
            team_id: TeamId(row.get(offset + 1)?),
            team_name: row.get(offset + 2)?,
            name: row.get(offset + 3)?,
            height: row.get(offset + 4)?,
            weight: row.get(offset + 5)?,
            position,
            jersey_number: row.get(offset + 7)?,
            created_at: timestamp_at(row, offset + 8)?,
            updated_at: timestamp_at(row, offset + 9)?,
        })
    }

    // ==================== Match Operations ====================

    /// Schedule a match; both teams must be live
    pub fn create_match(&self, fixture: &NewMatch) -> Result<Match> {
        validate_match(fixture)?;
        self.get_team(fixture.home_team_id)?;
        self.get_team(fixture.away_team_id)?;

        self.conn.execute(
            "INSERT INTO matches (match_date, match_time, home_team_id, away_team_id, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                fixture.date.format(DATE_FORMAT).to_string(),
                fixture.time.format(TIME_FORMAT).to_string(),
                fixture.home_team_id.0,
                fixture.away_team_id.0,
                MatchStatus::Scheduled.as_str(),
            ],
        )?;

        let id = MatchId(self.conn.last_insert_rowid());
        log::info!(
            "Scheduled match {}: {} vs {} on {}",
            id,
            fixture.home_team_id,
            fixture.away_team_id,
            fixture.date
        );
        self.get_match(id)
    }

    /// Reschedule a live match.
    ///
    /// The teams of a completed match are fixed; move it back to Scheduled
    /// first, which withdraws its result.
    pub fn update_match(&self, id: MatchId, fixture: &NewMatch) -> Result<Match> {
        validate_match(fixture)?;

        let tx = self.immediate()?;
        let current = self.get_match(id)?;
        let teams_changed = current.home.id != fixture.home_team_id
            || current.away.id != fixture.away_team_id;
        if teams_changed {
            if current.is_completed() {
                return Err(FootballError::InvalidState(format!(
                    "match {} is completed, its teams cannot change",
                    id
                )));
            }
            self.get_team(fixture.home_team_id)?;
            self.get_team(fixture.away_team_id)?;
        }

        tx.execute(
            "UPDATE matches
             SET match_date = ?1, match_time = ?2, home_team_id = ?3, away_team_id = ?4,
                 updated_at = datetime('now')
             WHERE id = ?5 AND deleted_at IS NULL",
            params![
                fixture.date.format(DATE_FORMAT).to_string(),
                fixture.time.format(TIME_FORMAT).to_string(),
                fixture.home_team_id.0,
                fixture.away_team_id.0,
                id.0,
            ],
        )?;

        tx.commit()?;
        log::info!(
            "Rescheduled match {}: {} vs {} on {}",
            id,
            fixture.home_team_id,
            fixture.away_team_id,
            fixture.date
        );
        self.get_match(id)
    }

    /// Get match by ID
    pub fn get_match(&self, id: MatchId) -> Result<Match> {
        self.conn
            .query_row(
                &format!("{} WHERE m.id = ?1 AND m.deleted_at IS NULL", MATCH_SELECT),
                params![id.0],
                Self::row_to_match,
            )
            .optional()?
            .ok_or_else(|| FootballError::not_found(Entity::Match, id.0))
    }

    /// Get all live matches, most recent first
    pub fn list_matches(&self) -> Result<Vec<Match>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE m.deleted_at IS NULL ORDER BY m.match_date DESC, m.match_time DESC, m.id DESC",
            MATCH_SELECT
        ))?;

        let matches = stmt
            .query_map([], Self::row_to_match)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(matches)
    }

    /// Move a match to Scheduled or Cancelled.
    ///
    /// Leaving Completed clears the score and tombstones the live goals in
    /// the same transaction. Completion only happens through a submitted
    /// result.
    pub fn set_match_status(&self, id: MatchId, status: MatchStatus) -> Result<Match> {
        if status == MatchStatus::Completed {
            return Err(FootballError::InvalidState(
                "a match is completed by submitting its result".to_string(),
            ));
        }

        let tx = self.immediate()?;
        let updated = tx.execute(
            "UPDATE matches
             SET status = ?1, home_score = NULL, away_score = NULL, updated_at = datetime('now')
             WHERE id = ?2 AND deleted_at IS NULL",
            params![status.as_str(), id.0],
        )?;
        if updated == 0 {
            return Err(FootballError::not_found(Entity::Match, id.0));
        }
        let withdrawn = tx.execute(
            "UPDATE goals SET deleted_at = datetime('now') WHERE match_id = ?1 AND deleted_at IS NULL",
            params![id.0],
        )?;
        tx.commit()?;

        log::info!("Match {} set to {} ({} goals withdrawn)", id, status, withdrawn);
        self.get_match(id)
    }

    /// Tombstone a match together with its live goals
    pub fn delete_match(&self, id: MatchId) -> Result<()> {
        let tx = self.immediate()?;
        let updated = tx.execute(
            "UPDATE matches SET deleted_at = datetime('now') WHERE id = ?1 AND deleted_at IS NULL",
            params![id.0],
        )?;
        if updated == 0 {
            return Err(FootballError::not_found(Entity::Match, id.0));
        }
        tx.execute(
            "UPDATE goals SET deleted_at = datetime('now') WHERE match_id = ?1 AND deleted_at IS NULL",
            params![id.0],
        )?;
        tx.commit()?;

        log::info!("Deleted match {}", id);
        Ok(())
    }

    fn row_to_match(row: &Row) -> rusqlite::Result<Match> {
        let date: String = row.get(1)?;
        let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
        let time: String = row.get(2)?;
        let time = NaiveTime::parse_from_str(&time, TIME_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
        let status: String = row.get(3)?;
        let status = status
            .parse::<MatchStatus>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        let home_score: Option<u32> = row.get(4)?;
        let away_score: Option<u32> = row.get(5)?;
        let score = match (status, home_score, away_score) {
            (MatchStatus::Completed, Some(home), Some(away)) => Some(Score::new(home, away)),
            _ => None,
        };

        Ok(Match {
            id: MatchId(row.get(0)?),
            date,
            time,
            home: TeamRef {
                id: TeamId(row.get(8)?),
                name: row.get(9)?,
                home_city: row.get(10)?,
                logo_url: row.get(11)?,
            },
            away: TeamRef {
                id: TeamId(row.get(12)?),
                name: row.get(13)?,
                home_city: row.get(14)?,
                logo_url: row.get(15)?,
            },
            status,
            score,
            created_at: timestamp_at(row, 6)?,
            updated_at: timestamp_at(row, 7)?,
        })
    }

    // ==================== Goal Operations ====================

    fn row_to_goal(row: &Row) -> rusqlite::Result<GoalDetail> {
        Ok(GoalDetail {
            id: GoalId(row.get(0)?),
            match_id: MatchId(row.get(1)?),
            player_id: PlayerId(row.get(2)?),
            player_name: row.get(3)?,
            team_id: TeamId(row.get(4)?),
            team_name: row.get(5)?,
            goal_time: row.get(6)?,
            created_at: timestamp_at(row, 7)?,
        })
    }

    pub fn get_goal(&self, id: GoalId) -> Result<GoalDetail> {
        self.conn
            .query_row(
                &format!("{} WHERE g.id = ?1 AND g.deleted_at IS NULL", GOAL_SELECT),
                params![id.0],
                Self::row_to_goal,
            )
            .optional()?
            .ok_or_else(|| FootballError::not_found(Entity::Goal, id.0))
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE deleted_at IS NULL", table),
                [],
                |row| row.get(0),
            )?;
            Ok(n as usize)
        };

        let completed: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM matches WHERE status = 'Completed' AND deleted_at IS NULL",
            [],
            |row| row.get(0),
        )?;

        let min_date: Option<String> = self.conn.query_row(
            "SELECT MIN(match_date) FROM matches WHERE deleted_at IS NULL",
            [],
            |row| row.get(0),
        )?;

        let max_date: Option<String> = self.conn.query_row(
            "SELECT MAX(match_date) FROM matches WHERE deleted_at IS NULL",
            [],
            |row| row.get(0),
        )?;

        Ok(DatabaseStats {
            team_count: count("teams")?,
            player_count: count("players")?,
            match_count: count("matches")?,
            completed_match_count: completed as usize,
            goal_count: count("goals")?,
            earliest_match: min_date.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
            latest_match: max_date.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()),
        })
    }
}

impl EntityStore for Database {
    fn find_team(&self, id: TeamId) -> Result<Team> {
        self.get_team(id)
    }

    fn find_player(&self, id: PlayerId) -> Result<Player> {
        self.get_player(id)
    }

    fn find_match(&self, id: MatchId) -> Result<Match> {
        self.get_match(id)
    }

    fn replace_match_goals(
        &self,
        match_id: MatchId,
        goals: &[GoalEntry],
        home_score: u32,
        away_score: u32,
    ) -> Result<()> {
        // Dropping the transaction on any early return rolls everything back
        let tx = self.immediate()?;

        let updated = tx.execute(
            "UPDATE matches
             SET home_score = ?1, away_score = ?2, status = 'Completed', updated_at = datetime('now')
             WHERE id = ?3 AND deleted_at IS NULL",
            params![home_score, away_score, match_id.0],
        )?;
        if updated == 0 {
            return Err(FootballError::not_found(Entity::Match, match_id.0));
        }

        tx.execute(
            "UPDATE goals SET deleted_at = datetime('now') WHERE match_id = ?1 AND deleted_at IS NULL",
            params![match_id.0],
        )?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO goals (match_id, player_id, goal_time) VALUES (?1, ?2, ?3)",
            )?;
            for goal in goals {
                insert.execute(params![match_id.0, goal.player_id.0, goal.goal_time])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn append_goal(&self, match_id: MatchId, goal: &GoalEntry, side: Side) -> Result<GoalId> {
        let column = match side {
            Side::Home => "home_score",
            Side::Away => "away_score",
        };

        let tx = self.immediate()?;
        let updated = tx.execute(
            &format!(
                "UPDATE matches SET {col} = {col} + 1, updated_at = datetime('now')
                 WHERE id = ?1 AND deleted_at IS NULL AND status = 'Completed'",
                col = column
            ),
            params![match_id.0],
        )?;
        if updated == 0 {
            let status: Option<String> = tx
                .query_row(
                    "SELECT status FROM matches WHERE id = ?1 AND deleted_at IS NULL",
                    params![match_id.0],
                    |row| row.get(0),
                )
                .optional()?;
            return Err(match status {
                None => FootballError::not_found(Entity::Match, match_id.0),
                Some(status) => FootballError::InvalidState(format!(
                    "goals can only be added to a completed match, match {} is {}",
                    match_id, status
                )),
            });
        }

        tx.execute(
            "INSERT INTO goals (match_id, player_id, goal_time) VALUES (?1, ?2, ?3)",
            params![match_id.0, goal.player_id.0, goal.goal_time],
        )?;
        let id = GoalId(tx.last_insert_rowid());

        tx.commit()?;
        Ok(id)
    }

    fn remove_goal(&self, goal_id: GoalId) -> Result<()> {
        let tx = self.immediate()?;

        let located: Option<(i64, i64, String, i64, i64)> = tx
            .query_row(
                "SELECT g.match_id, p.team_id, m.status, m.home_team_id, m.away_team_id
                 FROM goals g
                 JOIN players p ON p.id = g.player_id
                 JOIN matches m ON m.id = g.match_id
                 WHERE g.id = ?1 AND g.deleted_at IS NULL",
                params![goal_id.0],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .optional()?;
        let Some((match_id, team_id, status, home_team_id, away_team_id)) = located else {
            return Err(FootballError::not_found(Entity::Goal, goal_id.0));
        };

        tx.execute(
            "UPDATE goals SET deleted_at = datetime('now') WHERE id = ?1",
            params![goal_id.0],
        )?;

        if status == MatchStatus::Completed.as_str() {
            let column = if team_id == home_team_id {
                Some("home_score")
            } else if team_id == away_team_id {
                Some("away_score")
            } else {
                None
            };
            if let Some(col) = column {
                tx.execute(
                    &format!(
                        "UPDATE matches SET {col} = MAX({col} - 1, 0), updated_at = datetime('now')
                         WHERE id = ?1",
                        col = col
                    ),
                    params![match_id],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    // goal_time compares as text, so "5:00" sorts after "45:00"
    fn list_live_goals_for_match(&self, match_id: MatchId) -> Result<Vec<GoalDetail>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE g.match_id = ?1 AND g.deleted_at IS NULL ORDER BY g.goal_time ASC, g.id ASC",
            GOAL_SELECT
        ))?;

        let goals = stmt
            .query_map(params![match_id.0], Self::row_to_goal)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(goals)
    }

    fn list_completed_matches_for_team(&self, team_id: TeamId) -> Result<Vec<Match>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE (m.home_team_id = ?1 OR m.away_team_id = ?1)
                 AND m.status = 'Completed'
                 AND m.deleted_at IS NULL
             ORDER BY m.id",
            MATCH_SELECT
        ))?;

        let matches = stmt
            .query_map(params![team_id.0], Self::row_to_match)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(matches)
    }

    fn count_live_goals_for_player(&self, player_id: PlayerId) -> Result<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM goals WHERE player_id = ?1 AND deleted_at IS NULL",
            params![player_id.0],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn rank_players_by_goals(&self, limit: usize) -> Result<Vec<(Player, u32)>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.team_id, t.name, p.name, p.height, p.weight, p.position,
                    p.jersey_number, p.created_at, p.updated_at, COUNT(g.id) AS total_goals
             FROM players p
             JOIN teams t ON t.id = p.team_id
             JOIN goals g ON g.player_id = p.id AND g.deleted_at IS NULL
             WHERE p.deleted_at IS NULL
             GROUP BY p.id
             ORDER BY total_goals DESC, p.id ASC
             LIMIT ?1",
        )?;

        let ranked = stmt
            .query_map(params![limit], |row| {
                Ok((Self::row_to_player(row, 0)?, row.get::<_, u32>(10)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ranked)
    }
}

fn ensure_team_name_free(conn: &Connection, name: &str, except: Option<TeamId>) -> Result<()> {
    let taken: i64 = conn.query_row(
        "SELECT COUNT(*) FROM teams
         WHERE LOWER(name) = LOWER(?1) AND deleted_at IS NULL AND id <> ?2",
        params![name.trim(), except.map_or(0, |id| id.0)],
        |row| row.get(0),
    )?;
    if taken > 0 {
        return Err(team_name_taken(name));
    }
    Ok(())
}

fn ensure_jersey_free(
    conn: &Connection,
    team_id: TeamId,
    jersey_number: u8,
    except: Option<PlayerId>,
) -> Result<()> {
    let taken: i64 = conn.query_row(
        "SELECT COUNT(*) FROM players
         WHERE team_id = ?1 AND jersey_number = ?2 AND deleted_at IS NULL AND id <> ?3",
        params![team_id.0, jersey_number, except.map_or(0, |id| id.0)],
        |row| row.get(0),
    )?;
    if taken > 0 {
        return Err(jersey_taken(team_id, jersey_number));
    }
    Ok(())
}

fn team_name_taken(name: &str) -> FootballError {
    FootballError::Conflict(format!("A team named '{}' already exists", name.trim()))
}

fn jersey_taken(team_id: TeamId, jersey_number: u8) -> FootballError {
    FootballError::Conflict(format!(
        "Jersey number {} is already taken in team {}",
        jersey_number, team_id
    ))
}

/// A live-uniqueness index firing means another writer got there first
fn unique_conflict(
    err: rusqlite::Error,
    conflict: impl FnOnce() -> FootballError,
) -> FootballError {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            conflict()
        }
        other => FootballError::Database(other),
    }
}

fn timestamp_at(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    pub team_count: usize,
    pub player_count: usize,
    pub match_count: usize,
    pub completed_match_count: usize,
    pub goal_count: usize,
    pub earliest_match: Option<NaiveDate>,
    pub latest_match: Option<NaiveDate>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn new_team(name: &str) -> NewTeam {
        NewTeam {
            name: name.to_string(),
            founded_year: 1950,
            home_address: format!("{} Stadium", name),
            home_city: format!("{} City", name),
            logo_url: None,
        }
    }

    pub(crate) fn new_player(team_id: TeamId, name: &str, jersey_number: u8) -> NewPlayer {
        NewPlayer {
            team_id,
            name: name.to_string(),
            height: 180.0,
            weight: 75.0,
            position: Position::Forward,
            jersey_number,
        }
    }

    pub(crate) fn new_match(home: TeamId, away: TeamId) -> NewMatch {
        NewMatch::parse("2024-03-01", "19:30:00", home, away).unwrap()
    }

    #[test]
    fn test_create_database() {
        let db = Database::in_memory().unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.team_count, 0);
        assert_eq!(stats.match_count, 0);
        assert!(stats.earliest_match.is_none());
    }

    #[test]
    fn test_create_team() {
        let db = Database::in_memory().unwrap();
        let team = db.create_team(&new_team("Persib")).unwrap();
        assert_eq!(team.name, "Persib");
        assert_eq!(db.get_team(team.id).unwrap().home_city, "Persib City");

        // Live names are unique, ignoring case
        let err = db.create_team(&new_team("persib")).unwrap_err();
        assert!(matches!(err, FootballError::Conflict(_)));
    }

    #[test]
    fn test_deleted_team_name_can_be_reused() {
        let db = Database::in_memory().unwrap();
        let team = db.create_team(&new_team("Arema")).unwrap();
        db.delete_team(team.id).unwrap();

        assert!(matches!(
            db.get_team(team.id),
            Err(FootballError::NotFound { entity: Entity::Team, .. })
        ));
        let again = db.create_team(&new_team("Arema")).unwrap();
        assert_ne!(again.id, team.id);
        assert_eq!(db.list_teams().unwrap().len(), 1);
    }

    #[test]
    fn test_jersey_unique_within_team() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        let b = db.create_team(&new_team("B")).unwrap();

        let first = db.create_player(&new_player(a.id, "One", 10)).unwrap();
        assert_eq!(first.team_name, "A");
        assert!(matches!(
            db.create_player(&new_player(a.id, "Two", 10)),
            Err(FootballError::Conflict(_))
        ));
        // Same number in another team is fine
        db.create_player(&new_player(b.id, "Three", 10)).unwrap();

        // Freed once the holder is deleted
        db.delete_player(first.id).unwrap();
        db.create_player(&new_player(a.id, "Four", 10)).unwrap();
        assert_eq!(db.list_players(Some(a.id)).unwrap().len(), 1);
        assert_eq!(db.list_players(None).unwrap().len(), 2);
    }

    #[test]
    fn test_player_for_missing_team() {
        let db = Database::in_memory().unwrap();
        let err = db.create_player(&new_player(TeamId(42), "Ghost", 1)).unwrap_err();
        assert!(matches!(err, FootballError::NotFound { entity: Entity::Team, id: 42 }));
    }

    #[test]
    fn test_create_match_starts_scheduled() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        let b = db.create_team(&new_team("B")).unwrap();

        let fixture = db.create_match(&new_match(a.id, b.id)).unwrap();
        assert_eq!(fixture.status, MatchStatus::Scheduled);
        assert!(fixture.score.is_none());
        assert_eq!(fixture.home.name, "A");
        assert_eq!(fixture.away.name, "B");
        assert_eq!(fixture.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.match_count, 1);
        assert_eq!(stats.completed_match_count, 0);
    }

    #[test]
    fn test_schema_rejects_same_team_and_partial_score() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        let b = db.create_team(&new_team("B")).unwrap();

        let same = db.connection().execute(
            "INSERT INTO matches (match_date, match_time, home_team_id, away_team_id)
             VALUES ('2024-01-01', '15:00:00', ?1, ?1)",
            params![a.id.0],
        );
        assert!(same.is_err());

        let scored_but_scheduled = db.connection().execute(
            "INSERT INTO matches (match_date, match_time, home_team_id, away_team_id, home_score, away_score)
             VALUES ('2024-01-01', '15:00:00', ?1, ?2, 1, 0)",
            params![a.id.0, b.id.0],
        );
        assert!(scored_but_scheduled.is_err());
    }

    #[test]
    fn test_replace_match_goals_is_all_or_nothing() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        let b = db.create_team(&new_team("B")).unwrap();
        let pa = db.create_player(&new_player(a.id, "PA", 9)).unwrap();
        let fixture = db.create_match(&new_match(a.id, b.id)).unwrap();

        db.replace_match_goals(fixture.id, &[GoalEntry::new(pa.id, "12:00")], 1, 0)
            .unwrap();

        db.connection()
            .execute_batch(
                "CREATE TRIGGER reject_goal BEFORE INSERT ON goals
                 WHEN NEW.goal_time = 'boom'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let goals = [GoalEntry::new(pa.id, "10:00"), GoalEntry::new(pa.id, "boom")];
        let err = db.replace_match_goals(fixture.id, &goals, 2, 0).unwrap_err();
        assert!(matches!(err, FootballError::Database(_)));

        let after = db.get_match(fixture.id).unwrap();
        assert_eq!(after.score, Some(Score::new(1, 0)));
        let live = db.list_live_goals_for_match(fixture.id).unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].goal_time, "12:00");
    }

    #[test]
    fn test_set_status_clears_score_and_goals() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        let b = db.create_team(&new_team("B")).unwrap();
        let pa = db.create_player(&new_player(a.id, "PA", 9)).unwrap();
        let fixture = db.create_match(&new_match(a.id, b.id)).unwrap();
        db.replace_match_goals(fixture.id, &[GoalEntry::new(pa.id, "30:00")], 1, 0)
            .unwrap();

        assert!(matches!(
            db.set_match_status(fixture.id, MatchStatus::Completed),
            Err(FootballError::InvalidState(_))
        ));

        let cancelled = db.set_match_status(fixture.id, MatchStatus::Cancelled).unwrap();
        assert_eq!(cancelled.status, MatchStatus::Cancelled);
        assert!(cancelled.score.is_none());
        assert!(db.list_live_goals_for_match(fixture.id).unwrap().is_empty());
        assert_eq!(db.count_live_goals_for_player(pa.id).unwrap(), 0);
    }

    #[test]
    fn test_delete_match_tombstones_goals() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        let b = db.create_team(&new_team("B")).unwrap();
        let pa = db.create_player(&new_player(a.id, "PA", 9)).unwrap();
        let fixture = db.create_match(&new_match(a.id, b.id)).unwrap();
        db.replace_match_goals(fixture.id, &[GoalEntry::new(pa.id, "30:00")], 1, 0)
            .unwrap();

        db.delete_match(fixture.id).unwrap();
        assert!(db.get_match(fixture.id).is_err());
        assert_eq!(db.count_live_goals_for_player(pa.id).unwrap(), 0);
        assert!(db.list_completed_matches_for_team(a.id).unwrap().is_empty());
        assert!(matches!(
            db.delete_match(fixture.id),
            Err(FootballError::NotFound { .. })
        ));
    }

    #[test]
    fn test_goal_timeline_ordering() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        let b = db.create_team(&new_team("B")).unwrap();
        let pa = db.create_player(&new_player(a.id, "PA", 9)).unwrap();
        let pb = db.create_player(&new_player(b.id, "PB", 7)).unwrap();
        let fixture = db.create_match(&new_match(a.id, b.id)).unwrap();

        let goals = [
            GoalEntry::new(pb.id, "60:00"),
            GoalEntry::new(pa.id, "10:00"),
            GoalEntry::new(pb.id, "10:00"),
        ];
        db.replace_match_goals(fixture.id, &goals, 1, 2).unwrap();

        let timeline = db.list_live_goals_for_match(fixture.id).unwrap();
        let order: Vec<(&str, &str)> = timeline
            .iter()
            .map(|g| (g.goal_time.as_str(), g.player_name.as_str()))
            .collect();
        assert_eq!(order, vec![("10:00", "PA"), ("10:00", "PB"), ("60:00", "PB")]);
        assert_eq!(timeline[0].team_name, "A");
    }

    #[test]
    fn test_append_and_remove_goal_keep_score_in_step() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        let b = db.create_team(&new_team("B")).unwrap();
        let pb = db.create_player(&new_player(b.id, "PB", 7)).unwrap();
        let fixture = db.create_match(&new_match(a.id, b.id)).unwrap();

        let err = db
            .append_goal(fixture.id, &GoalEntry::new(pb.id, "5:00"), Side::Away)
            .unwrap_err();
        assert!(matches!(err, FootballError::InvalidState(_)));
        assert!(db.list_live_goals_for_match(fixture.id).unwrap().is_empty());

        db.replace_match_goals(fixture.id, &[], 0, 0).unwrap();
        let goal = db
            .append_goal(fixture.id, &GoalEntry::new(pb.id, "88:00"), Side::Away)
            .unwrap();
        assert_eq!(db.get_match(fixture.id).unwrap().score, Some(Score::new(0, 1)));
        assert_eq!(db.get_goal(goal).unwrap().player_name, "PB");

        db.remove_goal(goal).unwrap();
        assert_eq!(db.get_match(fixture.id).unwrap().score, Some(Score::new(0, 0)));
        assert!(matches!(
            db.remove_goal(goal),
            Err(FootballError::NotFound { entity: Entity::Goal, .. })
        ));
    }

    #[test]
    fn test_rank_players_by_goals() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        let b = db.create_team(&new_team("B")).unwrap();
        let p1 = db.create_player(&new_player(a.id, "P1", 9)).unwrap();
        let p2 = db.create_player(&new_player(b.id, "P2", 7)).unwrap();
        let p3 = db.create_player(&new_player(b.id, "P3", 8)).unwrap();
        let fixture = db.create_match(&new_match(a.id, b.id)).unwrap();

        let goals = [
            GoalEntry::new(p2.id, "1:00"),
            GoalEntry::new(p1.id, "2:00"),
            GoalEntry::new(p2.id, "3:00"),
            GoalEntry::new(p1.id, "4:00"),
        ];
        db.replace_match_goals(fixture.id, &goals, 2, 2).unwrap();

        let ranked = db.rank_players_by_goals(10).unwrap();
        let ids: Vec<(PlayerId, u32)> = ranked.iter().map(|(p, n)| (p.id, *n)).collect();
        assert_eq!(ids, vec![(p1.id, 2), (p2.id, 2)]);
        assert!(!ids.iter().any(|(id, _)| *id == p3.id));

        assert_eq!(db.rank_players_by_goals(1).unwrap().len(), 1);
    }

    #[test]
    fn test_create_match_rejects_same_team() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();

        let err = db.create_match(&new_match(a.id, a.id)).unwrap_err();
        assert!(matches!(err, FootballError::Validation(_)));
        assert_eq!(err.kind().category(), "bad_input");
        assert_eq!(db.get_stats().unwrap().match_count, 0);
    }

    #[test]
    fn test_unique_index_violation_is_a_conflict() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("Bali United")).unwrap();
        db.create_player(&new_player(a.id, "Spasojevic", 9)).unwrap();

        // Another writer that skipped the pre-check still hits the live index
        let err = db
            .connection()
            .execute(
                "INSERT INTO teams (name, founded_year, home_city) VALUES ('bali united', 2015, 'Gianyar')",
                [],
            )
            .unwrap_err();
        let mapped = unique_conflict(err, || team_name_taken("bali united"));
        assert!(matches!(mapped, FootballError::Conflict(_)));

        let err = db
            .connection()
            .execute(
                "INSERT INTO players (team_id, name, height, weight, position, jersey_number)
                 VALUES (?1, 'Other', 180, 75, 'Forward', 9)",
                params![a.id.0],
            )
            .unwrap_err();
        let mapped = unique_conflict(err, || jersey_taken(a.id, 9));
        assert!(matches!(mapped, FootballError::Conflict(_)));

        // Other constraint failures are still storage errors
        let err = db
            .connection()
            .execute(
                "INSERT INTO matches (match_date, match_time, home_team_id, away_team_id)
                 VALUES ('2024-01-01', '15:00:00', ?1, ?1)",
                params![a.id.0],
            )
            .unwrap_err();
        let mapped = unique_conflict(err, || team_name_taken("unused"));
        assert!(matches!(mapped, FootballError::Database(_)));
    }

    #[test]
    fn test_update_team() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        db.create_team(&new_team("B")).unwrap();

        let mut edit = new_team("b");
        assert!(matches!(db.update_team(a.id, &edit), Err(FootballError::Conflict(_))));

        // Keeping its own name, in any case, is fine
        edit.name = "a".to_string();
        edit.home_city = "Bandung".to_string();
        let updated = db.update_team(a.id, &edit).unwrap();
        assert_eq!(updated.name, "a");
        assert_eq!(updated.home_city, "Bandung");

        db.delete_team(a.id).unwrap();
        assert!(matches!(
            db.update_team(a.id, &edit),
            Err(FootballError::NotFound { entity: Entity::Team, .. })
        ));
    }

    #[test]
    fn test_update_player() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        let b = db.create_team(&new_team("B")).unwrap();
        let c = db.create_team(&new_team("C")).unwrap();
        let scorer = db.create_player(&new_player(a.id, "Scorer", 9)).unwrap();
        let bench = db.create_player(&new_player(a.id, "Bench", 12)).unwrap();
        db.create_player(&new_player(c.id, "Keeper", 1)).unwrap();

        // Jersey stays unique within the team
        assert!(matches!(
            db.update_player(bench.id, &new_player(a.id, "Bench", 9)),
            Err(FootballError::Conflict(_))
        ));
        assert!(matches!(
            db.update_player(bench.id, &new_player(c.id, "Bench", 1)),
            Err(FootballError::Conflict(_))
        ));

        // No goals yet, so a transfer is allowed
        let moved = db.update_player(bench.id, &new_player(b.id, "Bench", 12)).unwrap();
        assert_eq!(moved.team_id, b.id);
        assert_eq!(moved.team_name, "B");

        let fixture = db.create_match(&new_match(a.id, b.id)).unwrap();
        db.replace_match_goals(fixture.id, &[GoalEntry::new(scorer.id, "20:00")], 1, 0)
            .unwrap();

        let err = db
            .update_player(scorer.id, &new_player(c.id, "Scorer", 9))
            .unwrap_err();
        assert!(matches!(err, FootballError::InvalidState(_)));
        assert_eq!(db.get_player(scorer.id).unwrap().team_id, a.id);

        // Other fields of a scorer can still change
        let renamed = db
            .update_player(scorer.id, &new_player(a.id, "Top Scorer", 10))
            .unwrap();
        assert_eq!(renamed.name, "Top Scorer");
        assert_eq!(renamed.jersey_number, 10);
    }

    #[test]
    fn test_update_match() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        let b = db.create_team(&new_team("B")).unwrap();
        let c = db.create_team(&new_team("C")).unwrap();
        let pa = db.create_player(&new_player(a.id, "PA", 9)).unwrap();
        let fixture = db.create_match(&new_match(a.id, b.id)).unwrap();

        assert!(matches!(
            db.update_match(fixture.id, &new_match(c.id, c.id)),
            Err(FootballError::Validation(_))
        ));
        assert!(matches!(
            db.update_match(fixture.id, &new_match(a.id, TeamId(404))),
            Err(FootballError::NotFound { entity: Entity::Team, .. })
        ));

        let moved = db.update_match(fixture.id, &new_match(a.id, c.id)).unwrap();
        assert_eq!(moved.away.name, "C");
        assert_eq!(moved.status, MatchStatus::Scheduled);

        db.replace_match_goals(fixture.id, &[GoalEntry::new(pa.id, "20:00")], 1, 0)
            .unwrap();
        let err = db
            .update_match(fixture.id, &new_match(a.id, b.id))
            .unwrap_err();
        assert!(matches!(err, FootballError::InvalidState(_)));

        // A completed match can still move in time
        let later = NewMatch::parse("2024-04-01", "20:00:00", a.id, c.id).unwrap();
        let rescheduled = db.update_match(fixture.id, &later).unwrap();
        assert_eq!(rescheduled.date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(rescheduled.score, Some(Score::new(1, 0)));
    }

    #[test]
    fn test_goal_times_sort_as_text() {
        let db = Database::in_memory().unwrap();
        let a = db.create_team(&new_team("A")).unwrap();
        let b = db.create_team(&new_team("B")).unwrap();
        let pa = db.create_player(&new_player(a.id, "PA", 9)).unwrap();
        let fixture = db.create_match(&new_match(a.id, b.id)).unwrap();

        let goals = [
            GoalEntry::new(pa.id, "5:00"),
            GoalEntry::new(pa.id, "45:00"),
            GoalEntry::new(pa.id, "05:30"),
        ];
        db.replace_match_goals(fixture.id, &goals, 3, 0).unwrap();

        let times: Vec<String> = db
            .list_live_goals_for_match(fixture.id)
            .unwrap()
            .into_iter()
            .map(|g| g.goal_time)
            .collect();
        assert_eq!(times, vec!["05:30", "45:00", "5:00"]);
    }
}
