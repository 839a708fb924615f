//! Football competition records
//!
//! Teams, players, matches and goals kept in SQLite, with atomic result
//! reconciliation and statistics derived from the completed-match history.

pub mod data;
pub mod league;
pub mod output;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use data::validation::Vocabulary;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a team
    TeamId
);
entity_id!(
    /// Unique identifier for a player
    PlayerId
);
entity_id!(
    /// Unique identifier for a match
    MatchId
);
entity_id!(
    /// Unique identifier for a goal
    GoalId
);

/// Kind of stored entity, used when reporting missing records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entity {
    Team,
    Player,
    Match,
    Goal,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Team => write!(f, "Team"),
            Entity::Player => write!(f, "Player"),
            Entity::Match => write!(f, "Match"),
            Entity::Goal => write!(f, "Goal"),
        }
    }
}

/// Playing position of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    Forward,
    Midfielder,
    Defender,
    Goalkeeper,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Forward,
        Position::Midfielder,
        Position::Defender,
        Position::Goalkeeper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Forward => "Forward",
            Position::Midfielder => "Midfielder",
            Position::Defender => "Defender",
            Position::Goalkeeper => "Goalkeeper",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = FootballError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "forward" | "fw" => Ok(Position::Forward),
            "midfielder" | "mf" => Ok(Position::Midfielder),
            "defender" | "df" => Ok(Position::Defender),
            "goalkeeper" | "gk" => Ok(Position::Goalkeeper),
            _ => Err(FootballError::Validation(format!(
                "Unknown position: {}. Use Forward, Midfielder, Defender or Goalkeeper",
                s
            ))),
        }
    }
}

/// Lifecycle state of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 3] = [
        MatchStatus::Scheduled,
        MatchStatus::Completed,
        MatchStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "Scheduled",
            MatchStatus::Completed => "Completed",
            MatchStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = FootballError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "completed" => Ok(MatchStatus::Completed),
            "cancelled" | "canceled" => Ok(MatchStatus::Cancelled),
            _ => Err(FootballError::Validation(format!(
                "Unknown match status: {}. Use Scheduled, Completed or Cancelled",
                s
            ))),
        }
    }
}

/// Which slot a team occupies in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

/// Classification of a completed match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    #[serde(rename = "Home-Win")]
    HomeWin,
    #[serde(rename = "Away-Win")]
    AwayWin,
    Draw,
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::HomeWin => write!(f, "Home-Win"),
            MatchOutcome::AwayWin => write!(f, "Away-Win"),
            MatchOutcome::Draw => write!(f, "Draw"),
        }
    }
}

/// Final score of a completed match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Score { home, away }
    }

    pub fn outcome(&self) -> MatchOutcome {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => MatchOutcome::HomeWin,
            std::cmp::Ordering::Less => MatchOutcome::AwayWin,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        }
    }

    pub fn for_side(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.home, self.away)
    }
}

/// A football team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub founded_year: i32,
    pub home_address: String,
    pub home_city: String,
    pub logo_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Team identity as resolved alongside a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: TeamId,
    pub name: String,
    pub home_city: String,
    pub logo_url: Option<String>,
}

/// A player registered with a team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub team_id: TeamId,
    pub team_name: String,
    pub name: String,
    pub height: f64,
    pub weight: f64,
    pub position: Position,
    pub jersey_number: u8,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A match between two teams, with resolved team names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub home: TeamRef,
    pub away: TeamRef,
    pub status: MatchStatus,
    /// Present if and only if the match is completed
    pub score: Option<Score>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Match {
    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Which side the given team occupies, if it played in this match
    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        if team == self.home.id {
            Some(Side::Home)
        } else if team == self.away.id {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// Result classification, only for completed matches
    pub fn outcome(&self) -> Option<MatchOutcome> {
        if !self.is_completed() {
            return None;
        }
        self.score.map(|s| s.outcome())
    }

    /// Returns the winning team, or None for a draw or an unfinished match
    pub fn winner(&self) -> Option<TeamId> {
        match self.outcome()? {
            MatchOutcome::HomeWin => Some(self.home.id),
            MatchOutcome::AwayWin => Some(self.away.id),
            MatchOutcome::Draw => None,
        }
    }

    /// Check if the given team won this match
    pub fn did_win(&self, team: TeamId) -> Option<bool> {
        self.side_of(team)?;
        self.outcome()?;
        Some(self.winner() == Some(team))
    }

    /// Goals scored by a specific team
    pub fn score_for(&self, team: TeamId) -> Option<u32> {
        let side = self.side_of(team)?;
        self.score.map(|s| s.for_side(side))
    }

    /// Goals conceded by a specific team
    pub fn score_against(&self, team: TeamId) -> Option<u32> {
        let side = self.side_of(team)?;
        let other = match side {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        };
        self.score.map(|s| s.for_side(other))
    }
}

/// One goal in a submitted result: who scored and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalEntry {
    pub player_id: PlayerId,
    /// Free-form token such as "45:00" or "90+2"
    pub goal_time: String,
}

impl GoalEntry {
    pub fn new(player_id: PlayerId, goal_time: impl Into<String>) -> Self {
        GoalEntry {
            player_id,
            goal_time: goal_time.into(),
        }
    }
}

impl FromStr for GoalEntry {
    type Err = FootballError;

    /// Parses `PLAYER@TIME`, e.g. `7@45:00`
    fn from_str(s: &str) -> Result<Self> {
        let (player, time) = s.split_once('@').ok_or_else(|| {
            FootballError::Parse(format!("Expected PLAYER@TIME, got: {}", s))
        })?;
        let player_id = player
            .trim()
            .parse::<i64>()
            .map_err(|e| FootballError::Parse(format!("Invalid player id '{}': {}", player, e)))?;
        Ok(GoalEntry::new(PlayerId(player_id), time.trim()))
    }
}

/// A live goal with its scorer resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalDetail {
    pub id: GoalId,
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_id: TeamId,
    pub team_name: String,
    pub goal_time: String,
    pub created_at: NaiveDateTime,
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum FootballError {
    #[error("{entity} not found with ID: {id}")]
    NotFound { entity: Entity, id: i64 },

    #[error("Player {player_name} ({player_id}) does not play for either team in match {match_id}")]
    InvalidGoal {
        player_id: PlayerId,
        player_name: String,
        match_id: MatchId,
    },

    #[error("Goals do not match the score: {0}")]
    ScoreMismatch(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl FootballError {
    pub fn not_found(entity: Entity, id: i64) -> Self {
        FootballError::NotFound { entity, id }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FootballError::NotFound { .. } => ErrorKind::NotFound,
            FootballError::InvalidGoal { .. } => ErrorKind::InvalidGoal,
            FootballError::ScoreMismatch(_) => ErrorKind::ScoreMismatch,
            FootballError::InvalidState(_) => ErrorKind::InvalidState,
            FootballError::Validation(_) | FootballError::Parse(_) => ErrorKind::InvalidInput,
            FootballError::Conflict(_) => ErrorKind::Conflict,
            FootballError::Database(_) => ErrorKind::Storage,
            FootballError::Config(_) | FootballError::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Stable error classification exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidGoal,
    ScoreMismatch,
    InvalidState,
    InvalidInput,
    Conflict,
    Storage,
    Internal,
}

impl ErrorKind {
    /// Coarse grouping: bad input, not found, or internal failure
    pub fn category(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidGoal
            | ErrorKind::ScoreMismatch
            | ErrorKind::InvalidState
            | ErrorKind::InvalidInput
            | ErrorKind::Conflict => "bad_input",
            ErrorKind::Storage | ErrorKind::Internal => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, FootballError>;

/// Application configuration loaded from football.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub store: StoreConfig,
    pub reports: ReportsConfig,
    pub vocabulary: Vocabulary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How long a connection waits on a locked database before failing
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    pub default_top_scorers: usize,
    pub max_top_scorers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                database_path: "data/football.db".to_string(),
            },
            store: StoreConfig {
                busy_timeout_ms: 5_000,
            },
            reports: ReportsConfig {
                default_top_scorers: 10,
                max_top_scorers: 100,
            },
            vocabulary: Vocabulary::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FootballError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| FootballError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FootballError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_outcome() {
        assert_eq!(Score::new(2, 1).outcome(), MatchOutcome::HomeWin);
        assert_eq!(Score::new(0, 3).outcome(), MatchOutcome::AwayWin);
        assert_eq!(Score::new(1, 1).outcome(), MatchOutcome::Draw);
        assert_eq!(MatchOutcome::HomeWin.to_string(), "Home-Win");
    }

    #[test]
    fn test_goal_entry_parse() {
        let entry: GoalEntry = "7@45:00".parse().unwrap();
        assert_eq!(entry.player_id, PlayerId(7));
        assert_eq!(entry.goal_time, "45:00");

        assert!("7-45:00".parse::<GoalEntry>().is_err());
        assert!("x@45:00".parse::<GoalEntry>().is_err());

        let err = "7-45:00".parse::<GoalEntry>().unwrap_err();
        assert!(matches!(err, FootballError::Parse(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            FootballError::not_found(Entity::Match, 3).kind().category(),
            "not_found"
        );
        let mismatch = FootballError::ScoreMismatch("claimed 1 - 0, goals give 0 - 1".into());
        assert_eq!(mismatch.kind(), ErrorKind::ScoreMismatch);
        assert_eq!(mismatch.kind().category(), "bad_input");
        let storage = FootballError::Database(rusqlite::Error::InvalidQuery);
        assert_eq!(storage.kind().category(), "internal");
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.reports.max_top_scorers, 100);
        assert_eq!(parsed.vocabulary.positions.len(), Position::ALL.len());
    }

    #[test]
    fn test_position_parse() {
        assert_eq!("gk".parse::<Position>().unwrap(), Position::Goalkeeper);
        assert_eq!("Midfielder".parse::<Position>().unwrap(), Position::Midfielder);
        assert!("striker".parse::<Position>().is_err());
    }
}
