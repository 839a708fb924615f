//! Input validation for new records
//!
//! Allowed positions and statuses come from an explicit [`Vocabulary`]
//! passed in by the caller, normally the one loaded with the config.

use crate::{FootballError, Match, MatchStatus, Player, Position, Result, Team, TeamId};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

const MIN_FOUNDED_YEAR: i32 = 1800;

/// Allowed enumerated values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub positions: Vec<Position>,
    pub statuses: Vec<MatchStatus>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary {
            positions: Position::ALL.to_vec(),
            statuses: MatchStatus::ALL.to_vec(),
        }
    }
}

impl Vocabulary {
    pub fn check_position(&self, position: Position) -> Result<Position> {
        if self.positions.contains(&position) {
            Ok(position)
        } else {
            Err(FootballError::Validation(format!(
                "Position {} is not allowed. Choose from: {}",
                position,
                join(&self.positions)
            )))
        }
    }

    pub fn check_status(&self, status: MatchStatus) -> Result<MatchStatus> {
        if self.statuses.contains(&status) {
            Ok(status)
        } else {
            Err(FootballError::Validation(format!(
                "Status {} is not allowed. Choose from: {}",
                status,
                join(&self.statuses)
            )))
        }
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fields for a new team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub founded_year: i32,
    pub home_address: String,
    pub home_city: String,
    pub logo_url: Option<String>,
}

/// Fields for a new player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlayer {
    pub team_id: TeamId,
    pub name: String,
    pub height: f64,
    pub weight: f64,
    pub position: Position,
    pub jersey_number: u8,
}

/// Fields for a new match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMatch {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
}

impl NewMatch {
    /// Build from the textual date and time formats used at the edges
    pub fn parse(date: &str, time: &str, home: TeamId, away: TeamId) -> Result<Self> {
        Ok(NewMatch {
            date: parse_date(date)?,
            time: parse_time(time)?,
            home_team_id: home,
            away_team_id: away,
        })
    }
}

pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
        FootballError::Validation(format!("Invalid date '{}', use YYYY-MM-DD", date))
    })
}

/// Accepts `HH:MM:SS`, or `HH:MM` with zero seconds
pub fn parse_time(time: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(time, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .map_err(|_| FootballError::Validation(format!("Invalid time '{}', use HH:MM:SS", time)))
}

/// Partial edit of a team; unset fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamChanges {
    pub name: Option<String>,
    pub founded_year: Option<i32>,
    pub home_address: Option<String>,
    pub home_city: Option<String>,
    pub logo_url: Option<String>,
}

impl TeamChanges {
    pub fn apply(self, current: &Team) -> NewTeam {
        NewTeam {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            founded_year: self.founded_year.unwrap_or(current.founded_year),
            home_address: self
                .home_address
                .unwrap_or_else(|| current.home_address.clone()),
            home_city: self.home_city.unwrap_or_else(|| current.home_city.clone()),
            logo_url: self.logo_url.or_else(|| current.logo_url.clone()),
        }
    }
}

/// Partial edit of a player
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerChanges {
    pub team_id: Option<TeamId>,
    pub name: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub position: Option<Position>,
    pub jersey_number: Option<u8>,
}

impl PlayerChanges {
    pub fn apply(self, current: &Player) -> NewPlayer {
        NewPlayer {
            team_id: self.team_id.unwrap_or(current.team_id),
            name: self.name.unwrap_or_else(|| current.name.clone()),
            height: self.height.unwrap_or(current.height),
            weight: self.weight.unwrap_or(current.weight),
            position: self.position.unwrap_or(current.position),
            jersey_number: self.jersey_number.unwrap_or(current.jersey_number),
        }
    }
}

/// Partial reschedule of a match. Status and score are not edited here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchChanges {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub home_team_id: Option<TeamId>,
    pub away_team_id: Option<TeamId>,
}

impl MatchChanges {
    pub fn apply(self, current: &Match) -> NewMatch {
        NewMatch {
            date: self.date.unwrap_or(current.date),
            time: self.time.unwrap_or(current.time),
            home_team_id: self.home_team_id.unwrap_or(current.home.id),
            away_team_id: self.away_team_id.unwrap_or(current.away.id),
        }
    }
}

pub fn validate_team(team: &NewTeam, current_year: i32) -> Result<()> {
    if team.name.trim().is_empty() {
        return Err(FootballError::Validation("Team name is required".into()));
    }
    if team.founded_year < MIN_FOUNDED_YEAR || team.founded_year > current_year {
        return Err(FootballError::Validation(format!(
            "Founded year must be between {} and {}",
            MIN_FOUNDED_YEAR, current_year
        )));
    }
    if team.home_city.trim().is_empty() {
        return Err(FootballError::Validation("Home city is required".into()));
    }
    Ok(())
}

pub fn validate_player(player: &NewPlayer, vocabulary: &Vocabulary) -> Result<()> {
    if player.name.trim().is_empty() {
        return Err(FootballError::Validation("Player name is required".into()));
    }
    if !(100.0..=250.0).contains(&player.height) {
        return Err(FootballError::Validation(
            "Height must be between 100 and 250 cm".into(),
        ));
    }
    if !(30.0..=200.0).contains(&player.weight) {
        return Err(FootballError::Validation(
            "Weight must be between 30 and 200 kg".into(),
        ));
    }
    vocabulary.check_position(player.position)?;
    if !(1..=99).contains(&player.jersey_number) {
        return Err(FootballError::Validation(
            "Jersey number must be between 1 and 99".into(),
        ));
    }
    Ok(())
}

pub fn validate_match(fixture: &NewMatch) -> Result<()> {
    if fixture.home_team_id == fixture.away_team_id {
        return Err(FootballError::Validation(
            "Home and away teams must differ".into(),
        ));
    }
    Ok(())
}

/// Current calendar year, for the founded-year upper bound
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(position: Position) -> NewPlayer {
        NewPlayer {
            team_id: TeamId(1),
            name: "Bambang".to_string(),
            height: 178.0,
            weight: 72.0,
            position,
            jersey_number: 9,
        }
    }

    #[test]
    fn test_position_checked_against_injected_vocabulary() {
        let all = Vocabulary::default();
        assert!(validate_player(&player(Position::Goalkeeper), &all).is_ok());

        let outfield_only = Vocabulary {
            positions: vec![Position::Forward, Position::Midfielder, Position::Defender],
            statuses: MatchStatus::ALL.to_vec(),
        };
        let err = validate_player(&player(Position::Goalkeeper), &outfield_only).unwrap_err();
        assert!(matches!(err, FootballError::Validation(_)));
    }

    #[test]
    fn test_player_ranges() {
        let vocab = Vocabulary::default();
        let mut p = player(Position::Forward);
        p.jersey_number = 0;
        assert!(validate_player(&p, &vocab).is_err());

        let mut p = player(Position::Forward);
        p.height = 90.0;
        assert!(validate_player(&p, &vocab).is_err());
    }

    #[test]
    fn test_status_vocabulary() {
        let vocab = Vocabulary {
            positions: Position::ALL.to_vec(),
            statuses: vec![MatchStatus::Scheduled, MatchStatus::Completed],
        };
        assert!(vocab.check_status(MatchStatus::Completed).is_ok());
        assert!(vocab.check_status(MatchStatus::Cancelled).is_err());
    }

    #[test]
    fn test_team_founded_year() {
        let team = NewTeam {
            name: "Persija".to_string(),
            founded_year: 1928,
            home_address: "Jl. Sudirman".to_string(),
            home_city: "Jakarta".to_string(),
            logo_url: None,
        };
        assert!(validate_team(&team, 2026).is_ok());
        assert!(validate_team(&NewTeam { founded_year: 2030, ..team }, 2026).is_err());
    }

    #[test]
    fn test_match_parse_and_validate() {
        let fixture = NewMatch::parse("2024-03-01", "19:30", TeamId(1), TeamId(2)).unwrap();
        assert_eq!(fixture.time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
        assert!(validate_match(&fixture).is_ok());

        assert!(NewMatch::parse("01/03/2024", "19:30:00", TeamId(1), TeamId(2)).is_err());
        let same = NewMatch::parse("2024-03-01", "19:30:00", TeamId(1), TeamId(1)).unwrap();
        assert!(validate_match(&same).is_err());
    }

    #[test]
    fn test_team_changes_keep_unset_fields() {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let current = Team {
            id: TeamId(3),
            name: "Persebaya".to_string(),
            founded_year: 1927,
            home_address: "Jl. Tambaksari".to_string(),
            home_city: "Surabaya".to_string(),
            logo_url: Some("https://example.org/logo.png".to_string()),
            created_at: now,
            updated_at: now,
        };

        let changes = TeamChanges {
            home_city: Some("Sidoarjo".to_string()),
            ..Default::default()
        };
        let merged = changes.apply(&current);
        assert_eq!(merged.name, "Persebaya");
        assert_eq!(merged.founded_year, 1927);
        assert_eq!(merged.home_city, "Sidoarjo");
        assert_eq!(merged.logo_url, current.logo_url);
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("07:05:30").unwrap(), NaiveTime::from_hms_opt(7, 5, 30).unwrap());
        assert_eq!(parse_time("07:05").unwrap(), NaiveTime::from_hms_opt(7, 5, 0).unwrap());
        assert!(matches!(parse_time("7pm"), Err(FootballError::Validation(_))));
        assert!(parse_date("2024-02-30").is_err());
    }
}
