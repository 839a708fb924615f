//! Output envelopes and text rendering for the CLI

use crate::league::report::MatchReport;
use crate::league::{PlayerStatistics, TeamStatistics};
use crate::{ErrorKind, FootballError, GoalDetail, Match, Player, Team};
use serde::Serialize;

/// JSON wrapper for every command result
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub category: &'static str,
    pub detail: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Envelope {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"message":"Failed to encode output: {}"}}"#, e)
        })
    }
}

impl Envelope<()> {
    pub fn from_error(err: &FootballError) -> Self {
        let kind = err.kind();
        // Internal details stay in the log
        let detail = match kind.category() {
            "internal" => "An internal error occurred".to_string(),
            _ => err.to_string(),
        };
        Envelope {
            success: false,
            message: "Request failed".to_string(),
            data: None,
            error: Some(ErrorBody {
                kind,
                category: kind.category(),
                detail,
            }),
        }
    }
}

const RULE: &str = "───────────────────────────────";

pub fn format_team(team: &Team) -> String {
    let logo = team.logo_url.as_deref().unwrap_or("-");
    format!(
        "{:>4}  {:<24} {:<18} founded {}  logo {}",
        team.id, team.name, team.home_city, team.founded_year, logo
    )
}

pub fn format_player(player: &Player) -> String {
    format!(
        "{:>4}  #{:<3} {:<24} {:<11} {:<20} {:.0}cm {:.0}kg",
        player.id,
        player.jersey_number,
        player.name,
        player.position,
        player.team_name,
        player.height,
        player.weight
    )
}

/// One line per match; the score appears only once the match is completed
pub fn format_match(record: &Match) -> String {
    let score = record
        .score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "vs".to_string());
    format!(
        "{:>4}  {} {}  {} {} {}  [{}]",
        record.id,
        record.date,
        record.time.format("%H:%M"),
        record.home.name,
        score,
        record.away.name,
        record.status
    )
}

pub fn format_goal(goal: &GoalDetail) -> String {
    format!(
        "{:>4}  {:>6}  {} ({})",
        goal.id, goal.goal_time, goal.player_name, goal.team_name
    )
}

pub fn format_team_statistics(stats: &TeamStatistics) -> String {
    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {}
├─────────────────────────────────────────────────┤
│  Played:           {}
│  Won/Drawn/Lost:   {} / {} / {}
│  Goals:            {} scored, {} conceded ({:+})
│  Avg scored:       {:.2}
│  Home:             {} played, {} won
│  Away:             {} played, {} won
│  Win ratio:        {:.1}%
└─────────────────────────────────────────────────┘
"#,
        stats.team_name,
        stats.total_matches,
        stats.wins,
        stats.draws,
        stats.losses,
        stats.goals_scored,
        stats.goals_conceded,
        stats.goal_difference(),
        stats.avg_goals_scored(),
        stats.home_matches,
        stats.home_wins,
        stats.away_matches,
        stats.away_wins,
        stats.win_ratio() * 100.0
    )
}

pub fn format_player_statistics(stats: &PlayerStatistics) -> String {
    format!(
        "{} ({}, {})\n{}\n  Goals:  {}\n",
        stats.player_name, stats.team_name, stats.position, RULE, stats.total_goals
    )
}

pub fn format_top_scorers(scorers: &[PlayerStatistics]) -> String {
    if scorers.is_empty() {
        return "No goals recorded.\n".to_string();
    }

    let mut out = format!("Top Scorers\n{}\n", RULE);
    for (rank, s) in scorers.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {:<24} {:<20} {:>3}\n",
            rank + 1,
            s.player_name,
            s.team_name,
            s.total_goals
        ));
    }
    out
}

pub fn format_report(report: &MatchReport) -> String {
    let top_scorer = match &report.top_scorer {
        Some(t) => format!("{} ({}) {}", t.player_name, t.team_name, t.goals_scored),
        None => "-".to_string(),
    };

    let mut out = format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} vs {}
│  {} {}
├─────────────────────────────────────────────────┤
│  Final score:      {}
│  Result:           {}
│  Top scorer:       {}
│  Total wins:       {} {}, {} {}
├─────────────────────────────────────────────────┤
"#,
        report.home_team.name,
        report.away_team.name,
        report.date,
        report.time.format("%H:%M"),
        report.final_score,
        report.match_result,
        top_scorer,
        report.home_team.name,
        report.home_team_total_wins,
        report.away_team.name,
        report.away_team_total_wins
    );

    if report.goal_details.is_empty() {
        out.push_str("│  No goals\n");
    }
    for goal in &report.goal_details {
        out.push_str(&format!(
            "│  {:>6}  {} ({})\n",
            goal.goal_time, goal.player_name, goal.team_name
        ));
    }
    out.push_str("└─────────────────────────────────────────────────┘\n");
    out
}
