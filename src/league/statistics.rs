//! Team and player statistics
//!
//! Aggregates over live completed matches and live goals. Nothing here
//! writes to the store.

use crate::data::EntityStore;
use crate::{Match, MatchId, MatchOutcome, Player, PlayerId, Position, Result, Side, TeamId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_SCORERS: usize = 10;
pub const MAX_TOP_SCORERS: usize = 100;

/// Record of a team across its completed matches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub team_id: TeamId,
    pub team_name: String,
    /// Total completed matches played
    pub total_matches: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_scored: u32,
    pub goals_conceded: u32,
    pub home_matches: u32,
    pub home_wins: u32,
    pub away_matches: u32,
    pub away_wins: u32,
}

impl TeamStatistics {
    /// Create new empty statistics
    pub fn new(team_id: TeamId, team_name: impl Into<String>) -> Self {
        TeamStatistics {
            team_id,
            team_name: team_name.into(),
            ..Default::default()
        }
    }

    /// Update statistics with a match result.
    ///
    /// Matches the team did not play in, or that are not completed, are
    /// ignored.
    pub fn update(&mut self, record: &Match) {
        let Some(side) = record.side_of(self.team_id) else {
            return;
        };
        let (Some(outcome), Some(score)) = (record.outcome(), record.score) else {
            return;
        };

        let (scored, conceded) = match side {
            Side::Home => (score.home, score.away),
            Side::Away => (score.away, score.home),
        };

        self.total_matches += 1;
        self.goals_scored += scored;
        self.goals_conceded += conceded;

        match side {
            Side::Home => self.home_matches += 1,
            Side::Away => self.away_matches += 1,
        }

        match (outcome, side) {
            (MatchOutcome::Draw, _) => self.draws += 1,
            (MatchOutcome::HomeWin, Side::Home) => {
                self.wins += 1;
                self.home_wins += 1;
            }
            (MatchOutcome::AwayWin, Side::Away) => {
                self.wins += 1;
                self.away_wins += 1;
            }
            _ => self.losses += 1,
        }
    }

    /// Win ratio (0-1)
    pub fn win_ratio(&self) -> f32 {
        if self.total_matches == 0 {
            0.0
        } else {
            self.wins as f32 / self.total_matches as f32
        }
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_scored) - i64::from(self.goals_conceded)
    }

    /// Average goals scored per match
    pub fn avg_goals_scored(&self) -> f32 {
        if self.total_matches == 0 {
            0.0
        } else {
            self.goals_scored as f32 / self.total_matches as f32
        }
    }
}

/// Live goal count of one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatistics {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_id: TeamId,
    pub team_name: String,
    pub position: Position,
    pub total_goals: u32,
}

impl PlayerStatistics {
    fn from_player(player: Player, total_goals: u32) -> Self {
        PlayerStatistics {
            player_id: player.id,
            player_name: player.name,
            team_id: player.team_id,
            team_name: player.team_name,
            position: player.position,
            total_goals,
        }
    }
}

/// Read-side statistics over an entity store
pub struct StatisticsAggregator<'a, S: EntityStore + ?Sized> {
    store: &'a S,
    default_limit: usize,
    max_limit: usize,
}

impl<'a, S: EntityStore + ?Sized> StatisticsAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        StatisticsAggregator {
            store,
            default_limit: DEFAULT_TOP_SCORERS,
            max_limit: MAX_TOP_SCORERS,
        }
    }

    /// Override the top-scorer list bounds
    pub fn with_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.max_limit = max_limit.max(1);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }

    pub fn team_statistics(&self, team_id: TeamId) -> Result<TeamStatistics> {
        let team = self.store.find_team(team_id)?;
        let mut stats = TeamStatistics::new(team.id, team.name);

        for record in self.store.list_completed_matches_for_team(team_id)? {
            stats.update(&record);
        }

        log::debug!(
            "Team {} statistics: {} played, {}W {}D {}L",
            team_id,
            stats.total_matches,
            stats.wins,
            stats.draws,
            stats.losses
        );
        Ok(stats)
    }

    /// Goals across all matches; a live goal only exists as part of a result
    pub fn player_statistics(&self, player_id: PlayerId) -> Result<PlayerStatistics> {
        let player = self.store.find_player(player_id)?;
        let total_goals = self.store.count_live_goals_for_player(player_id)?;
        Ok(PlayerStatistics::from_player(player, total_goals))
    }

    /// Players with at least one goal, most goals first, ties by player id
    pub fn top_scorers(&self, limit: Option<i64>) -> Result<Vec<PlayerStatistics>> {
        let limit = self.clamp_limit(limit);
        let ranked = self.store.rank_players_by_goals(limit)?;
        Ok(ranked
            .into_iter()
            .filter(|(_, goals)| *goals > 0)
            .take(limit)
            .map(|(player, goals)| PlayerStatistics::from_player(player, goals))
            .collect())
    }

    /// Non-positive or missing limits fall back to the default; large ones
    /// are capped.
    pub fn clamp_limit(&self, limit: Option<i64>) -> usize {
        match limit {
            Some(n) if n > 0 => usize::try_from(n)
                .unwrap_or(self.max_limit)
                .min(self.max_limit),
            _ => self.default_limit,
        }
    }

    /// Wins of a team in completed matches whose id is at most `up_to`.
    ///
    /// The boundary is match identity, not match date.
    pub fn team_wins_up_to(&self, team_id: TeamId, up_to: MatchId) -> Result<u32> {
        let wins = self
            .store
            .list_completed_matches_for_team(team_id)?
            .iter()
            .filter(|record| record.id <= up_to)
            .filter(|record| record.did_win(team_id) == Some(true))
            .count();
        Ok(wins as u32)
    }
}
