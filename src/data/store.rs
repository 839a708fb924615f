//! Read/write contract between the league logic and the entity store
//!
//! Every lookup sees live records only; tombstoned rows are filtered by
//! the implementation and never reach the callers.

use crate::{
    GoalDetail, GoalEntry, GoalId, Match, MatchId, Player, PlayerId, Result, Side, Team, TeamId,
};

pub trait EntityStore {
    fn find_team(&self, id: TeamId) -> Result<Team>;

    fn find_player(&self, id: PlayerId) -> Result<Player>;

    fn find_match(&self, id: MatchId) -> Result<Match>;

    /// Tombstone the match's live goals, insert `goals`, set the score and
    /// mark the match completed, as one transaction.
    fn replace_match_goals(
        &self,
        match_id: MatchId,
        goals: &[GoalEntry],
        home_score: u32,
        away_score: u32,
    ) -> Result<()>;

    /// Insert a goal and increment the scoring side's score, as one transaction.
    fn append_goal(&self, match_id: MatchId, goal: &GoalEntry, side: Side) -> Result<GoalId>;

    /// Tombstone a live goal and decrement its side's score, as one transaction.
    fn remove_goal(&self, goal_id: GoalId) -> Result<()>;

    /// Live goals ordered by goal time, then insertion order.
    ///
    /// Goal times are free-form text and compare as text, so callers that
    /// want chronological order should zero-pad them (`05:00`, not `5:00`).
    fn list_live_goals_for_match(&self, match_id: MatchId) -> Result<Vec<GoalDetail>>;

    /// Completed live matches the team played, ordered by identity
    fn list_completed_matches_for_team(&self, team_id: TeamId) -> Result<Vec<Match>>;

    fn count_live_goals_for_player(&self, player_id: PlayerId) -> Result<u32>;

    /// Live players with at least one live goal, most goals first, ties by id
    fn rank_players_by_goals(&self, limit: usize) -> Result<Vec<(Player, u32)>>;
}
