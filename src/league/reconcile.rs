//! Match result reconciliation
//!
//! A submitted result replaces a match's whole goal set and its score in
//! one step, or is rejected with the match left exactly as it was. Every
//! check runs before the store is asked to write anything.

use crate::data::EntityStore;
use crate::{
    Entity, FootballError, GoalDetail, GoalEntry, GoalId, Match, MatchId, Result, Score, Side,
};
use serde::{Deserialize, Serialize};

/// A claimed final score together with the goals that produce it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSubmission {
    pub home_score: u32,
    pub away_score: u32,
    pub goals: Vec<GoalEntry>,
}

impl ResultSubmission {
    pub fn new(home_score: u32, away_score: u32, goals: Vec<GoalEntry>) -> Self {
        ResultSubmission {
            home_score,
            away_score,
            goals,
        }
    }

    pub fn claimed(&self) -> Score {
        Score::new(self.home_score, self.away_score)
    }

    /// Checks that need no store access: one goal entry per claimed goal
    fn check_shape(&self) -> Result<()> {
        let claimed = u64::from(self.home_score) + u64::from(self.away_score);
        if self.goals.len() as u64 != claimed {
            return Err(FootballError::ScoreMismatch(format!(
                "score {} needs {} goal entries, got {}",
                self.claimed(),
                claimed,
                self.goals.len()
            )));
        }
        self.goals.iter().try_for_each(check_goal_time)
    }
}

fn check_goal_time(goal: &GoalEntry) -> Result<()> {
    if goal.goal_time.trim().is_empty() {
        return Err(FootballError::Validation(format!(
            "Goal time is required for the goal by player {}",
            goal.player_id
        )));
    }
    Ok(())
}

/// Applies submitted results and individual goal edits against a store
pub struct ResultReconciler<'a, S: EntityStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: EntityStore + ?Sized> ResultReconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        ResultReconciler { store }
    }

    /// Replace the match's goals and score with the submission.
    ///
    /// The per-side tally is derived from each scorer's team, never taken
    /// from the caller, and must equal the claimed score.
    pub fn reconcile(&self, match_id: MatchId, submission: &ResultSubmission) -> Result<Match> {
        submission.check_shape()?;

        let fixture = self.store.find_match(match_id)?;
        let tally = self.tally(&fixture, &submission.goals)?;
        let claimed = submission.claimed();

        if tally != claimed {
            log::warn!(
                "Rejected result for match {}: claimed {}, goals give {}",
                match_id,
                claimed,
                tally
            );
            return Err(FootballError::ScoreMismatch(format!(
                "claimed {}, goals give {}",
                claimed, tally
            )));
        }

        self.store
            .replace_match_goals(match_id, &submission.goals, claimed.home, claimed.away)?;

        log::info!(
            "Match {} completed: {} {} {} ({} goals)",
            match_id,
            fixture.home.name,
            claimed,
            fixture.away.name,
            submission.goals.len()
        );

        self.store.find_match(match_id)
    }

    /// Add a single goal to a completed match, bumping the scorer's side
    pub fn record_goal(&self, match_id: MatchId, goal: &GoalEntry) -> Result<GoalDetail> {
        check_goal_time(goal)?;

        let fixture = self.store.find_match(match_id)?;
        if !fixture.is_completed() {
            return Err(FootballError::InvalidState(format!(
                "goals can only be added to a completed match, match {} is {}",
                match_id, fixture.status
            )));
        }

        let side = self.side_for(&fixture, goal)?;
        let goal_id = self.store.append_goal(match_id, goal, side)?;
        log::info!(
            "Recorded goal {} for player {} at {} in match {}",
            goal_id,
            goal.player_id,
            goal.goal_time,
            match_id
        );

        self.store
            .list_live_goals_for_match(match_id)?
            .into_iter()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| FootballError::not_found(Entity::Goal, goal_id.0))
    }

    /// Remove a single goal, lowering the scorer's side
    pub fn withdraw_goal(&self, goal_id: GoalId) -> Result<()> {
        self.store.remove_goal(goal_id)?;
        log::info!("Withdrew goal {}", goal_id);
        Ok(())
    }

    /// Live goal timeline of a live match
    pub fn goals(&self, match_id: MatchId) -> Result<Vec<GoalDetail>> {
        self.store.find_match(match_id)?;
        self.store.list_live_goals_for_match(match_id)
    }

    fn tally(&self, fixture: &Match, goals: &[GoalEntry]) -> Result<Score> {
        let mut tally = Score::new(0, 0);
        for goal in goals {
            match self.side_for(fixture, goal)? {
                Side::Home => tally.home += 1,
                Side::Away => tally.away += 1,
            }
        }
        Ok(tally)
    }

    fn side_for(&self, fixture: &Match, goal: &GoalEntry) -> Result<Side> {
        let player = self.store.find_player(goal.player_id)?;
        fixture
            .side_of(player.team_id)
            .ok_or_else(|| FootballError::InvalidGoal {
                player_id: player.id,
                player_name: player.name.clone(),
                match_id: fixture.id,
            })
    }
}
