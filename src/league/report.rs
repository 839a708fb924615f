//! Match reports
//!
//! A report summarises one completed match: final score, result label,
//! leading scorer, goal timeline and each side's cumulative wins.

use super::statistics::StatisticsAggregator;
use crate::data::EntityStore;
use crate::{
    FootballError, GoalDetail, MatchId, MatchOutcome, PlayerId, Result, Score, TeamRef,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;

/// Leading scorer of a single match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopScorer {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_name: String,
    pub goals_scored: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub match_id: MatchId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    pub final_score: Score,
    pub match_result: MatchOutcome,
    /// None when the match finished goalless
    pub top_scorer: Option<TopScorer>,
    /// Wins in completed matches with id up to and including this one
    pub home_team_total_wins: u32,
    pub away_team_total_wins: u32,
    pub goal_details: Vec<GoalDetail>,
}

pub struct ReportCompiler<'a, S: EntityStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: EntityStore + ?Sized> ReportCompiler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        ReportCompiler { store }
    }

    pub fn compile(&self, match_id: MatchId) -> Result<MatchReport> {
        let record = self.store.find_match(match_id)?;

        let (Some(final_score), Some(match_result)) = (record.score, record.outcome()) else {
            return Err(FootballError::InvalidState(format!(
                "Match {} is {}, reports are only available for completed matches",
                match_id, record.status
            )));
        };

        let goal_details = self.store.list_live_goals_for_match(match_id)?;
        let top_scorer = top_scorer(&goal_details);

        let stats = StatisticsAggregator::new(self.store);
        let home_team_total_wins = stats.team_wins_up_to(record.home.id, match_id)?;
        let away_team_total_wins = stats.team_wins_up_to(record.away.id, match_id)?;

        log::debug!(
            "Compiled report for match {}: {} with {} goals",
            match_id,
            match_result,
            goal_details.len()
        );

        Ok(MatchReport {
            match_id,
            date: record.date,
            time: record.time,
            home_team: record.home,
            away_team: record.away,
            final_score,
            match_result,
            top_scorer,
            home_team_total_wins,
            away_team_total_wins,
            goal_details,
        })
    }
}

/// Most goals wins; ties go to the lowest player id
fn top_scorer(goals: &[GoalDetail]) -> Option<TopScorer> {
    let mut tally: BTreeMap<PlayerId, (&GoalDetail, u32)> = BTreeMap::new();
    for goal in goals {
        tally.entry(goal.player_id).or_insert((goal, 0)).1 += 1;
    }

    let mut best: Option<(&GoalDetail, u32)> = None;
    // BTreeMap iterates in ascending id, so strict > keeps the lowest id on ties
    for (goal, count) in tally.into_values() {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((goal, count));
        }
    }

    best.map(|(goal, goals_scored)| TopScorer {
        player_id: goal.player_id,
        player_name: goal.player_name.clone(),
        team_name: goal.team_name.clone(),
        goals_scored,
    })
}
