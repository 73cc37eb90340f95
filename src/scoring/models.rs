use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TOTAL_ROUNDS: usize = 10;
pub const PLAYER_COUNT: usize = 4;
pub const TRICKS_PER_ROUND: u32 = 13;
pub const MIN_CALL: u32 = 2;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoringPhase {
    Calling,
    Making,
    Finished,
}

/// Whether a player made their call in rounds after the first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetPlayer {
    pub id: String,
    pub name: String,
    pub calls: Vec<Option<u32>>,
    pub made: Vec<Option<u32>>,
    pub scores: Vec<i32>,
    pub total_score: i32,
}

impl SheetPlayer {
    pub fn new(index: usize, name: String, total_rounds: usize) -> Self {
        Self {
            id: format!("player-{}", index + 1),
            name,
            calls: vec![None; total_rounds],
            made: vec![None; total_rounds],
            scores: vec![0; total_rounds],
            total_score: 0,
        }
    }

    pub(crate) fn recompute_total(&mut self) {
        self.total_score = self.scores.iter().sum();
    }
}

/// Offline score sheet for one game of up to ten rounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSheet {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub players: Vec<SheetPlayer>,
    pub round: usize,
    pub dealer_index: usize,
    pub phase: ScoringPhase,
    pub is_game_active: bool,
    pub total_rounds: usize,
    pub winning_score: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for ScoreSheet {
    fn default() -> Self {
        Self {
            id: String::new(),
            tag: None,
            players: Vec::new(),
            round: 1,
            dealer_index: 0,
            phase: ScoringPhase::Calling,
            is_game_active: false,
            total_rounds: TOTAL_ROUNDS,
            winning_score: 0,
            finished_at: None,
        }
    }
}

/// A finished sheet as stored in the shared history collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedSheet {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub players: Vec<SheetPlayer>,
    pub round: usize,
    pub dealer_index: usize,
    pub phase: ScoringPhase,
    pub total_rounds: usize,
    pub winning_score: i32,
    pub finished_at: DateTime<Utc>,
}

impl ArchivedSheet {
    pub fn from_sheet(sheet: &ScoreSheet, archived_at: DateTime<Utc>) -> Self {
        Self {
            id: sheet.id.clone(),
            tag: sheet.tag.clone(),
            players: sheet.players.clone(),
            round: sheet.round,
            dealer_index: sheet.dealer_index,
            phase: sheet.phase,
            total_rounds: sheet.total_rounds,
            winning_score: sheet.winning_score,
            finished_at: sheet.finished_at.unwrap_or(archived_at),
        }
    }
}
