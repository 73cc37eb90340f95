use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use super::errors::ScoringError;
use super::models::{
    Outcome, ScoreSheet, ScoringPhase, SheetPlayer, MIN_CALL, PLAYER_COUNT, TOTAL_ROUNDS,
    TRICKS_PER_ROUND,
};

/// House rule: eight tricks is worth thirteen points, whether made in the
/// first round or won as a call later on.
const EIGHT_TRICK_BONUS: (u32, i32) = (8, 13);

fn tricks_score(tricks: u32) -> i32 {
    if tricks == EIGHT_TRICK_BONUS.0 {
        EIGHT_TRICK_BONUS.1
    } else {
        tricks as i32
    }
}

impl ScoreSheet {
    /// Starts a fresh sheet. Round 1 has no calling phase, so the sheet opens
    /// in `making`.
    pub fn start(
        names: &[String],
        winning_score: i32,
        tag: Option<String>,
    ) -> Result<Self, ScoringError> {
        if names.len() != PLAYER_COUNT {
            return Err(ScoringError::WrongPlayerCount {
                expected: PLAYER_COUNT,
                actual: names.len(),
            });
        }

        let names: Vec<String> = names.iter().map(|n| n.trim().to_string()).collect();
        if names.iter().any(|n| n.is_empty()) {
            return Err(ScoringError::EmptyName);
        }

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ScoringError::DuplicateName(name.clone()));
            }
        }

        if winning_score <= 0 {
            return Err(ScoringError::InvalidWinningScore(winning_score));
        }

        let players = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| SheetPlayer::new(i, name, TOTAL_ROUNDS))
            .collect();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            tag: tag.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            players,
            round: 1,
            dealer_index: 0,
            phase: ScoringPhase::Making,
            is_game_active: true,
            total_rounds: TOTAL_ROUNDS,
            winning_score,
            finished_at: None,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.phase == ScoringPhase::Finished
    }

    /// Players sharing the highest total. More than one means a tie.
    pub fn leaders(&self) -> Vec<&SheetPlayer> {
        let Some(best) = self.players.iter().map(|p| p.total_score).max() else {
            return Vec::new();
        };
        self.players
            .iter()
            .filter(|p| p.total_score == best)
            .collect()
    }

    /// Records each player's call for the current round and moves to `making`.
    pub fn submit_calls(&mut self, calls: &[u32]) -> Result<(), ScoringError> {
        self.ensure_phase("submit calls", ScoringPhase::Calling)?;
        self.ensure_entry_count(calls.len())?;

        for (player, &call) in self.players.iter().zip(calls) {
            if call < MIN_CALL {
                return Err(ScoringError::CallTooLow {
                    player: player.name.clone(),
                    call,
                });
            }
            if call > TRICKS_PER_ROUND {
                return Err(ScoringError::CallTooHigh {
                    player: player.name.clone(),
                    call,
                });
            }
        }

        let total: u32 = calls.iter().sum();
        if total < TRICKS_PER_ROUND {
            return Err(ScoringError::CallsTotalTooLow { total });
        }

        let index = self.round_index();
        for (player, &call) in self.players.iter_mut().zip(calls) {
            player.calls[index] = Some(call);
        }
        self.phase = ScoringPhase::Making;
        Ok(())
    }

    /// First round only: each player reports the tricks they took.
    pub fn submit_made(&mut self, made: &[u32]) -> Result<(), ScoringError> {
        self.submit_made_at(made, Utc::now())
    }

    pub(crate) fn submit_made_at(
        &mut self,
        made: &[u32],
        now: DateTime<Utc>,
    ) -> Result<(), ScoringError> {
        self.ensure_phase("record tricks made", ScoringPhase::Making)?;
        if self.round != 1 {
            return Err(self.wrong_phase("record tricks made"));
        }
        self.ensure_entry_count(made.len())?;

        // Bounding each entry keeps the sum from overflowing
        for (player, &tricks) in self.players.iter().zip(made) {
            if tricks > TRICKS_PER_ROUND {
                return Err(ScoringError::MadeTooHigh {
                    player: player.name.clone(),
                    made: tricks,
                });
            }
        }

        let total: u32 = made.iter().sum();
        if total != TRICKS_PER_ROUND {
            return Err(ScoringError::MadeTotalMismatch { total });
        }

        let index = self.round_index();
        for (player, &tricks) in self.players.iter_mut().zip(made) {
            player.made[index] = Some(tricks);
            player.scores[index] = tricks_score(tricks);
        }
        self.finish_round(now);
        Ok(())
    }

    /// Rounds after the first: a won call scores the call, a lost call costs it.
    pub fn submit_outcomes(&mut self, outcomes: &[Outcome]) -> Result<(), ScoringError> {
        self.submit_outcomes_at(outcomes, Utc::now())
    }

    pub(crate) fn submit_outcomes_at(
        &mut self,
        outcomes: &[Outcome],
        now: DateTime<Utc>,
    ) -> Result<(), ScoringError> {
        self.ensure_phase("record outcomes", ScoringPhase::Making)?;
        if self.round == 1 {
            return Err(self.wrong_phase("record outcomes"));
        }
        self.ensure_entry_count(outcomes.len())?;

        let index = self.round_index();
        let mut calls = Vec::with_capacity(self.players.len());
        for player in &self.players {
            let call = player.calls[index].ok_or_else(|| ScoringError::MissingCall {
                player: player.name.clone(),
                round: self.round,
            })?;
            calls.push(call);
        }

        for ((player, outcome), call) in self.players.iter_mut().zip(outcomes).zip(calls) {
            match outcome {
                Outcome::Won => {
                    player.made[index] = Some(call);
                    player.scores[index] = tricks_score(call);
                }
                Outcome::Lost => {
                    // Exact tricks are not tracked on a lost call
                    player.made[index] = None;
                    player.scores[index] = -(call as i32);
                }
            }
        }
        self.finish_round(now);
        Ok(())
    }

    /// Back to the pristine, inactive sheet.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn finish_round(&mut self, now: DateTime<Utc>) {
        for player in &mut self.players {
            player.recompute_total();
        }

        let next_round = self.round + 1;
        let threshold_reached = self
            .players
            .iter()
            .any(|p| p.total_score >= self.winning_score);

        self.round = next_round;
        self.dealer_index = (self.dealer_index + 1) % self.players.len();

        if threshold_reached || next_round > self.total_rounds {
            self.phase = ScoringPhase::Finished;
            self.finished_at = Some(now);
        } else {
            self.phase = ScoringPhase::Calling;
        }
    }

    fn round_index(&self) -> usize {
        self.round - 1
    }

    fn ensure_phase(&self, action: &'static str, phase: ScoringPhase) -> Result<(), ScoringError> {
        if !self.is_game_active {
            return Err(ScoringError::NotActive);
        }
        if self.phase != phase {
            return Err(self.wrong_phase(action));
        }
        Ok(())
    }

    fn wrong_phase(&self, action: &'static str) -> ScoringError {
        ScoringError::WrongPhase {
            action,
            phase: self.phase,
            round: self.round,
        }
    }

    fn ensure_entry_count(&self, actual: usize) -> Result<(), ScoringError> {
        if actual != self.players.len() {
            return Err(ScoringError::WrongEntryCount {
                expected: self.players.len(),
                actual,
            });
        }
        Ok(())
    }
}
