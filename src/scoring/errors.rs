use thiserror::Error;

use super::models::ScoringPhase;

/// Rejected score-sheet input. The sheet is never modified when one of these
/// is returned, so the caller can simply prompt again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("Exactly {expected} players are required, got {actual}")]
    WrongPlayerCount { expected: usize, actual: usize },

    #[error("Player names cannot be empty")]
    EmptyName,

    #[error("Player names must be unique: {0}")]
    DuplicateName(String),

    #[error("Winning score must be positive, got {0}")]
    InvalidWinningScore(i32),

    #[error("No game in progress")]
    NotActive,

    #[error("Expected one entry per player ({expected}), got {actual}")]
    WrongEntryCount { expected: usize, actual: usize },

    #[error("Cannot {action} during the {phase} phase of round {round}")]
    WrongPhase {
        action: &'static str,
        phase: ScoringPhase,
        round: usize,
    },

    #[error("Minimum call for any player is 2, {player} called {call}")]
    CallTooLow { player: String, call: u32 },

    #[error("A call cannot exceed 13 tricks, {player} called {call}")]
    CallTooHigh { player: String, call: u32 },

    #[error("Total calls must be 13 or more, got {total}")]
    CallsTotalTooLow { total: u32 },

    #[error("Nobody can make more than 13 tricks, {player} made {made}")]
    MadeTooHigh { player: String, made: u32 },

    #[error("Total tricks made must be exactly 13, got {total}")]
    MadeTotalMismatch { total: u32 },

    #[error("No call recorded for {player} in round {round}")]
    MissingCall { player: String, round: usize },
}
