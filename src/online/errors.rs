use thiserror::Error;

use super::models::GameStatus;
use crate::cards::{Card, Suit};
use crate::shared::{ErrorKind, StoreError};

/// Why an online action was refused. Every variant leaves the stored game
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Game not found: {0}")]
    NotFound(String),

    #[error("Player {0} is not seated in this game")]
    NotSeated(String),

    #[error("Only the host can start the game")]
    NotHost,

    #[error("Game is full")]
    GameFull,

    #[error("Game has already started")]
    AlreadyStarted,

    #[error("Need 4 players to start, have {0}")]
    InsufficientPlayers(usize),

    #[error("Not allowed while the game is {0}")]
    InvalidPhase(GameStatus),

    #[error("Not your turn, seat {expected} is to play")]
    NotYourTurn { expected: u8 },

    #[error("Card {0} is not in your hand")]
    CardNotInHand(Card),

    #[error("Must follow suit ({0}) if you can")]
    MustFollowSuit(Suit),

    #[error("Invalid deal: {0}")]
    InvalidDeal(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Gave up after {attempts} conflicting updates")]
    Conflict { attempts: u32 },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::NotFound(_) => ErrorKind::NotFound,
            GameError::NotSeated(_) | GameError::NotHost => ErrorKind::Authorization,
            GameError::GameFull
            | GameError::AlreadyStarted
            | GameError::InsufficientPlayers(_)
            | GameError::InvalidPhase(_)
            | GameError::NotYourTurn { .. }
            | GameError::CardNotInHand(_)
            | GameError::MustFollowSuit(_) => ErrorKind::RuleViolation,
            GameError::InvalidDeal(_) | GameError::InvalidRequest(_) => ErrorKind::Validation,
            GameError::Conflict { .. } => ErrorKind::ConcurrencyConflict,
            GameError::Storage(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Rank;
    use rstest::rstest;

    #[rstest]
    #[case(GameError::NotFound("x".into()), ErrorKind::NotFound)]
    #[case(GameError::NotHost, ErrorKind::Authorization)]
    #[case(GameError::NotSeated("u".into()), ErrorKind::Authorization)]
    #[case(GameError::MustFollowSuit(Suit::Hearts), ErrorKind::RuleViolation)]
    #[case(GameError::CardNotInHand(Card::new(Rank::Ace, Suit::Spades)), ErrorKind::RuleViolation)]
    #[case(GameError::Conflict { attempts: 5 }, ErrorKind::ConcurrencyConflict)]
    #[case(GameError::Storage(StoreError::Backend("down".into())), ErrorKind::Internal)]
    fn test_error_kinds(#[case] error: GameError, #[case] expected: ErrorKind) {
        assert_eq!(error.kind(), expected);
    }

    #[test]
    fn test_messages_name_the_problem() {
        assert_eq!(
            GameError::MustFollowSuit(Suit::Hearts).to_string(),
            "Must follow suit (H) if you can"
        );
        assert_eq!(
            GameError::InvalidPhase(GameStatus::TrickScoring).to_string(),
            "Not allowed while the game is trick_scoring"
        );
    }
}
