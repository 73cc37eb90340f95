use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::online::models::OnlineGame;

/// Committed changes to an online game.
///
/// Every event carries the game as it stood right after the commit, along
/// with the document version that commit produced. Concurrent commits may be
/// announced out of order, so a subscriber keeps the snapshot with the
/// highest version rather than the one it heard last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A table was opened with its host in seat 0
    GameCreated { game: OnlineGame, version: u64 },

    /// A player took a seat
    PlayerJoined {
        game: OnlineGame,
        version: u64,
        uid: String,
        seat: u8,
    },

    /// Hands were dealt and seat 0 is to lead
    GameStarted { game: OnlineGame, version: u64 },

    /// A card went onto the table
    CardPlayed {
        game: OnlineGame,
        version: u64,
        seat: u8,
        card: Card,
    },

    /// The fourth card landed; the game now waits in `trick_scoring`
    TrickCompleted {
        game: OnlineGame,
        version: u64,
        winner_seat: u8,
    },

    /// The table was cleared for the next trick
    TrickStarted { game: OnlineGame, version: u64 },

    /// All thirteen tricks are done
    RoundCompleted { game: OnlineGame, version: u64 },
}

impl GameEvent {
    pub fn game(&self) -> &OnlineGame {
        match self {
            GameEvent::GameCreated { game, .. }
            | GameEvent::PlayerJoined { game, .. }
            | GameEvent::GameStarted { game, .. }
            | GameEvent::CardPlayed { game, .. }
            | GameEvent::TrickCompleted { game, .. }
            | GameEvent::TrickStarted { game, .. }
            | GameEvent::RoundCompleted { game, .. } => game,
        }
    }

    /// Document version written by the commit this event announces
    pub fn version(&self) -> u64 {
        match self {
            GameEvent::GameCreated { version, .. }
            | GameEvent::PlayerJoined { version, .. }
            | GameEvent::GameStarted { version, .. }
            | GameEvent::CardPlayed { version, .. }
            | GameEvent::TrickCompleted { version, .. }
            | GameEvent::TrickStarted { version, .. }
            | GameEvent::RoundCompleted { version, .. } => *version,
        }
    }

    /// Whether this event describes a later state than `other`
    pub fn supersedes(&self, other: &GameEvent) -> bool {
        self.version() > other.version()
    }

    pub fn game_id(&self) -> &str {
        &self.game().id
    }

    /// Short name of the event, used in logs
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::GameCreated { .. } => "game_created",
            GameEvent::PlayerJoined { .. } => "player_joined",
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::CardPlayed { .. } => "card_played",
            GameEvent::TrickCompleted { .. } => "trick_completed",
            GameEvent::TrickStarted { .. } => "trick_started",
            GameEvent::RoundCompleted { .. } => "round_completed",
        }
    }
}
