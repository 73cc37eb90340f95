use serde::{Deserialize, Serialize};

use super::models::{OnlineGame, PlayerInfo};
use crate::cards::Card;

/// Request payload for opening a table
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    #[serde(flatten)]
    pub player: PlayerInfo,
    #[serde(default)]
    pub is_private: bool,
    pub winning_score: Option<i32>,
}

/// Request payload for public matchmaking
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicGameRequest {
    #[serde(flatten)]
    pub player: PlayerInfo,
    /// Used only if a new table has to be opened
    pub winning_score: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct StartGameRequest {
    pub uid: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayCardRequest {
    pub uid: String,
    pub card: Card,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayCardResponse {
    pub game: OnlineGame,
    /// Set when this card completed the trick
    pub trick_winner_seat: Option<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NextTrickResponse {
    pub game: OnlineGame,
    /// False when the trick had already been moved on
    pub advanced: bool,
}

/// A player's own view of their hand
#[derive(Debug, Serialize, Deserialize)]
pub struct HandResponse {
    pub cards: Vec<Card>,
    /// The cards that may be played into the current trick
    pub playable: Vec<Card>,
}
