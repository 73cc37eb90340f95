use serde::{Deserialize, Serialize};

use crate::cards::{Card, Suit};

/// Seats at a table, numbered 0..SEATS
pub const SEATS: u8 = 4;
pub const TRICKS_PER_ROUND: u32 = 13;
pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";

/// Cards a seated player currently holds
pub type Hand = Vec<Card>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    Playing,
    Calling,
    TrickScoring,
    RoundScoring,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub is_private: bool,
    pub winning_score: i32,
}

/// Identity of someone creating or joining a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl PlayerInfo {
    pub fn new(uid: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: Some(display_name.into()),
            photo_url: None,
        }
    }

    /// Display name, or the default for players who never set one
    pub fn name(&self) -> String {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_PLAYER_NAME)
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlinePlayer {
    pub uid: String,
    pub name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub is_bot: bool,
    pub seat: u8,
    pub score: i32,
    pub tricks_won: u32,
}

impl OnlinePlayer {
    pub fn seated(info: &PlayerInfo, seat: u8) -> Self {
        Self {
            uid: info.uid.clone(),
            name: info.name(),
            photo_url: info.photo_url.clone(),
            is_bot: false,
            seat,
            score: 0,
            tricks_won: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedCard {
    pub seat: u8,
    pub card: Card,
}

/// Shared state of one online table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineGame {
    pub id: String,
    pub host_id: String,
    pub status: GameStatus,
    pub players: Vec<OnlinePlayer>,
    pub settings: GameSettings,
    pub current_round: u32,
    pub current_trick: u32,
    pub current_turn_seat: u8,
    pub trick_suit: Option<Suit>,
    pub cards_on_table: Vec<PlayedCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_trick_winner_seat: Option<u8>,
}

impl OnlineGame {
    /// New table in `waiting` with the host in seat 0
    pub fn new(id: String, host: &PlayerInfo, settings: GameSettings) -> Self {
        Self {
            id,
            host_id: host.uid.clone(),
            status: GameStatus::Waiting,
            players: vec![OnlinePlayer::seated(host, 0)],
            settings,
            current_round: 1,
            current_trick: 1,
            current_turn_seat: 0,
            trick_suit: None,
            cards_on_table: Vec::new(),
            last_trick_winner_seat: None,
        }
    }

    pub fn player(&self, uid: &str) -> Option<&OnlinePlayer> {
        self.players.iter().find(|p| p.uid == uid)
    }

    pub fn player_at(&self, seat: u8) -> Option<&OnlinePlayer> {
        self.players.iter().find(|p| p.seat == seat)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= SEATS as usize
    }

    /// Whether this table is listed for public matchmaking
    pub fn is_open_to_public(&self) -> bool {
        !self.settings.is_private && self.status == GameStatus::Waiting && !self.is_full()
    }
}

/// Public-lobby listing of a table that still has open seats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyEntry {
    pub game_id: String,
    pub player_count: usize,
}

impl LobbyEntry {
    pub fn for_game(game: &OnlineGame) -> Self {
        Self {
            game_id: game.id.clone(),
            player_count: game.players.len(),
        }
    }
}
