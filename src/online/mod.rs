// Online four-player tables: seating and the deal, trick play, and the
// transactional service and lifecycle that drive them.

pub mod errors;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod seating;
pub mod service;
pub mod trick;
pub mod types;

pub use errors::GameError;
pub use lifecycle::{LifecycleController, TrickPacer};
pub use models::{
    GameSettings, GameStatus, Hand, LobbyEntry, OnlineGame, OnlinePlayer, PlayedCard, PlayerInfo,
};
pub use repository::{GameDocument, GameRepository, InMemoryGameRepository};
pub use seating::SeatAssignment;
pub use service::{GameService, JoinedGame, PlayResult};
pub use trick::{legal_cards, trick_winner, NextTrick, PlayOutcome, TRUMP};
