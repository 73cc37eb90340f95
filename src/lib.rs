// Library crate for the Call Bridge server
// This file exposes the public API for integration tests

pub mod cards;
pub mod config;
pub mod event;
pub mod online;
pub mod scoring;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use cards::{Card, Rank, Suit};
pub use config::AppConfig;
pub use event::{EventBus, GameEvent, GameSubscription};
pub use online::{GameError, GameService, LifecycleController, OnlineGame, PlayerInfo};
pub use scoring::{ScoreSheet, ScoringError, ScoringService};
pub use shared::{AppError, AppState};
