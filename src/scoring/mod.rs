// Offline score sheet: a pure reducer over rounds plus the per-session
// persistence and history archive around it.

pub mod engine;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod models;
pub mod service;
pub mod store;
pub mod types;

pub use errors::ScoringError;
pub use history::{HistoryRepository, InMemoryHistoryRepository};
pub use models::{ArchivedSheet, Outcome, ScoreSheet, ScoringPhase, SheetPlayer};
pub use service::ScoringService;
pub use store::{FileLocalStore, InMemoryLocalStore, LocalStore};
