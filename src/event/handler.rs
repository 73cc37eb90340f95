use async_trait::async_trait;
use thiserror::Error;

use super::events::GameEvent;

/// Errors that can occur when handling game events
#[derive(Debug, Error)]
pub enum GameEventError {
    #[error("Retryable error: {0}")]
    Retryable(String),

    #[error("Non-retryable error: {0}")]
    NonRetryable(String),
}

impl GameEventError {
    /// Whether this error indicates the operation could succeed if tried again
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameEventError::Retryable(_))
    }

    pub fn retryable(msg: impl Into<String>) -> Self {
        GameEventError::Retryable(msg.into())
    }

    pub fn non_retryable(msg: impl Into<String>) -> Self {
        GameEventError::NonRetryable(msg.into())
    }
}

/// Trait for components that react to a game's committed events
#[async_trait]
pub trait GameEventHandler: Send + Sync {
    /// Handle one event. Handlers may see the same state twice (for example
    /// a manual next-trick racing the pacer) and must tolerate it.
    async fn handle_game_event(&self, event: &GameEvent) -> Result<(), GameEventError>;

    /// Called when the subscription fell behind and events were dropped.
    /// Handlers that must not miss a transition re-read the game here.
    async fn handle_lag(&self, _game_id: &str) -> Result<(), GameEventError> {
        Ok(())
    }

    /// Get a human-readable name for this handler (for logging/debugging)
    fn handler_name(&self) -> &'static str;
}
