use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::online::{GameError, GameService, LifecycleController};
use crate::scoring::{ScoringError, ScoringService};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub games: GameService,
    pub lifecycle: Arc<LifecycleController>,
    pub scoring: Arc<ScoringService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        games: GameService,
        lifecycle: Arc<LifecycleController>,
        scoring: Arc<ScoringService>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            games,
            lifecycle,
            scoring,
            config,
        }
    }
}

/// Broad class of a failure, used to pick the HTTP status and reported to
/// clients alongside the message
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    RuleViolation,
    ConcurrencyConflict,
    NotFound,
    Authorization,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ConcurrencyConflict => StatusCode::CONFLICT,
            ErrorKind::RuleViolation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failures of the document and key-value stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Version conflict: expected {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Conflict { .. } => ErrorKind::ConcurrencyConflict,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::AlreadyExists(_)
            | StoreError::Serialization(_)
            | StoreError::Backend(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Scoring(_) | AppError::BadRequest(_) => ErrorKind::Validation,
            AppError::Game(e) => e.kind(),
            AppError::Store(e) => e.kind(),
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Internal => ErrorKind::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let error_message = match kind {
            // Backend details stay in the logs
            ErrorKind::Internal => {
                tracing::error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
        }));

        (kind.status(), body).into_response()
    }
}
