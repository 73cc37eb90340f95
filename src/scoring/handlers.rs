use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    models::ArchivedSheet,
    types::{CallsRequest, MadeRequest, OutcomesRequest, SheetResponse, StartSheetRequest},
};
use crate::shared::{AppError, AppState};

/// Routes for the offline score sheets, mounted under `/scoring`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/history", get(list_history))
        .route("/:session", get(get_sheet).delete(reset_sheet))
        .route("/:session/start", post(start_sheet))
        .route("/:session/calls", post(submit_calls))
        .route("/:session/made", post(submit_made))
        .route("/:session/outcomes", post(submit_outcomes))
}

/// GET /scoring/:session
#[instrument(name = "get_sheet", skip(state))]
pub async fn get_sheet(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<SheetResponse>, AppError> {
    let sheet = state.scoring.load(&session).await?;
    Ok(Json(sheet.into()))
}

/// POST /scoring/:session/start
///
/// Replaces whatever sheet the session had with a fresh one
#[instrument(name = "start_sheet", skip(state))]
pub async fn start_sheet(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(request): Json<StartSheetRequest>,
) -> Result<Json<SheetResponse>, AppError> {
    let winning_score = request
        .winning_score
        .unwrap_or(state.config.default_winning_score);

    let sheet = state
        .scoring
        .start_game(&session, &request.names, winning_score, request.tag)
        .await?;

    info!(session = %session, sheet_id = %sheet.id, "Score sheet started");
    Ok(Json(sheet.into()))
}

#[instrument(name = "submit_calls", skip(state))]
pub async fn submit_calls(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(request): Json<CallsRequest>,
) -> Result<Json<SheetResponse>, AppError> {
    let sheet = state.scoring.submit_calls(&session, &request.calls).await?;
    Ok(Json(sheet.into()))
}

#[instrument(name = "submit_made", skip(state))]
pub async fn submit_made(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(request): Json<MadeRequest>,
) -> Result<Json<SheetResponse>, AppError> {
    let sheet = state.scoring.submit_made(&session, &request.made).await?;
    Ok(Json(sheet.into()))
}

#[instrument(name = "submit_outcomes", skip(state))]
pub async fn submit_outcomes(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(request): Json<OutcomesRequest>,
) -> Result<Json<SheetResponse>, AppError> {
    let sheet = state
        .scoring
        .submit_outcomes(&session, &request.outcomes)
        .await?;
    Ok(Json(sheet.into()))
}

/// DELETE /scoring/:session
#[instrument(name = "reset_sheet", skip(state))]
pub async fn reset_sheet(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<SheetResponse>, AppError> {
    let sheet = state.scoring.reset_game(&session).await?;
    Ok(Json(sheet.into()))
}

/// GET /scoring/history
///
/// Finished sheets from every session, newest first
#[instrument(name = "list_history", skip(state))]
pub async fn list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArchivedSheet>>, AppError> {
    let sheets = state.scoring.history().await?;
    info!(count = sheets.len(), "Listed score sheet history");
    Ok(Json(sheets))
}
