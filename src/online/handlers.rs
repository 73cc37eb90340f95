use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    models::{OnlineGame, PlayerInfo},
    trick::{legal_cards, NextTrick, PlayOutcome},
    types::{
        CreateGameRequest, HandResponse, NextTrickResponse, PlayCardRequest, PlayCardResponse,
        PublicGameRequest, StartGameRequest,
    },
};
use crate::shared::{AppError, AppState};

/// Routes for online tables, mounted under `/games`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_game))
        .route("/public", post(find_public_game))
        .route("/:id", get(get_game))
        .route("/:id/join", post(join_game))
        .route("/:id/start", post(start_game))
        .route("/:id/play", post(play_card))
        .route("/:id/next-trick", post(next_trick))
        .route("/:id/hands/:uid", get(get_hand))
}

/// POST /games
#[instrument(name = "create_game", skip(state, request), fields(uid = %request.player.uid))]
pub async fn create_game(
    State(state): State<AppState>,
    Json(request): Json<CreateGameRequest>,
) -> Result<Json<OnlineGame>, AppError> {
    let winning_score = request
        .winning_score
        .unwrap_or(state.config.default_winning_score);
    let game = state
        .games
        .create_game(&request.player, request.is_private, winning_score)
        .await?;

    info!(game_id = %game.id, "Game created via HTTP");
    Ok(Json(game))
}

/// POST /games/public
///
/// Seats the caller at an open public table, opening one if needed
#[instrument(name = "find_public_game", skip(state, request), fields(uid = %request.player.uid))]
pub async fn find_public_game(
    State(state): State<AppState>,
    Json(request): Json<PublicGameRequest>,
) -> Result<Json<OnlineGame>, AppError> {
    let winning_score = request
        .winning_score
        .unwrap_or(state.config.default_winning_score);
    let game = state
        .games
        .find_and_join_public_game(&request.player, winning_score)
        .await?;
    Ok(Json(game))
}

/// GET /games/:id
#[instrument(name = "get_game", skip(state))]
pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OnlineGame>, AppError> {
    Ok(Json(state.games.get_game(&id).await?))
}

/// POST /games/:id/join
#[instrument(name = "join_game", skip(state, player), fields(uid = %player.uid))]
pub async fn join_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(player): Json<PlayerInfo>,
) -> Result<Json<OnlineGame>, AppError> {
    let joined = state.games.join_game(&id, &player).await?;
    Ok(Json(joined.game))
}

/// POST /games/:id/start
///
/// Host only. Trick pacing runs in the background from here on.
#[instrument(name = "start_game", skip(state))]
pub async fn start_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StartGameRequest>,
) -> Result<Json<OnlineGame>, AppError> {
    let game = state.lifecycle.start_game(&id, &request.uid).await?;
    Ok(Json(game))
}

/// POST /games/:id/play
#[instrument(name = "play_card", skip(state))]
pub async fn play_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PlayCardRequest>,
) -> Result<Json<PlayCardResponse>, AppError> {
    let result = state
        .games
        .play_card(&id, &request.uid, request.card)
        .await?;

    let trick_winner_seat = match result.outcome {
        PlayOutcome::TrickComplete { winner_seat } => Some(winner_seat),
        PlayOutcome::Continued { .. } => None,
    };
    Ok(Json(PlayCardResponse {
        game: result.game,
        trick_winner_seat,
    }))
}

/// POST /games/:id/next-trick
///
/// Manual trigger alongside the pacer; harmless if the trick already moved on
#[instrument(name = "next_trick", skip(state))]
pub async fn next_trick(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NextTrickResponse>, AppError> {
    let (game, next) = state.games.start_next_trick(&id).await?;
    Ok(Json(NextTrickResponse {
        game,
        advanced: next != NextTrick::Skipped,
    }))
}

/// GET /games/:id/hands/:uid
#[instrument(name = "get_hand", skip(state))]
pub async fn get_hand(
    State(state): State<AppState>,
    Path((id, uid)): Path<(String, String)>,
) -> Result<Json<HandResponse>, AppError> {
    let cards = state.games.get_hand(&id, &uid).await?;
    let game = state.games.get_game(&id).await?;

    let playable = legal_cards(&cards, game.trick_suit);
    Ok(Json(HandResponse { cards, playable }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::online::models::GameStatus;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::shared::AppState;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        Router::new().nest("/games", router()).with_state(state)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_create_game_handler() {
        let app = app(AppStateBuilder::new().build());

        let response = app
            .oneshot(post_json(
                "/games",
                r#"{"uid": "u1", "displayName": "Ann", "photoURL": null, "isPrivate": true}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let game: OnlineGame = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(game.host_id, "u1");
        assert_eq!(game.players[0].name, "Ann");
        assert_eq!(game.settings.winning_score, 50);
        assert!(game.settings.is_private);
    }

    #[tokio::test]
    async fn test_unknown_game_is_not_found() {
        let app = app(AppStateBuilder::new().build());
        let response = app.oneshot(get("/games/no-such-game")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_full_table_rejects_fifth_player() {
        let state = AppStateBuilder::new().build();
        let game = state
            .games
            .create_game(&PlayerInfo::new("p0", "Ann"), true, 50)
            .await
            .unwrap();
        for n in 1..4 {
            state
                .games
                .join_game(&game.id, &PlayerInfo::new(format!("p{}", n), "x"))
                .await
                .unwrap();
        }

        let response = app(state)
            .oneshot(post_json(
                &format!("/games/{}/join", game.id),
                r#"{"uid": "p4"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"], "Game is full");
    }

    #[tokio::test]
    async fn test_start_and_read_hand() {
        let state = AppStateBuilder::new().build();
        let game = state
            .games
            .create_game(&PlayerInfo::new("p0", "Ann"), false, 50)
            .await
            .unwrap();
        for n in 1..4 {
            state
                .games
                .join_game(&game.id, &PlayerInfo::new(format!("p{}", n), "x"))
                .await
                .unwrap();
        }
        let app = app(state.clone());

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/games/{}/start", game.id),
                r#"{"uid": "p1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/games/{}/start", game.id),
                r#"{"uid": "p0"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let started: OnlineGame = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(started.status, GameStatus::Playing);

        let response = app
            .oneshot(get(&format!("/games/{}/hands/p0", game.id)))
            .await
            .unwrap();
        let hand: HandResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(hand.cards.len(), 13);
        // Leading a trick: every card is playable
        assert_eq!(hand.playable, hand.cards);

        state.lifecycle.shutdown().await;
    }

    #[tokio::test]
    async fn test_play_out_of_turn_is_rule_violation() {
        let state = AppStateBuilder::new().build();
        let game = state
            .games
            .create_game(&PlayerInfo::new("p0", "Ann"), true, 50)
            .await
            .unwrap();
        for n in 1..4 {
            state
                .games
                .join_game(&game.id, &PlayerInfo::new(format!("p{}", n), "x"))
                .await
                .unwrap();
        }
        state.games.start_game(&game.id, "p0").await.unwrap();
        let card = state.games.get_hand(&game.id, "p1").await.unwrap()[0];

        let body = serde_json::json!({ "uid": "p1", "card": card }).to_string();
        let response = app(state)
            .oneshot(post_json(&format!("/games/{}/play", game.id), &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["kind"], "rule_violation");
    }

    #[tokio::test]
    async fn test_next_trick_outside_trick_scoring_is_noop() {
        let state = AppStateBuilder::new().build();
        let game = state
            .games
            .create_game(&PlayerInfo::new("p0", "Ann"), true, 50)
            .await
            .unwrap();

        let response = app(state)
            .oneshot(post_json(&format!("/games/{}/next-trick", game.id), ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["advanced"], false);
        assert_eq!(body["game"]["status"], "waiting");
    }
}
