use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use super::{
    errors::GameError,
    models::{GameStatus, Hand, OnlineGame},
    service::GameService,
};
use crate::event::{GameEvent, GameEventError, GameEventHandler, GameSubscription};

/// Status changes a single commit may make. Anything else means a step
/// produced a state the table can never legally be in.
pub fn ensure_transition(from: GameStatus, to: GameStatus) -> Result<(), GameError> {
    use GameStatus::*;

    let allowed = from == to
        || matches!(
            (from, to),
            (Waiting, Playing)
                | (Playing, TrickScoring)
                | (TrickScoring, Playing)
                | (TrickScoring, RoundScoring)
                | (RoundScoring, Calling)
                | (RoundScoring, Finished)
                | (Calling, Playing)
        );

    if allowed {
        Ok(())
    } else {
        Err(GameError::InvalidPhase(from))
    }
}

/// Starts the next trick a fixed pause after each completed one, and lets
/// go of the game once its round is over
pub struct TrickPacer {
    games: GameService,
    pause: Duration,
}

impl TrickPacer {
    pub fn new(games: GameService, pause: Duration) -> Self {
        Self { games, pause }
    }

    async fn advance_after_pause(&self, game_id: &str) -> Result<(), GameEventError> {
        debug!(
            game_id = %game_id,
            pause_ms = self.pause.as_millis() as u64,
            "Pausing before next trick"
        );
        tokio::time::sleep(self.pause).await;

        self.games
            .start_next_trick(game_id)
            .await
            .map(|_| ())
            .map_err(pacing_error)
    }

    async fn release(&self, game_id: &str) {
        info!(game_id = %game_id, "Round over, closing game channel");
        self.games.event_bus().close_game(game_id).await;
    }
}

/// Store trouble and lost races may clear up on a later attempt
fn pacing_error(e: GameError) -> GameEventError {
    match e {
        GameError::Conflict { .. } | GameError::Storage(_) => {
            GameEventError::retryable(e.to_string())
        }
        _ => GameEventError::non_retryable(e.to_string()),
    }
}

#[async_trait]
impl GameEventHandler for TrickPacer {
    async fn handle_game_event(&self, event: &GameEvent) -> Result<(), GameEventError> {
        match event {
            GameEvent::TrickCompleted {
                game, winner_seat, ..
            } => {
                debug!(game_id = %game.id, winner_seat, "Trick completed");
                self.advance_after_pause(&game.id).await
            }
            GameEvent::RoundCompleted { game, .. } => {
                self.release(&game.id).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// A dropped `TrickCompleted` or `RoundCompleted` would otherwise stall
    /// the table, so act on whatever state the game is in now
    async fn handle_lag(&self, game_id: &str) -> Result<(), GameEventError> {
        let game = self.games.get_game(game_id).await.map_err(pacing_error)?;
        match game.status {
            GameStatus::TrickScoring => self.advance_after_pause(game_id).await,
            GameStatus::RoundScoring => {
                self.release(game_id).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handler_name(&self) -> &'static str {
        "TrickPacer"
    }
}

/// Owns the background pacing task of every game it has started
pub struct LifecycleController {
    games: GameService,
    trick_pause: Duration,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl LifecycleController {
    pub fn new(games: GameService, trick_pause: Duration) -> Self {
        Self {
            games,
            trick_pause,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Starts pacing a game. Returns false if it was already being paced.
    #[instrument(skip(self))]
    pub async fn watch(&self, game_id: &str) -> bool {
        let mut tasks = self.tasks.lock().await;
        tasks.retain(|_, handle| !handle.is_finished());
        if tasks.contains_key(game_id) {
            return false;
        }

        let pacer = Arc::new(TrickPacer::new(self.games.clone(), self.trick_pause));
        let handle = GameSubscription::new(
            game_id.to_string(),
            pacer,
            self.games.event_bus().clone(),
        )
        .start()
        .await;
        tasks.insert(game_id.to_string(), handle);
        true
    }

    /// Stops pacing a game
    pub async fn unwatch(&self, game_id: &str) {
        if let Some(handle) = self.tasks.lock().await.remove(game_id) {
            handle.abort();
            debug!(game_id = %game_id, "Stopped pacing game");
        }
    }

    /// Deals and starts a game, pacing its tricks from then on
    pub async fn start_game(&self, game_id: &str, caller_uid: &str) -> Result<OnlineGame, GameError> {
        // Subscribe before the deal so no trick completion can be missed
        let newly_watched = self.watch(game_id).await;
        let result = self.games.start_game(game_id, caller_uid).await;
        self.settle(game_id, newly_watched, result).await
    }

    /// Like `start_game`, with predetermined hands indexed by seat
    pub async fn start_game_with_hands(
        &self,
        game_id: &str,
        caller_uid: &str,
        hands: Vec<Hand>,
    ) -> Result<OnlineGame, GameError> {
        let newly_watched = self.watch(game_id).await;
        let result = self
            .games
            .start_game_with_hands(game_id, caller_uid, hands)
            .await;
        self.settle(game_id, newly_watched, result).await
    }

    /// Number of games with a live pacing task
    pub async fn active_games(&self) -> usize {
        let tasks = self.tasks.lock().await;
        tasks.values().filter(|handle| !handle.is_finished()).count()
    }

    /// Stops every pacing task and waits for them to wind down
    pub async fn shutdown(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut tasks = self.tasks.lock().await;
            tasks.drain().map(|(_, handle)| handle).collect()
        };

        info!(tasks = handles.len(), "Shutting down game lifecycle tasks");
        for handle in &handles {
            handle.abort();
        }
        join_all(handles).await;
    }

    async fn settle(
        &self,
        game_id: &str,
        newly_watched: bool,
        result: Result<OnlineGame, GameError>,
    ) -> Result<OnlineGame, GameError> {
        if result.is_err() && newly_watched {
            self.unwatch(game_id).await;
        }
        result
    }
}
