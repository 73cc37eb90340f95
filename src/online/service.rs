use petname::Petnames;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use super::{
    errors::GameError,
    lifecycle,
    models::{GameSettings, Hand, OnlineGame, PlayerInfo},
    repository::{GameDocument, GameRepository},
    seating::{self, SeatAssignment},
    trick::{self, NextTrick, PlayOutcome},
};
use crate::cards::Card;
use crate::event::{EventBus, GameEvent};
use crate::shared::StoreError;

/// What a transaction step decided to do with its working copy
pub enum Txn<T> {
    /// Write the working copy back
    Commit(T),
    /// Nothing to write; the stored document stays as it is
    Unchanged(T),
}

struct Applied<T> {
    value: T,
    /// The game as stored once the transaction finished
    game: OnlineGame,
    /// Document version of `game`
    version: u64,
    committed: bool,
}

#[derive(Debug, Clone)]
pub struct JoinedGame {
    pub game: OnlineGame,
    pub assignment: SeatAssignment,
}

#[derive(Debug, Clone)]
pub struct PlayResult {
    pub game: OnlineGame,
    pub outcome: PlayOutcome,
}

/// Online table operations. Each mutation is one optimistic transaction
/// over the game document, and every commit is announced on the event bus.
#[derive(Clone)]
pub struct GameService {
    repository: Arc<dyn GameRepository>,
    event_bus: EventBus,
    max_attempts: u32,
}

fn generate_game_id() -> String {
    Petnames::default().generate_one(2, "-")
}

fn validate_player(player: &PlayerInfo) -> Result<(), GameError> {
    if player.uid.trim().is_empty() {
        return Err(GameError::InvalidRequest("player uid cannot be empty".to_string()));
    }
    Ok(())
}

impl GameService {
    pub fn new(repository: Arc<dyn GameRepository>, event_bus: EventBus, max_attempts: u32) -> Self {
        Self {
            repository,
            event_bus,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Opens a table with the host in seat 0. Public tables are listed in
    /// the lobby until they start.
    #[instrument(skip(self, host), fields(host_uid = %host.uid))]
    pub async fn create_game(
        &self,
        host: &PlayerInfo,
        is_private: bool,
        winning_score: i32,
    ) -> Result<OnlineGame, GameError> {
        validate_player(host)?;
        if winning_score <= 0 {
            return Err(GameError::InvalidRequest(format!(
                "winning score must be positive, got {}",
                winning_score
            )));
        }

        let settings = GameSettings {
            is_private,
            winning_score,
        };

        for attempt in 1..=self.max_attempts {
            let game = OnlineGame::new(generate_game_id(), host, settings.clone());
            match self.repository.create(GameDocument::new(game.clone())).await {
                Ok(()) => {
                    info!(game_id = %game.id, is_private, "Game created");
                    self.event_bus
                        .emit(GameEvent::GameCreated {
                            game: game.clone(),
                            version: 0,
                        })
                        .await;
                    return Ok(game);
                }
                Err(StoreError::AlreadyExists(id)) => {
                    warn!(game_id = %id, attempt, "Generated game id already taken");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(GameError::Conflict {
            attempts: self.max_attempts,
        })
    }

    #[instrument(skip(self, player), fields(uid = %player.uid))]
    pub async fn join_game(
        &self,
        game_id: &str,
        player: &PlayerInfo,
    ) -> Result<JoinedGame, GameError> {
        validate_player(player)?;

        let applied = self
            .transact(game_id, |doc| {
                let assignment = seating::assign_seat(&mut doc.game, player)?;
                if let SeatAssignment::AlreadySeated(_) = assignment {
                    return Ok(Txn::Unchanged(assignment));
                }
                let player_count = doc.game.players.len();
                if let Some(lobby) = doc.lobby.as_mut() {
                    lobby.player_count = player_count;
                }
                Ok(Txn::Commit(assignment))
            })
            .await?;

        if applied.committed {
            info!(
                game_id = %game_id,
                seat = applied.value.seat(),
                "Player joined game"
            );
            self.event_bus
                .emit(GameEvent::PlayerJoined {
                    game: applied.game.clone(),
                    version: applied.version,
                    uid: player.uid.clone(),
                    seat: applied.value.seat(),
                })
                .await;
        }

        Ok(JoinedGame {
            game: applied.game,
            assignment: applied.value,
        })
    }

    /// Joins the oldest public table with a free seat, or opens a new public
    /// table when there is none
    #[instrument(skip(self, player), fields(uid = %player.uid))]
    pub async fn find_and_join_public_game(
        &self,
        player: &PlayerInfo,
        winning_score: i32,
    ) -> Result<OnlineGame, GameError> {
        validate_player(player)?;

        for entry in self.repository.open_lobbies().await? {
            match self.join_game(&entry.game_id, player).await {
                Ok(joined) => return Ok(joined.game),
                // Filled or started since it was listed
                Err(GameError::GameFull | GameError::AlreadyStarted | GameError::NotFound(_)) => {
                    debug!(game_id = %entry.game_id, "Lobby entry went stale, trying next");
                }
                Err(e) => return Err(e),
            }
        }

        info!("No open public game, creating one");
        self.create_game(player, false, winning_score).await
    }

    /// Host deals a freshly shuffled deck and starts play
    pub async fn start_game(&self, game_id: &str, caller_uid: &str) -> Result<OnlineGame, GameError> {
        let hands = seating::deal_hands(&mut rand::rng());
        self.start_game_with_hands(game_id, caller_uid, hands).await
    }

    /// Starts play with predetermined hands, indexed by seat
    #[instrument(skip(self, hands))]
    pub async fn start_game_with_hands(
        &self,
        game_id: &str,
        caller_uid: &str,
        hands: Vec<Hand>,
    ) -> Result<OnlineGame, GameError> {
        seating::validate_deal(&hands)?;

        let applied = self
            .transact(game_id, |doc| {
                seating::ensure_can_start(&doc.game, caller_uid)?;
                doc.hands = seating::begin_play(&mut doc.game, hands.clone())?;
                doc.lobby = None;
                Ok(Txn::Commit(()))
            })
            .await?;

        info!(game_id = %game_id, "Game started");
        self.event_bus
            .emit(GameEvent::GameStarted {
                game: applied.game.clone(),
                version: applied.version,
            })
            .await;
        Ok(applied.game)
    }

    #[instrument(skip(self, card), fields(card = %card))]
    pub async fn play_card(
        &self,
        game_id: &str,
        uid: &str,
        card: Card,
    ) -> Result<PlayResult, GameError> {
        let applied = self
            .transact(game_id, |doc| {
                let GameDocument { game, hands, .. } = doc;
                let mut no_hand = Hand::new();
                let hand = hands.get_mut(uid).unwrap_or(&mut no_hand);
                let outcome = trick::play_card(game, hand, uid, card)?;
                Ok(Txn::Commit(outcome))
            })
            .await?;

        let game = applied.game;
        let version = applied.version;
        let seat = game.player(uid).map(|p| p.seat).unwrap_or_default();
        info!(game_id = %game_id, seat, card = %card, "Card played");
        self.event_bus
            .emit(GameEvent::CardPlayed {
                game: game.clone(),
                version,
                seat,
                card,
            })
            .await;

        if let PlayOutcome::TrickComplete { winner_seat } = applied.value {
            info!(
                game_id = %game_id,
                trick = game.current_trick,
                winner_seat,
                "Trick completed"
            );
            self.event_bus
                .emit(GameEvent::TrickCompleted {
                    game: game.clone(),
                    version,
                    winner_seat,
                })
                .await;
        }

        Ok(PlayResult {
            game,
            outcome: applied.value,
        })
    }

    /// Moves past a scored trick. Duplicate calls are harmless: only the
    /// first one finds the game in `trick_scoring`.
    #[instrument(skip(self))]
    pub async fn start_next_trick(
        &self,
        game_id: &str,
    ) -> Result<(OnlineGame, NextTrick), GameError> {
        let applied = self
            .transact(game_id, |doc| match trick::start_next_trick(&mut doc.game) {
                NextTrick::Skipped => Ok(Txn::Unchanged(NextTrick::Skipped)),
                next => Ok(Txn::Commit(next)),
            })
            .await?;

        if !applied.committed {
            debug!(game_id = %game_id, status = %applied.game.status, "Next trick already started");
            return Ok((applied.game, applied.value));
        }

        let event = match applied.value {
            NextTrick::RoundComplete => {
                info!(game_id = %game_id, "Round complete");
                GameEvent::RoundCompleted {
                    game: applied.game.clone(),
                    version: applied.version,
                }
            }
            _ => {
                debug!(game_id = %game_id, trick = applied.game.current_trick, "Trick started");
                GameEvent::TrickStarted {
                    game: applied.game.clone(),
                    version: applied.version,
                }
            }
        };
        self.event_bus.emit(event).await;

        Ok((applied.game, applied.value))
    }

    pub async fn get_game(&self, game_id: &str) -> Result<OnlineGame, GameError> {
        Ok(self.load(game_id).await?.game)
    }

    /// A seated player's current hand; empty before the deal
    pub async fn get_hand(&self, game_id: &str, uid: &str) -> Result<Hand, GameError> {
        let doc = self.load(game_id).await?;
        if doc.game.player(uid).is_none() {
            return Err(GameError::NotSeated(uid.to_string()));
        }
        Ok(doc.hands.get(uid).cloned().unwrap_or_default())
    }

    pub async fn subscribe(&self, game_id: &str) -> broadcast::Receiver<GameEvent> {
        self.event_bus.subscribe(game_id).await
    }

    async fn load(&self, game_id: &str) -> Result<GameDocument, GameError> {
        self.repository
            .get(game_id)
            .await?
            .ok_or_else(|| GameError::NotFound(game_id.to_string()))
    }

    /// Read, apply, compare-and-swap. A step that fails leaves the stored
    /// document untouched; a lost race re-reads and re-applies the step.
    async fn transact<T, F>(&self, game_id: &str, mut step: F) -> Result<Applied<T>, GameError>
    where
        F: FnMut(&mut GameDocument) -> Result<Txn<T>, GameError> + Send,
        T: Send,
    {
        for attempt in 1..=self.max_attempts {
            let current = self.load(game_id).await?;
            let mut working = current.clone();

            let decision = step(&mut working).map_err(|e| {
                warn!(game_id = %game_id, error = %e, "Rejected game action");
                e
            })?;

            match decision {
                Txn::Unchanged(value) => {
                    return Ok(Applied {
                        value,
                        game: current.game,
                        version: current.version,
                        committed: false,
                    })
                }
                Txn::Commit(value) => {
                    lifecycle::ensure_transition(current.game.status, working.game.status)?;
                    let game = working.game.clone();
                    match self.repository.commit(working).await {
                        Ok(version) => {
                            debug!(game_id = %game_id, version, attempt, "Transaction committed");
                            return Ok(Applied {
                                value,
                                game,
                                version,
                                committed: true,
                            });
                        }
                        Err(StoreError::Conflict { expected, actual }) => {
                            warn!(
                                game_id = %game_id,
                                attempt,
                                expected,
                                actual,
                                "Concurrent update, retrying"
                            );
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }

        warn!(game_id = %game_id, attempts = self.max_attempts, "Transaction abandoned");
        Err(GameError::Conflict {
            attempts: self.max_attempts,
        })
    }
}
