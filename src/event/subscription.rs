use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{
    bus::EventBus,
    events::GameEvent,
    handler::{GameEventError, GameEventHandler},
};

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// What the receiver handed us: an event, or word that some were dropped
enum Delivery {
    Event(GameEvent),
    Lagged,
}

/// Routes one game's events to a handler on a background task
pub struct GameSubscription {
    game_id: String,
    handler: Arc<dyn GameEventHandler>,
    event_bus: EventBus,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl GameSubscription {
    pub fn new(game_id: String, handler: Arc<dyn GameEventHandler>, event_bus: EventBus) -> Self {
        Self {
            game_id,
            handler,
            event_bus,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Retryable handler failures are retried up to `max_attempts` times in
    /// all, waiting `backoff`, then twice that, and so on between attempts
    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_backoff = backoff;
        self
    }

    /// Subscribes, then spawns the task that feeds events to the handler.
    /// Events committed after this returns are guaranteed to be seen.
    pub async fn start(self) -> JoinHandle<()> {
        let game_id = self.game_id.clone();
        let handler_name = self.handler.handler_name();

        info!(
            game_id = %game_id,
            handler = handler_name,
            "Starting game subscription"
        );

        let mut receiver = self.event_bus.subscribe(&game_id).await;

        tokio::spawn(async move {
            loop {
                let delivery = match receiver.recv().await {
                    Ok(event) => {
                        debug!(
                            game_id = %game_id,
                            handler = handler_name,
                            event_type = event.event_type(),
                            "Received game event"
                        );
                        Delivery::Event(event)
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Skipped events may have been the ones the handler
                        // acts on, so it catches up from the stored game
                        warn!(
                            game_id = %game_id,
                            handler = handler_name,
                            skipped,
                            "Game subscription lagged"
                        );
                        Delivery::Lagged
                    }
                    Err(RecvError::Closed) => break,
                };

                self.deliver(&delivery).await;
            }

            info!(
                game_id = %game_id,
                handler = handler_name,
                "Game subscription ended"
            );
        })
    }

    async fn dispatch(&self, delivery: &Delivery) -> Result<(), GameEventError> {
        match delivery {
            Delivery::Event(event) => self.handler.handle_game_event(event).await,
            Delivery::Lagged => self.handler.handle_lag(&self.game_id).await,
        }
    }

    async fn deliver(&self, delivery: &Delivery) {
        let handler_name = self.handler.handler_name();
        let mut attempt = 1;

        loop {
            let error = match self.dispatch(delivery).await {
                Ok(()) => return,
                Err(e) => e,
            };

            if !error.is_retryable() || attempt >= self.max_attempts {
                warn!(
                    game_id = %self.game_id,
                    handler = handler_name,
                    error = %error,
                    retryable = error.is_retryable(),
                    attempt,
                    "Game event handler failed"
                );
                return;
            }

            let delay = self.retry_backoff * 2u32.saturating_pow(attempt - 1);
            warn!(
                game_id = %self.game_id,
                handler = handler_name,
                error = %error,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Game event handler failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
