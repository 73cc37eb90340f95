use std::sync::Arc;
use std::time::Duration;

use callbridge::{
    event::EventBus,
    online::{GameService, InMemoryGameRepository, LifecycleController, PlayerInfo},
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub games: GameService,
    pub lifecycle: Arc<LifecycleController>,
    pub game_id: String,
    /// Player uids, index = seat
    pub players: Vec<String>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    is_private: bool,
    trick_pause: Duration,
    max_attempts: u32,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            is_private: true,
            trick_pause: Duration::from_millis(20),
            max_attempts: 5,
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_four_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie", "david"])
    }

    pub fn public(mut self) -> Self {
        self.is_private = false;
        self
    }

    pub fn with_trick_pause(mut self, pause: Duration) -> Self {
        self.trick_pause = pause;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Creates the game hosted by the first player and seats the rest in order
    pub async fn build(self) -> TestSetup {
        let games = GameService::new(
            Arc::new(InMemoryGameRepository::new()),
            EventBus::new(64),
            self.max_attempts,
        );
        let lifecycle = Arc::new(LifecycleController::new(games.clone(), self.trick_pause));

        let host = self
            .players
            .first()
            .cloned()
            .unwrap_or_else(|| "host".to_string());
        let game = games
            .create_game(&PlayerInfo::new(host.clone(), host.clone()), self.is_private, 50)
            .await
            .unwrap();

        let mut players = vec![host];
        for uid in self.players.iter().skip(1) {
            games
                .join_game(&game.id, &PlayerInfo::new(uid.clone(), uid.clone()))
                .await
                .unwrap();
            players.push(uid.clone());
        }

        TestSetup {
            games,
            lifecycle,
            game_id: game.id,
            players,
        }
    }
}
