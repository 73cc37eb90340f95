#![allow(dead_code)] // Test utilities may not all be used in every test

use tokio::time::{sleep, timeout, Duration};

use callbridge::{
    online::{GameStatus, Hand, OnlineGame, PlayResult},
    Card, GameError,
};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    pub fn host(&self) -> &str {
        &self.players[0]
    }

    pub fn uid_at(&self, seat: u8) -> &str {
        &self.players[seat as usize]
    }

    pub async fn game(&self) -> OnlineGame {
        self.games.get_game(&self.game_id).await.unwrap()
    }

    pub async fn hand_of(&self, seat: u8) -> Hand {
        self.games
            .get_hand(&self.game_id, self.uid_at(seat))
            .await
            .unwrap()
    }

    /// Starts without trick pacing; tests drive `start_next_trick` themselves
    pub async fn start_with(&self, hands: Vec<Hand>) -> OnlineGame {
        self.games
            .start_game_with_hands(&self.game_id, self.host(), hands)
            .await
            .unwrap()
    }

    /// Starts through the lifecycle controller, which paces tricks
    pub async fn start_paced(&self, hands: Vec<Hand>) -> OnlineGame {
        self.lifecycle
            .start_game_with_hands(&self.game_id, self.host(), hands)
            .await
            .unwrap()
    }

    pub async fn play(&self, seat: u8, card: Card) -> Result<PlayResult, GameError> {
        self.games
            .play_card(&self.game_id, self.uid_at(seat), card)
            .await
    }

    /// Plays one full trick starting from whoever is to lead. `by_seat[s]`
    /// is the card seat `s` plays.
    pub async fn play_trick(&self, by_seat: [Card; 4]) -> PlayResult {
        let lead = self.game().await.current_turn_seat;
        let mut last = None;
        for offset in 0..4u8 {
            let seat = (lead + offset) % 4;
            last = Some(self.play(seat, by_seat[seat as usize]).await.unwrap());
        }
        last.unwrap()
    }

    /// Polls until the game satisfies `check`, failing the test after a second
    pub async fn wait_for<F>(&self, check: F) -> OnlineGame
    where
        F: Fn(&OnlineGame) -> bool,
    {
        timeout(Duration::from_secs(1), async {
            loop {
                let game = self.game().await;
                if check(&game) {
                    return game;
                }
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("game never reached the expected state")
    }

    pub async fn wait_for_status(&self, status: GameStatus) -> OnlineGame {
        self.wait_for(|game| game.status == status).await
    }
}
