use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{Hand, LobbyEntry, OnlineGame, SEATS};
use crate::shared::StoreError;

/// Everything stored for one table: the shared game, each player's private
/// hand and the public lobby listing. Versioned as a unit so a join, a deal
/// or a play commits all of its parts or none of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDocument {
    pub version: u64,
    pub game: OnlineGame,
    /// Private hands keyed by player uid
    pub hands: HashMap<String, Hand>,
    /// Present while a public table is taking players
    pub lobby: Option<LobbyEntry>,
}

impl GameDocument {
    /// Version 0 document for a newly created table
    pub fn new(game: OnlineGame) -> Self {
        let lobby = game.is_open_to_public().then(|| LobbyEntry::for_game(&game));
        Self {
            version: 0,
            game,
            hands: HashMap::new(),
            lobby,
        }
    }
}

/// Versioned storage of game documents
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Stores a new document, failing if the id is taken
    async fn create(&self, doc: GameDocument) -> Result<(), StoreError>;

    async fn get(&self, game_id: &str) -> Result<Option<GameDocument>, StoreError>;

    /// Replaces the stored document only if it is still at `doc.version`.
    /// Returns the new version.
    async fn commit(&self, doc: GameDocument) -> Result<u64, StoreError>;

    /// Public tables with open seats, oldest first
    async fn open_lobbies(&self) -> Result<Vec<LobbyEntry>, StoreError>;
}

#[derive(Debug, Default)]
struct Documents {
    by_id: HashMap<String, GameDocument>,
    /// Creation order, for stable lobby listing
    order: Vec<String>,
}

/// In-memory implementation of GameRepository
#[derive(Debug, Default)]
pub struct InMemoryGameRepository {
    documents: RwLock<Documents>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    #[instrument(skip(self, doc), fields(game_id = %doc.game.id))]
    async fn create(&self, doc: GameDocument) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let game_id = doc.game.id.clone();
        if documents.by_id.contains_key(&game_id) {
            warn!("Game document already exists");
            return Err(StoreError::AlreadyExists(game_id));
        }

        documents.by_id.insert(game_id.clone(), doc);
        documents.order.push(game_id);
        debug!("Game document created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, game_id: &str) -> Result<Option<GameDocument>, StoreError> {
        let documents = self.documents.read().await;
        let doc = documents.by_id.get(game_id).cloned();
        debug!(found = doc.is_some(), "Fetched game document");
        Ok(doc)
    }

    #[instrument(skip(self, doc), fields(game_id = %doc.game.id, version = doc.version))]
    async fn commit(&self, mut doc: GameDocument) -> Result<u64, StoreError> {
        let mut documents = self.documents.write().await;
        let stored = documents
            .by_id
            .get_mut(&doc.game.id)
            .ok_or_else(|| StoreError::NotFound(doc.game.id.clone()))?;

        if stored.version != doc.version {
            debug!(stored_version = stored.version, "Stale write rejected");
            return Err(StoreError::Conflict {
                expected: doc.version,
                actual: stored.version,
            });
        }

        doc.version += 1;
        let version = doc.version;
        *stored = doc;
        debug!(new_version = version, "Game document committed");
        Ok(version)
    }

    async fn open_lobbies(&self) -> Result<Vec<LobbyEntry>, StoreError> {
        let documents = self.documents.read().await;
        let lobbies: Vec<LobbyEntry> = documents
            .order
            .iter()
            .filter_map(|id| documents.by_id.get(id))
            .filter_map(|doc| doc.lobby.clone())
            .filter(|entry| entry.player_count < SEATS as usize)
            .collect();
        debug!(count = lobbies.len(), "Listed open lobbies");
        Ok(lobbies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::online::models::{GameSettings, PlayerInfo};

    fn doc(id: &str, is_private: bool) -> GameDocument {
        GameDocument::new(OnlineGame::new(
            id.to_string(),
            &PlayerInfo::new("host", "Ann"),
            GameSettings {
                is_private,
                winning_score: 50,
            },
        ))
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_ids() {
        let repo = InMemoryGameRepository::new();
        repo.create(doc("g1", true)).await.unwrap();

        let err = repo.create(doc("g1", true)).await.unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists("g1".to_string()));
    }

    #[tokio::test]
    async fn test_commit_bumps_version() {
        let repo = InMemoryGameRepository::new();
        repo.create(doc("g1", true)).await.unwrap();

        let mut current = repo.get("g1").await.unwrap().unwrap();
        current.game.current_trick = 2;
        assert_eq!(repo.commit(current).await.unwrap(), 1);

        let stored = repo.get("g1").await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.game.current_trick, 2);
    }

    #[tokio::test]
    async fn test_stale_commit_is_rejected() {
        let repo = InMemoryGameRepository::new();
        repo.create(doc("g1", true)).await.unwrap();

        let first = repo.get("g1").await.unwrap().unwrap();
        let second = first.clone();
        repo.commit(first).await.unwrap();

        let err = repo.commit(second).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict {
                expected: 0,
                actual: 1
            }
        );
    }

    #[tokio::test]
    async fn test_commit_unknown_game() {
        let repo = InMemoryGameRepository::new();
        let err = repo.commit(doc("ghost", true)).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("ghost".to_string()));
    }

    #[tokio::test]
    async fn test_only_public_tables_are_listed() {
        let repo = InMemoryGameRepository::new();
        repo.create(doc("public-1", false)).await.unwrap();
        repo.create(doc("private", true)).await.unwrap();
        repo.create(doc("public-2", false)).await.unwrap();

        let ids: Vec<String> = repo
            .open_lobbies()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.game_id)
            .collect();
        assert_eq!(ids, vec!["public-1", "public-2"]);
    }
}
