use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use super::{
    errors::ScoringError,
    history::HistoryRepository,
    models::{ArchivedSheet, Outcome, ScoreSheet},
    store::LocalStore,
};
use crate::shared::{AppError, StoreError};

/// Hosts independent offline score sheets, one per session, and keeps each
/// one mirrored in the local store while it is in play.
pub struct ScoringService {
    local_store: Arc<dyn LocalStore>,
    history: Arc<dyn HistoryRepository>,
    sessions: RwLock<HashMap<String, ScoreSheet>>,
}

fn storage_key(session_id: &str) -> String {
    format!("scoresheet:{}", session_id)
}

impl ScoringService {
    pub fn new(local_store: Arc<dyn LocalStore>, history: Arc<dyn HistoryRepository>) -> Self {
        Self {
            local_store,
            history,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Current sheet for a session, restoring a saved one if the session has
    /// not been seen since startup
    #[instrument(skip(self))]
    pub async fn load(&self, session_id: &str) -> Result<ScoreSheet, AppError> {
        if let Some(sheet) = self.sessions.read().await.get(session_id) {
            return Ok(sheet.clone());
        }

        let mut sessions = self.sessions.write().await;
        let sheet = self.restore(&mut sessions, session_id).await?;
        Ok(sheet.clone())
    }

    #[instrument(skip(self, names))]
    pub async fn start_game(
        &self,
        session_id: &str,
        names: &[String],
        winning_score: i32,
        tag: Option<String>,
    ) -> Result<ScoreSheet, AppError> {
        let sheet = ScoreSheet::start(names, winning_score, tag)?;
        info!(session_id = %session_id, sheet_id = %sheet.id, winning_score, "Starting score sheet");

        let mut sessions = self.sessions.write().await;
        self.persist(session_id, &sheet).await?;
        sessions.insert(session_id.to_string(), sheet.clone());
        Ok(sheet)
    }

    pub async fn submit_calls(
        &self,
        session_id: &str,
        calls: &[u32],
    ) -> Result<ScoreSheet, AppError> {
        self.apply(session_id, |sheet| sheet.submit_calls(calls)).await
    }

    pub async fn submit_made(&self, session_id: &str, made: &[u32]) -> Result<ScoreSheet, AppError> {
        self.apply(session_id, |sheet| sheet.submit_made(made)).await
    }

    pub async fn submit_outcomes(
        &self,
        session_id: &str,
        outcomes: &[Outcome],
    ) -> Result<ScoreSheet, AppError> {
        self.apply(session_id, |sheet| sheet.submit_outcomes(outcomes))
            .await
    }

    #[instrument(skip(self))]
    pub async fn reset_game(&self, session_id: &str) -> Result<ScoreSheet, AppError> {
        let mut sessions = self.sessions.write().await;
        self.local_store.delete(&storage_key(session_id)).await?;

        let sheet = ScoreSheet::default();
        sessions.insert(session_id.to_string(), sheet.clone());
        info!(session_id = %session_id, "Score sheet reset");
        Ok(sheet)
    }

    pub async fn history(&self) -> Result<Vec<ArchivedSheet>, AppError> {
        Ok(self.history.list().await?)
    }

    /// Runs one reducer step against a copy of the sheet; the session only
    /// sees the new sheet once it has been persisted.
    #[instrument(skip(self, step))]
    async fn apply<F>(&self, session_id: &str, step: F) -> Result<ScoreSheet, AppError>
    where
        F: FnOnce(&mut ScoreSheet) -> Result<(), ScoringError> + Send,
    {
        let mut sessions = self.sessions.write().await;
        let mut sheet = self.restore(&mut sessions, session_id).await?.clone();

        if let Err(e) = step(&mut sheet) {
            warn!(session_id = %session_id, error = %e, "Rejected score sheet input");
            return Err(e.into());
        }

        self.persist(session_id, &sheet).await?;
        sessions.insert(session_id.to_string(), sheet.clone());
        info!(
            session_id = %session_id,
            round = sheet.round,
            phase = %sheet.phase,
            "Score sheet updated"
        );
        Ok(sheet)
    }

    async fn restore<'a>(
        &self,
        sessions: &'a mut HashMap<String, ScoreSheet>,
        session_id: &str,
    ) -> Result<&'a ScoreSheet, StoreError> {
        if !sessions.contains_key(session_id) {
            let saved = self.local_store.get(&storage_key(session_id)).await?;
            let sheet = match saved {
                Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                    warn!(session_id = %session_id, error = %e, "Discarding unreadable saved sheet");
                    ScoreSheet::default()
                }),
                None => ScoreSheet::default(),
            };
            sessions.insert(session_id.to_string(), sheet);
        }

        sessions
            .get(session_id)
            .ok_or_else(|| StoreError::Backend(format!("session {} vanished", session_id)))
    }

    /// Active sheets are saved; a finished sheet is archived and its local
    /// copy dropped.
    async fn persist(&self, session_id: &str, sheet: &ScoreSheet) -> Result<(), StoreError> {
        let key = storage_key(session_id);

        if sheet.is_finished() {
            let archived = ArchivedSheet::from_sheet(sheet, Utc::now());
            let doc_id = self.history.archive(archived).await?;
            info!(session_id = %session_id, doc_id = %doc_id, "Finished score sheet archived");
            return self.local_store.delete(&key).await;
        }

        if sheet.is_game_active {
            let json = serde_json::to_string(sheet)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            self.local_store.put(&key, json).await
        } else {
            self.local_store.delete(&key).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{
        history::InMemoryHistoryRepository, models::ScoringPhase, store::InMemoryLocalStore,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn names() -> Vec<String> {
        ["Ann", "Ben", "Cat", "Dan"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn service_with(
        store: Arc<InMemoryLocalStore>,
        history: Arc<InMemoryHistoryRepository>,
    ) -> ScoringService {
        ScoringService::new(store, history)
    }

    #[tokio::test]
    async fn test_unknown_session_loads_inactive_sheet() {
        let service = service_with(
            Arc::new(InMemoryLocalStore::new()),
            Arc::new(InMemoryHistoryRepository::new()),
        );

        let sheet = service.load("nobody").await.unwrap();
        assert_eq!(sheet, ScoreSheet::default());
    }

    #[tokio::test]
    async fn test_every_change_is_saved_and_restored() {
        let store = Arc::new(InMemoryLocalStore::new());
        let history = Arc::new(InMemoryHistoryRepository::new());

        let service = service_with(store.clone(), history.clone());
        service.start_game("t1", &names(), 50, None).await.unwrap();
        service.submit_made("t1", &[4, 3, 3, 3]).await.unwrap();

        let saved = store.get("scoresheet:t1").await.unwrap().unwrap();
        let saved: ScoreSheet = serde_json::from_str(&saved).unwrap();
        assert_eq!(saved.round, 2);

        // A fresh service (new process) picks the sheet back up
        let restarted = service_with(store, history);
        let sheet = restarted.load("t1").await.unwrap();
        assert_eq!(sheet.round, 2);
        assert_eq!(sheet.phase, ScoringPhase::Calling);
    }

    #[tokio::test]
    async fn test_rejected_input_leaves_session_untouched() {
        let store = Arc::new(InMemoryLocalStore::new());
        let service = service_with(store.clone(), Arc::new(InMemoryHistoryRepository::new()));
        service.start_game("t1", &names(), 50, None).await.unwrap();
        let before = service.load("t1").await.unwrap();

        let err = service.submit_made("t1", &[1, 1, 1, 1]).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Scoring(ScoringError::MadeTotalMismatch { total: 4 })
        ));
        assert_eq!(service.load("t1").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_finished_sheet_is_archived_and_local_copy_dropped() {
        let store = Arc::new(InMemoryLocalStore::new());
        let history = Arc::new(InMemoryHistoryRepository::new());
        let service = service_with(store.clone(), history.clone());

        service.start_game("t1", &names(), 13, Some("cup".into())).await.unwrap();
        let sheet = service.submit_made("t1", &[8, 2, 2, 1]).await.unwrap();

        assert!(sheet.is_finished());
        assert_eq!(store.get("scoresheet:t1").await.unwrap(), None);

        let archived = service.history().await.unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].id, sheet.id);
        assert_eq!(archived[0].tag.as_deref(), Some("cup"));
        assert_eq!(Some(archived[0].finished_at), sheet.finished_at);

        // The finished sheet is still shown for this session until reset
        assert!(service.load("t1").await.unwrap().is_finished());
    }

    /// Fails the first `failures` deletes
    struct FlakyDeleteStore {
        inner: InMemoryLocalStore,
        failures: AtomicU32,
    }

    #[async_trait]
    impl LocalStore for FlakyDeleteStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
            self.inner.put(key, value).await
        }

        async fn delete(&self, key: &str) -> Result<(), StoreError> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(StoreError::Backend("disk unavailable".to_string()));
            }
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn test_retried_finish_is_archived_once() {
        let store = Arc::new(FlakyDeleteStore {
            inner: InMemoryLocalStore::new(),
            failures: AtomicU32::new(1),
        });
        let history = Arc::new(InMemoryHistoryRepository::new());
        let service = ScoringService::new(store, history.clone());
        service.start_game("t1", &names(), 13, None).await.unwrap();

        let err = service.submit_made("t1", &[8, 2, 2, 1]).await.unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::Backend(_))));
        assert!(!service.load("t1").await.unwrap().is_finished());

        let sheet = service.submit_made("t1", &[8, 2, 2, 1]).await.unwrap();
        assert!(sheet.is_finished());

        let archived = history.list().await.unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].id, sheet.id);
    }

    #[tokio::test]
    async fn test_reset_clears_saved_copy() {
        let store = Arc::new(InMemoryLocalStore::new());
        let service = service_with(store.clone(), Arc::new(InMemoryHistoryRepository::new()));
        service.start_game("t1", &names(), 50, None).await.unwrap();
        assert!(store.get("scoresheet:t1").await.unwrap().is_some());

        let sheet = service.reset_game("t1").await.unwrap();
        assert!(!sheet.is_game_active);
        assert_eq!(store.get("scoresheet:t1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let service = service_with(
            Arc::new(InMemoryLocalStore::new()),
            Arc::new(InMemoryHistoryRepository::new()),
        );
        service.start_game("a", &names(), 50, None).await.unwrap();
        service.submit_made("a", &[4, 3, 3, 3]).await.unwrap();

        assert_eq!(service.load("a").await.unwrap().round, 2);
        assert!(!service.load("b").await.unwrap().is_game_active);
    }

    #[tokio::test]
    async fn test_unreadable_saved_sheet_is_discarded() {
        let store = Arc::new(InMemoryLocalStore::new());
        store
            .put("scoresheet:t1", "not json".to_string())
            .await
            .unwrap();
        let service = service_with(store, Arc::new(InMemoryHistoryRepository::new()));

        assert_eq!(service.load("t1").await.unwrap(), ScoreSheet::default());
    }
}
