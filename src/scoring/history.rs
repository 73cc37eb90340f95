use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::models::ArchivedSheet;
use crate::shared::StoreError;

/// Shared collection of finished score sheets
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Stores a finished sheet under its own id and returns that id.
    /// Archiving the same sheet again replaces the earlier copy.
    async fn archive(&self, sheet: ArchivedSheet) -> Result<String, StoreError>;

    /// All archived sheets, most recently finished first
    async fn list(&self) -> Result<Vec<ArchivedSheet>, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryHistoryRepository {
    sheets: RwLock<HashMap<String, ArchivedSheet>>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn archive(&self, sheet: ArchivedSheet) -> Result<String, StoreError> {
        let doc_id = sheet.id.clone();
        let mut sheets = self.sheets.write().await;
        match sheets.insert(doc_id.clone(), sheet) {
            Some(_) => debug!(doc_id = %doc_id, "Replaced archived score sheet"),
            None => info!(doc_id = %doc_id, "Archiving finished score sheet"),
        }
        Ok(doc_id)
    }

    async fn list(&self) -> Result<Vec<ArchivedSheet>, StoreError> {
        let sheets = self.sheets.read().await;
        let mut list: Vec<ArchivedSheet> = sheets.values().cloned().collect();
        list.sort_by(|a, b| b.finished_at.cmp(&a.finished_at));
        debug!(count = list.len(), "Listed archived score sheets");
        Ok(list)
    }
}
