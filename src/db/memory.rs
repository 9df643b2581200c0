use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::models::DocumentRecord;
use crate::db::repository::DocumentRepository;
use crate::error::AppError;
use crate::search::filter::SearchFilter;
use crate::search::suggest::{collect_candidates, merge_suggestions, SuggestionSource};

/// Process-local repository. Records are lost on restart.
#[derive(Default)]
pub struct InMemoryDocumentRepository {
    records: RwLock<Vec<DocumentRecord>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records sorted newest first; among equal timestamps the later insert wins.
    async fn newest_first(&self) -> Vec<DocumentRecord> {
        let mut records: Vec<DocumentRecord> =
            self.records.read().await.iter().rev().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert(&self, record: DocumentRecord) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(AppError::Database(format!(
                "duplicate document id '{}'",
                record.id
            )));
        }
        records.push(record);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<DocumentRecord>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn list_recent(&self) -> Result<Vec<DocumentRecord>, AppError> {
        Ok(self.newest_first().await)
    }

    async fn search(
        &self,
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<DocumentRecord>, AppError> {
        Ok(self
            .newest_first()
            .await
            .into_iter()
            .filter(|r| filter.matches(&r.data))
            .take(limit)
            .collect())
    }

    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<String>, AppError> {
        let records = self.newest_first().await;
        let mut candidates = Vec::new();

        for source in SuggestionSource::ALL {
            let values = records.iter().flat_map(|r| source.values(&r.data));
            candidates.extend(collect_candidates(source, values, query, limit));
        }

        Ok(merge_suggestions(candidates, limit))
    }
}
