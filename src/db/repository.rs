use async_trait::async_trait;
use bson::{doc, Bson, Document};

use crate::db::models::DocumentRecord;
use crate::error::AppError;
use crate::search::filter::SearchFilter;
use crate::search::suggest::{collect_candidates, merge_suggestions, SuggestionSource};

/// Repository trait for extracted document records.
///
/// This trait allows swapping the database layer in tests.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Create the indexes the queries below rely on. Idempotent.
    async fn ensure_indexes(&self) -> Result<(), AppError>;

    /// Store a newly processed document.
    async fn insert(&self, record: DocumentRecord) -> Result<(), AppError>;

    /// Find a document by its id.
    async fn find_by_id(&self, id: &str) -> Result<Option<DocumentRecord>, AppError>;

    /// All documents, newest first.
    async fn list_recent(&self) -> Result<Vec<DocumentRecord>, AppError>;

    /// Documents matching the filter, newest first, at most `limit`.
    async fn search(
        &self,
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<DocumentRecord>, AppError>;

    /// Autocomplete values for a non-empty query, sorted, at most `limit`.
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<String>, AppError>;
}

/// MongoDB implementation of the DocumentRepository.
pub struct MongoDocumentRepository {
    collection: mongodb::Collection<DocumentRecord>,
}

impl MongoDocumentRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("documents"),
        }
    }
}

#[async_trait]
impl DocumentRepository for MongoDocumentRepository {
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::IndexModel;

        let indexes = vec![
            IndexModel::builder().keys(doc! { "data.name": 1 }).build(),
            IndexModel::builder().keys(doc! { "data.email": 1 }).build(),
            IndexModel::builder().keys(doc! { "data.skills": 1 }).build(),
            IndexModel::builder().keys(doc! { "created_at": -1 }).build(),
        ];

        self.collection.create_indexes(indexes).await?;
        Ok(())
    }

    async fn insert(&self, record: DocumentRecord) -> Result<(), AppError> {
        self.collection.insert_one(&record).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<DocumentRecord>, AppError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn list_recent(&self) -> Result<Vec<DocumentRecord>, AppError> {
        use futures::TryStreamExt;

        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;

        let records: Vec<DocumentRecord> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn search(
        &self,
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<DocumentRecord>, AppError> {
        use futures::TryStreamExt;

        let cursor = self
            .collection
            .find(filter_document(filter))
            .sort(doc! { "created_at": -1 })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?;

        let records: Vec<DocumentRecord> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<String>, AppError> {
        let mut candidates = Vec::new();

        for source in SuggestionSource::ALL {
            let pattern = if source.is_prefix() {
                prefix_regex(query)
            } else {
                contains_regex(query)
            };

            // distinct() over an array field yields every element of the
            // matching documents, so the values are matched again below.
            let field = source.field();
            let values = self
                .collection
                .distinct(field, doc! { field: pattern })
                .await?;

            let strings = values.iter().filter_map(|value| match value {
                Bson::String(s) => Some(s.as_str()),
                _ => None,
            });
            candidates.extend(collect_candidates(source, strings, query, limit));
        }

        Ok(merge_suggestions(candidates, limit))
    }
}

/// Translate a search filter into a MongoDB query document.
pub fn filter_document(filter: &SearchFilter) -> Document {
    let mut clauses: Vec<Document> = Vec::new();

    if !filter.q.is_empty() {
        let pattern = contains_regex(&filter.q);
        clauses.push(doc! {
            "$or": [
                { "data.name": pattern.clone() },
                { "data.email": pattern.clone() },
                { "data.summary": pattern },
            ]
        });
    }

    for (field, value) in filter.list_constraints() {
        if !value.is_empty() {
            clauses.push(doc! { field: contains_regex(value) });
        }
    }

    if clauses.is_empty() {
        doc! {}
    } else {
        doc! { "$and": clauses }
    }
}

/// Case-insensitive "contains" match on literal user input.
fn contains_regex(value: &str) -> Document {
    doc! { "$regex": regex::escape(value), "$options": "i" }
}

/// Case-insensitive "starts with" match on literal user input.
fn prefix_regex(value: &str) -> Document {
    doc! { "$regex": format!("^{}", regex::escape(value)), "$options": "i" }
}
