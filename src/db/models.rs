use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::document::ExtractedData;

/// A processed upload as stored in the `documents` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// UUID v4, used as the MongoDB `_id`.
    #[serde(rename = "_id")]
    pub id: String,
    /// The stored (sanitised, timestamp-prefixed) filename.
    pub filename: String,
    /// Fields returned by the extraction agent.
    pub data: ExtractedData,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Build a fresh record with a new id, stamped with the current time.
    pub fn new(filename: String, data: ExtractedData) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            filename,
            data,
            created_at: now,
            updated_at: now,
        }
    }
}
