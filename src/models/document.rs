use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db::models::DocumentRecord;

/// Structured fields the extraction agent pulls out of a resume.
///
/// The doc comments double as field descriptions in the JSON schema sent to
/// the agent, so keep them phrased as instructions for the extractor.
/// Deserialization is lenient: anything the agent leaves out takes its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExtractedData {
    /// Full name of candidate
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Location/Address of candidate
    pub location: String,
    /// Technical skills and technologies
    pub skills: Vec<String>,
    /// Work experience with company, position, duration
    pub experience: Vec<String>,
    /// Education details with degree, institution, year
    pub education: Vec<String>,
    /// Projects with name, description, technologies used
    pub projects: Vec<String>,
    /// Languages spoken by the candidate
    pub languages: Vec<String>,
    /// LinkedIn profile URL
    pub linkedin: String,
    /// GitHub profile URL
    pub github: String,
    /// Twitter profile URL
    pub twitter: String,
    /// Personal or portfolio website URL
    pub website: String,
    /// Awards or recognitions received
    pub awards: Vec<String>,
    /// Hobbies or interests
    pub hobbies: Vec<String>,
    /// Certifications with name, issuing organization, year
    pub certifications: Vec<String>,
    /// Achievements or notable accomplishments
    pub achievements: Vec<String>,
    /// References with name, contact information
    pub references: Vec<String>,
    /// Any additional information or notes
    pub additional_info: Map<String, Value>,
    /// Professional summary or objective
    pub summary: String,
    /// Career objective or goal
    pub objective: String,
    /// Custom metadata for the document
    pub metadata: Map<String, Value>,
}

/// Fields the agent must always attempt to fill.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "name",
    "email",
    "skills",
    "experience",
    "education",
    "projects",
];

/// Row shown in the document listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A search hit: the summary plus the searchable list fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentView {
    pub id: String,
    pub filename: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub skills: Vec<String>,
    pub experience: Vec<String>,
    pub education: Vec<String>,
    pub projects: Vec<String>,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

/// Everything known about one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub view: DocumentView,
    /// The complete extraction result.
    pub raw_data: ExtractedData,
    pub updated_at: DateTime<Utc>,
}

/// Envelope for list-shaped responses (`{"results": [...]}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse<T> {
    pub results: Vec<T>,
}

impl<T> From<Vec<T>> for ResultsResponse<T> {
    fn from(results: Vec<T>) -> Self {
        Self { results }
    }
}

impl From<&DocumentRecord> for DocumentSummary {
    fn from(record: &DocumentRecord) -> Self {
        let data = &record.data;
        Self {
            id: record.id.clone(),
            filename: record.filename.clone(),
            name: data.name.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
            location: data.location.clone(),
            skills: data.skills.clone(),
            created_at: record.created_at,
        }
    }
}

impl From<&DocumentRecord> for DocumentView {
    fn from(record: &DocumentRecord) -> Self {
        let data = &record.data;
        Self {
            id: record.id.clone(),
            filename: record.filename.clone(),
            name: data.name.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
            location: data.location.clone(),
            skills: data.skills.clone(),
            experience: data.experience.clone(),
            education: data.education.clone(),
            projects: data.projects.clone(),
            summary: data.summary.clone(),
            created_at: record.created_at,
        }
    }
}

impl From<&DocumentRecord> for DocumentDetail {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            view: DocumentView::from(record),
            raw_data: record.data.clone(),
            updated_at: record.updated_at,
        }
    }
}
