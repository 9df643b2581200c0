use std::collections::BTreeSet;

use crate::models::document::ExtractedData;
use crate::search::filter::{contains_ci, starts_with_ci};

/// A field that contributes autocomplete suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    Name,
    Email,
    Skills,
    Experience,
    Education,
    Projects,
}

impl SuggestionSource {
    pub const ALL: [SuggestionSource; 6] = [
        SuggestionSource::Name,
        SuggestionSource::Email,
        SuggestionSource::Skills,
        SuggestionSource::Experience,
        SuggestionSource::Education,
        SuggestionSource::Projects,
    ];

    /// Path of the field inside a stored record.
    pub fn field(self) -> &'static str {
        match self {
            SuggestionSource::Name => "data.name",
            SuggestionSource::Email => "data.email",
            SuggestionSource::Skills => "data.skills",
            SuggestionSource::Experience => "data.experience",
            SuggestionSource::Education => "data.education",
            SuggestionSource::Projects => "data.projects",
        }
    }

    /// Name, email and skills complete by prefix; the free-text list fields
    /// match anywhere.
    pub fn is_prefix(self) -> bool {
        matches!(
            self,
            SuggestionSource::Name | SuggestionSource::Email | SuggestionSource::Skills
        )
    }

    pub fn matches(self, candidate: &str, query: &str) -> bool {
        if self.is_prefix() {
            starts_with_ci(candidate, query)
        } else {
            contains_ci(candidate, query)
        }
    }

    /// The values this source exposes for one document.
    pub fn values(self, data: &ExtractedData) -> Vec<&str> {
        match self {
            SuggestionSource::Name => vec![data.name.as_str()],
            SuggestionSource::Email => vec![data.email.as_str()],
            SuggestionSource::Skills => data.skills.iter().map(String::as_str).collect(),
            SuggestionSource::Experience => data.experience.iter().map(String::as_str).collect(),
            SuggestionSource::Education => data.education.iter().map(String::as_str).collect(),
            SuggestionSource::Projects => data.projects.iter().map(String::as_str).collect(),
        }
    }
}

/// Pick up to `limit` distinct, non-empty values of one source that match the query.
pub fn collect_candidates<'a, I>(
    source: SuggestionSource,
    values: I,
    query: &str,
    limit: usize,
) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = BTreeSet::new();
    let mut picked = Vec::new();
    for value in values {
        if picked.len() >= limit {
            break;
        }
        if value.is_empty() || !source.matches(value, query) {
            continue;
        }
        if seen.insert(value) {
            picked.push(value.to_string());
        }
    }
    picked
}

/// Merge candidates from every source: deduplicated, sorted, at most `limit`.
pub fn merge_suggestions<I>(candidates: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    candidates
        .into_iter()
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(limit)
        .collect()
}
