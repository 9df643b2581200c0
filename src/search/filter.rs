use serde::Deserialize;

use crate::models::document::ExtractedData;

/// Search constraints accepted by `GET /api/search`.
///
/// Every field is optional; an empty value means "no constraint". All
/// non-empty constraints must hold for a document to match.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchFilter {
    /// Free text matched against name, email and summary.
    pub q: String,
    pub skills: String,
    pub experience: String,
    pub education: String,
    pub projects: String,
}

impl SearchFilter {
    /// Trim every constraint.
    pub fn normalized(self) -> Self {
        Self {
            q: self.q.trim().to_string(),
            skills: self.skills.trim().to_string(),
            experience: self.experience.trim().to_string(),
            education: self.education.trim().to_string(),
            projects: self.projects.trim().to_string(),
        }
    }

    /// True when no constraint is set, so every document matches.
    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
            && self.skills.is_empty()
            && self.experience.is_empty()
            && self.education.is_empty()
            && self.projects.is_empty()
    }

    /// The list-field constraints paired with the record path they apply to.
    pub fn list_constraints(&self) -> [(&'static str, &str); 4] {
        [
            ("data.skills", self.skills.as_str()),
            ("data.experience", self.experience.as_str()),
            ("data.education", self.education.as_str()),
            ("data.projects", self.projects.as_str()),
        ]
    }

    /// Evaluate the filter against extracted data.
    pub fn matches(&self, data: &ExtractedData) -> bool {
        if !self.q.is_empty()
            && ![&data.name, &data.email, &data.summary]
                .iter()
                .any(|field| contains_ci(field, &self.q))
        {
            return false;
        }

        let lists = [
            (&data.skills, &self.skills),
            (&data.experience, &self.experience),
            (&data.education, &self.education),
            (&data.projects, &self.projects),
        ];

        lists.iter().all(|(values, needle)| {
            needle.is_empty() || values.iter().any(|v| contains_ci(v, needle))
        })
    }
}

/// Case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive prefix test.
pub fn starts_with_ci(haystack: &str, prefix: &str) -> bool {
    haystack.to_lowercase().starts_with(&prefix.to_lowercase())
}
