use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use crate::files::UploadFile;

/// Outcome for a single uploaded file, as reported by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadResult {
    Success {
        id: String,
        filename: String,
        #[serde(default)]
        data: Value,
    },
    Error {
        #[serde(default)]
        filename: String,
        error: String,
    },
}

/// What came back from an upload request.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Results(Vec<UploadResult>),
    /// The server answered with something other than per-file results.
    ServerError(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub created_at: String,
}

/// Search hit; carries the list fields the listing leaves out.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentView {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentDetail {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    /// The complete extraction result.
    #[serde(default)]
    pub raw_data: Value,
}

/// Search constraints; empty strings are left out of the query.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub q: String,
    pub skills: String,
    pub experience: String,
    pub education: String,
    pub projects: String,
}

impl SearchParams {
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("q", self.q.trim()),
            ("skills", self.skills.trim()),
            ("experience", self.experience.trim()),
            ("education", self.education.trim()),
            ("projects", self.projects.trim()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect()
    }
}

#[derive(Deserialize)]
struct Results<T> {
    results: Vec<T>,
}

#[derive(Deserialize)]
struct Suggestions {
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Shortest query worth asking suggestions for.
pub const MIN_SUGGEST_CHARS: usize = 2;

/// Thin client over the docextract HTTP API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send every file in one multipart request (`files` parts).
    pub async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadOutcome> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.content)
                .file_name(file.name)
                .mime_str(&file.mime)
                .context("Invalid MIME type")?;
            form = form.part("files", part);
        }

        let response = self
            .http
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await
            .context("Network error during upload")?;

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        let body = response.text().await.context("Failed to read response")?;

        Ok(parse_upload_body(is_json, &body))
    }

    pub async fn search(&self, params: &SearchParams) -> Result<Vec<DocumentView>> {
        let response = self
            .http
            .get(self.url("/api/search"))
            .query(&params.query_pairs())
            .send()
            .await
            .context("Network error during search")?;
        let body: Results<DocumentView> = error_for_status(response)
            .await?
            .json()
            .await
            .context("Server error during search")?;
        Ok(body.results)
    }

    /// Suggestions for a partially typed query; short queries return nothing.
    pub async fn suggest(&self, query: &str) -> Result<Vec<String>> {
        if query.chars().count() < MIN_SUGGEST_CHARS {
            return Ok(Vec::new());
        }
        let response = self
            .http
            .get(self.url("/api/suggest"))
            .query(&[("q", query)])
            .send()
            .await
            .context("Network error fetching suggestions")?;
        let body: Suggestions = error_for_status(response).await?.json().await?;
        Ok(body.suggestions)
    }

    pub async fn list(&self) -> Result<Vec<DocumentSummary>> {
        let response = self
            .http
            .get(self.url("/api/documents"))
            .send()
            .await
            .context("Network error listing documents")?;
        let body: Results<DocumentSummary> = error_for_status(response).await?.json().await?;
        Ok(body.results)
    }

    /// One document's details, or `None` if the server doesn't know the id.
    pub async fn document(&self, id: &str) -> Result<Option<DocumentDetail>> {
        let response = self
            .http
            .get(self.url(&format!("/api/document/{id}")))
            .send()
            .await
            .context("Network error fetching document")?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let detail = error_for_status(response).await?.json().await?;
        Ok(Some(detail))
    }
}

/// Interpret an upload response body.
pub fn parse_upload_body(is_json: bool, body: &str) -> UploadOutcome {
    #[derive(Deserialize)]
    struct UploadBody {
        #[serde(default)]
        results: Option<Vec<UploadResult>>,
        #[serde(default)]
        error: Option<String>,
    }

    if is_json {
        match serde_json::from_str::<UploadBody>(body) {
            Ok(UploadBody {
                results: Some(results),
                ..
            }) => return UploadOutcome::Results(results),
            Ok(UploadBody {
                error: Some(error), ..
            }) => return UploadOutcome::ServerError(error),
            _ => {}
        }
    }

    let snippet: String = body.chars().take(100).collect();
    UploadOutcome::ServerError(format!("Server error: {snippet}"))
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    anyhow::bail!("Server returned {status}: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_results() {
        let body = r#"{"results":[
            {"id":"1","filename":"20240101_000000_a.pdf","status":"success","data":{"name":"A"}},
            {"filename":"b.txt","status":"error","error":"File type not allowed"}
        ]}"#;

        match parse_upload_body(true, body) {
            UploadOutcome::Results(results) => {
                assert_eq!(results.len(), 2);
                assert!(matches!(&results[0], UploadResult::Success { id, .. } if id == "1"));
                assert!(
                    matches!(&results[1], UploadResult::Error { error, .. } if error == "File type not allowed")
                );
            }
            other => panic!("Expected results, got: {:?}", other),
        }
    }

    #[test]
    fn test_parse_upload_error_body() {
        assert_eq!(
            parse_upload_body(true, r#"{"error":"No files provided"}"#),
            UploadOutcome::ServerError("No files provided".to_string())
        );
    }

    #[test]
    fn test_parse_upload_non_json_is_truncated() {
        let html = format!("<html>{}</html>", "x".repeat(500));
        match parse_upload_body(false, &html) {
            UploadOutcome::ServerError(msg) => {
                assert!(msg.starts_with("Server error: <html>"));
                assert_eq!(msg.chars().count(), "Server error: ".len() + 100);
            }
            other => panic!("Expected server error, got: {:?}", other),
        }
    }

    #[test]
    fn test_search_params_skip_blank_values() {
        let params = SearchParams {
            q: " ada ".to_string(),
            skills: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(params.query_pairs(), vec![("q", "ada")]);
        assert!(!params.is_empty());
        assert!(SearchParams::default().is_empty());
    }

    #[tokio::test]
    async fn test_short_suggest_query_skips_request() {
        // Nothing listens on this port; a request would fail.
        let client = ApiClient::new("http://127.0.0.1:9");
        assert!(client.suggest("a").await.unwrap().is_empty());
        assert!(client.suggest("").await.unwrap().is_empty());
    }
}
