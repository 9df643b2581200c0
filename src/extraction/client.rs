use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use crate::config::ExtractorConfig;
use crate::error::AppError;
use crate::models::document::{ExtractedData, REQUIRED_FIELDS};

/// Turns a staged document into structured fields.
///
/// Abstracted as a trait so tests can run without the remote service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<ExtractedData, AppError>;
}

/// JSON schema of [`ExtractedData`] as registered with the extraction agent.
pub fn agent_schema() -> Result<Value, AppError> {
    let mut root = schemars::schema_for!(ExtractedData);
    if let Some(object) = root.schema.object.as_mut() {
        object
            .required
            .extend(REQUIRED_FIELDS.iter().map(|f| f.to_string()));
    }
    serde_json::to_value(&root)
        .map_err(|e| AppError::Internal(format!("Failed to serialize agent schema: {e}")))
}

/// Client for the LlamaCloud extraction API.
///
/// The agent is looked up by name (and created on first use) once per
/// process; each document is then uploaded, extracted by an asynchronous
/// job and polled until the job settles.
pub struct LlamaExtractClient {
    http: reqwest::Client,
    config: ExtractorConfig,
    agent_id: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum JobStatus {
    Pending,
    Success,
    PartialSuccess,
    Error,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    id: String,
    status: JobStatus,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobResultResponse {
    #[serde(default)]
    data: Option<ExtractedData>,
}

impl LlamaExtractClient {
    pub fn new(config: ExtractorConfig) -> Result<Self, AppError> {
        if config.api_key.is_empty() {
            return Err(AppError::Config(
                "extractor API key not set (DOCEXTRACT__EXTRACTOR__API_KEY or LLAMA_CLOUD_API_KEY)"
                    .into(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            agent_id: OnceCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// The id of the configured agent, resolving or creating it on first call.
    pub async fn agent_id(&self) -> Result<&str, AppError> {
        self.agent_id
            .get_or_try_init(|| self.resolve_agent())
            .await
            .map(String::as_str)
    }

    /// `.../extraction-agents/by-name/<agent_name>` with the name percent-encoded.
    fn agent_lookup_url(&self) -> Result<reqwest::Url, AppError> {
        let mut url = reqwest::Url::parse(&self.url("/api/v1/extraction/extraction-agents/by-name"))
            .map_err(|e| AppError::Config(format!("Invalid extractor base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("Invalid extractor base_url".into()))?
            .push(&self.config.agent_name);
        Ok(url)
    }

    async fn resolve_agent(&self) -> Result<String, AppError> {
        let name = &self.config.agent_name;
        let response = self
            .http
            .get(self.agent_lookup_url()?)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() != reqwest::StatusCode::NOT_FOUND {
            let agent: IdResponse = ensure_success(response, "agent lookup")
                .await?
                .json()
                .await
                .map_err(transport_error)?;
            tracing::info!(agent = %name, id = %agent.id, "Using existing extraction agent");
            return Ok(agent.id);
        }

        let body = json!({
            "name": name,
            "data_schema": agent_schema()?,
            "config": {},
        });
        let response = self
            .http
            .post(self.url("/api/v1/extraction/extraction-agents"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let agent: IdResponse = ensure_success(response, "agent creation")
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        tracing::info!(agent = %name, id = %agent.id, "Created extraction agent");
        Ok(agent.id)
    }

    async fn upload_file(&self, path: &Path) -> Result<String, AppError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content = tokio::fs::read(path).await.map_err(|e| {
            AppError::Storage(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        let part = reqwest::multipart::Part::bytes(content)
            .file_name(file_name.clone())
            .mime_str(mime_guess::from_path(path).first_or_octet_stream().essence_str())
            .map_err(transport_error)?;
        let form = reqwest::multipart::Form::new().part("upload_file", part);

        let response = self
            .http
            .post(self.url("/api/v1/files"))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        let file: IdResponse = ensure_success(response, "file upload")
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        Ok(file.id)
    }

    async fn start_job(&self, agent_id: &str, file_id: &str) -> Result<JobResponse, AppError> {
        let response = self
            .http
            .post(self.url("/api/v1/extraction/jobs"))
            .bearer_auth(&self.config.api_key)
            .json(&json!({ "extraction_agent_id": agent_id, "file_id": file_id }))
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response, "job creation")
            .await?
            .json()
            .await
            .map_err(transport_error)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobResponse, AppError> {
        let response = self
            .http
            .get(self.url(&format!("/api/v1/extraction/jobs/{job_id}")))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response, "job status")
            .await?
            .json()
            .await
            .map_err(transport_error)
    }

    async fn wait_for_job(&self, mut job: JobResponse) -> Result<(), AppError> {
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(self.config.timeout_secs);
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        loop {
            match job.status {
                JobStatus::Success | JobStatus::PartialSuccess => return Ok(()),
                JobStatus::Error | JobStatus::Cancelled => {
                    return Err(AppError::Extraction(format!(
                        "job {} ended with status {:?}: {}",
                        job.id,
                        job.status,
                        job.error.as_deref().unwrap_or("no details")
                    )));
                }
                JobStatus::Pending | JobStatus::Unknown => {}
            }

            if tokio::time::Instant::now() + interval > deadline {
                return Err(AppError::Extraction(format!(
                    "job {} did not finish within {}s",
                    job.id, self.config.timeout_secs
                )));
            }
            tokio::time::sleep(interval).await;
            job = self.job_status(&job.id).await?;
        }
    }

    async fn fetch_result(&self, job_id: &str) -> Result<ExtractedData, AppError> {
        let response = self
            .http
            .get(self.url(&format!("/api/v1/extraction/jobs/{job_id}/result")))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(transport_error)?;
        let result: JobResultResponse = ensure_success(response, "job result")
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        result
            .data
            .ok_or_else(|| AppError::Extraction(format!("job {job_id} returned no data")))
    }
}

#[async_trait]
impl Extractor for LlamaExtractClient {
    async fn extract(&self, path: &Path) -> Result<ExtractedData, AppError> {
        let agent_id = self.agent_id().await?.to_string();
        let file_id = self.upload_file(path).await?;
        let job = self.start_job(&agent_id, &file_id).await?;
        let job_id = job.id.clone();
        tracing::debug!(job = %job_id, file = %path.display(), "Extraction job started");

        self.wait_for_job(job).await?;
        self.fetch_result(&job_id).await
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    AppError::Extraction(err.to_string())
}

async fn ensure_success(
    response: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Extraction(format!(
        "{what} failed with {status}: {body}"
    )))
}
