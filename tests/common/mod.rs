#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum_test::multipart::{MultipartForm, Part};

use docextract::app::{build_router, AppState};
use docextract::config::{SearchConfig, ServerConfig};
use docextract::db::memory::InMemoryDocumentRepository;
use docextract::db::models::DocumentRecord;
use docextract::db::repository::DocumentRepository;
use docextract::error::AppError;
use docextract::extraction::client::Extractor;
use docextract::models::document::ExtractedData;
use docextract::search::filter::SearchFilter;
use docextract::storage::staging::StagingArea;

/// Extractor that reads the staged file as `ExtractedData` JSON.
///
/// Tests control the "extracted" fields by choosing the upload body; a body
/// that is not valid JSON behaves like a failed extraction.
pub struct JsonFileExtractor;

#[async_trait]
impl Extractor for JsonFileExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedData, AppError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        serde_json::from_slice(&content)
            .map_err(|e| AppError::Extraction(format!("unreadable document: {e}")))
    }
}

/// Repository whose every call fails, for error-path tests.
pub struct FailingRepository;

#[async_trait]
impl DocumentRepository for FailingRepository {
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert(&self, _record: DocumentRecord) -> Result<(), AppError> {
        Err(AppError::Database("connection refused".into()))
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<DocumentRecord>, AppError> {
        Err(AppError::Database("connection refused".into()))
    }

    async fn list_recent(&self) -> Result<Vec<DocumentRecord>, AppError> {
        Err(AppError::Database("connection refused".into()))
    }

    async fn search(
        &self,
        _filter: &SearchFilter,
        _limit: usize,
    ) -> Result<Vec<DocumentRecord>, AppError> {
        Err(AppError::Database("connection refused".into()))
    }

    async fn suggest(&self, _query: &str, _limit: usize) -> Result<Vec<String>, AppError> {
        Err(AppError::Database("connection refused".into()))
    }
}

/// Router wired to an in-memory repository and [`JsonFileExtractor`].
pub struct TestEnv {
    _upload_dir: tempfile::TempDir,
    pub router: Router,
    pub repo: Arc<dyn DocumentRepository>,
    pub staging: Arc<StagingArea>,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self::with_repo(Arc::new(InMemoryDocumentRepository::new()), ServerConfig::default()).await
    }

    pub async fn with_server_config(server: ServerConfig) -> Self {
        Self::with_repo(Arc::new(InMemoryDocumentRepository::new()), server).await
    }

    pub async fn with_repo(repo: Arc<dyn DocumentRepository>, mut server: ServerConfig) -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
        server.upload_dir = upload_dir.path().to_path_buf();

        let staging = Arc::new(
            StagingArea::open(&server.upload_dir)
                .await
                .expect("Failed to open staging area"),
        );

        let app_state = AppState {
            document_repo: repo.clone(),
            extractor: Arc::new(JsonFileExtractor),
            staging: staging.clone(),
            search: SearchConfig::default(),
        };

        Self {
            router: build_router(app_state, &server),
            _upload_dir: upload_dir,
            repo,
            staging,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }

    /// Helper: upload one PDF whose extraction yields `data`, returning its id.
    pub async fn upload(&self, server: &axum_test::TestServer, data: &ExtractedData) -> String {
        let form = MultipartForm::new().add_part("files", resume_part(data, "resume.pdf"));
        let response = server.post("/api/upload").multipart(form).await;
        let body: serde_json::Value = response.json();
        body["results"][0]["id"]
            .as_str()
            .expect("Upload should succeed")
            .to_string()
    }

    /// Number of files left behind in the staging directory.
    pub fn staged_file_count(&self) -> usize {
        std::fs::read_dir(self.staging.root())
            .expect("Failed to read staging dir")
            .count()
    }
}

/// A multipart part whose body is the JSON the stub extractor will return.
pub fn resume_part(data: &ExtractedData, file_name: &str) -> Part {
    Part::bytes(serde_json::to_vec(data).expect("Failed to serialize resume"))
        .file_name(file_name)
        .mime_type("application/pdf")
}

pub fn resume(name: &str, email: &str, skills: &[&str]) -> ExtractedData {
    ExtractedData {
        name: name.to_string(),
        email: email.to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}
