use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::db::models::DocumentRecord;
use crate::db::repository::DocumentRepository;
use crate::error::AppError;
use crate::extraction::client::Extractor;
use crate::models::document::ExtractedData;
use crate::storage::filename::{allowed_file, stored_filename};
use crate::storage::staging::StagingArea;

/// Name of the multipart field carrying documents.
pub const FILES_FIELD: &str = "files";

/// One file received in an upload request.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Filename as sent by the client.
    pub filename: String,
    pub content: Vec<u8>,
}

/// Outcome for a single uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadResult {
    Success {
        id: String,
        filename: String,
        data: ExtractedData,
    },
    Error {
        filename: String,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub results: Vec<UploadResult>,
}

/// Core upload logic, separated from the HTTP layer for testability.
///
/// Each file is staged, extracted and stored on its own; a failure only
/// affects that file's result. Staged files are always removed.
pub async fn process_upload(
    repo: &dyn DocumentRepository,
    extractor: &dyn Extractor,
    staging: &StagingArea,
    files: Vec<IncomingFile>,
) -> UploadResponse {
    let mut results = Vec::with_capacity(files.len());

    for file in files {
        if file.filename.is_empty() {
            continue;
        }

        if !allowed_file(&file.filename) {
            tracing::info!(filename = %file.filename, "Rejected upload with unsupported extension");
            results.push(UploadResult::Error {
                filename: file.filename,
                error: "File type not allowed".to_string(),
            });
            continue;
        }

        let filename = stored_filename(&file.filename, chrono::Utc::now());
        let result = match process_file(repo, extractor, staging, &filename, &file.content).await {
            Ok((id, data)) => {
                tracing::info!(%filename, %id, "Document extracted and stored");
                UploadResult::Success { id, filename, data }
            }
            Err(e) => {
                tracing::warn!(%filename, "Upload failed: {e}");
                UploadResult::Error {
                    filename,
                    error: e.to_string(),
                }
            }
        };
        results.push(result);
    }

    UploadResponse { results }
}

async fn process_file(
    repo: &dyn DocumentRepository,
    extractor: &dyn Extractor,
    staging: &StagingArea,
    filename: &str,
    content: &[u8],
) -> Result<(String, ExtractedData), AppError> {
    let staged = staging.stage(filename, content).await?;

    let extracted = extractor.extract(staged.path()).await;

    if let Err(e) = staged.remove().await {
        tracing::warn!("{e}");
    }

    let data = extracted?;
    let record = DocumentRecord::new(filename.to_string(), data.clone());
    let id = record.id.clone();
    repo.insert(record).await?;

    Ok((id, data))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(format!("Multipart error: {}", err.body_text()))
    }
}

/// Axum handler for `POST /api/upload`.
///
/// Accepts a multipart form with one or more file fields named "files".
/// Parts under that name without a `filename` are ignored.
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<axum::Json<UploadResponse>, AppError> {
    let mut files = Vec::new();
    let mut saw_file_part = false;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        saw_file_part = true;

        let content = field.bytes().await.map_err(multipart_error)?;
        files.push(IncomingFile {
            filename,
            content: content.to_vec(),
        });
    }

    if !saw_file_part {
        return Err(AppError::BadRequest("No files provided".into()));
    }

    let response = process_upload(
        state.document_repo.as_ref(),
        state.extractor.as_ref(),
        &state.staging,
        files,
    )
    .await;

    Ok(axum::Json(response))
}
