use axum::extract::{Path, State};
use axum::Json;

use crate::app::AppState;
use crate::error::AppError;
use crate::models::document::{DocumentDetail, DocumentSummary, ResultsResponse};

/// Axum handler for `GET /api/documents`: every document, newest first.
pub async fn list_documents_handler(
    State(state): State<AppState>,
) -> Result<Json<ResultsResponse<DocumentSummary>>, AppError> {
    let records = state.document_repo.list_recent().await?;
    Ok(Json(
        records
            .iter()
            .map(DocumentSummary::from)
            .collect::<Vec<_>>()
            .into(),
    ))
}

/// Axum handler for `GET /api/document/{id}`.
pub async fn get_document_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentDetail>, AppError> {
    let record = state
        .document_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".into()))?;

    Ok(Json(DocumentDetail::from(&record)))
}
