use axum::extract::{Query, State};
use axum::Json;

use crate::app::AppState;
use crate::error::AppError;
use crate::models::document::{DocumentView, ResultsResponse};
use crate::search::filter::SearchFilter;

/// Axum handler for `GET /api/search`.
///
/// Query parameters: `q`, `skills`, `experience`, `education`, `projects`.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(filter): Query<SearchFilter>,
) -> Result<Json<ResultsResponse<DocumentView>>, AppError> {
    let filter = filter.normalized();
    let records = state
        .document_repo
        .search(&filter, state.search.search_limit)
        .await?;

    tracing::debug!(
        ?filter,
        unfiltered = filter.is_empty(),
        hits = records.len(),
        "Search executed"
    );

    Ok(Json(
        records.iter().map(DocumentView::from).collect::<Vec<_>>().into(),
    ))
}
