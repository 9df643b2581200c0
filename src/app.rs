use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::{SearchConfig, ServerConfig};
use crate::db::repository::DocumentRepository;
use crate::extraction::client::Extractor;
use crate::storage::staging::StagingArea;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub document_repo: Arc<dyn DocumentRepository>,
    pub extractor: Arc<dyn Extractor>,
    pub staging: Arc<StagingArea>,
    pub search: SearchConfig,
}

/// Build the Axum router: JSON API under `/api`, optional static front end
/// for everything else.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/api/upload", post(api::upload::upload_handler))
        .route("/api/search", get(api::search::search_handler))
        .route("/api/documents", get(api::documents::list_documents_handler))
        .route("/api/document/{id}", get(api::documents::get_document_handler))
        .route("/api/suggest", get(api::suggest::suggest_handler))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes));

    if let Some(static_dir) = &server.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
