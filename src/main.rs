use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use docextract::app::{build_router, AppState};
use docextract::config::{AppConfig, StorageBackend};
use docextract::db::memory::InMemoryDocumentRepository;
use docextract::db::repository::{DocumentRepository, MongoDocumentRepository};
use docextract::extraction::client::LlamaExtractClient;
use docextract::storage::staging::StagingArea;

/// Document extraction service.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to a TOML config file (defaults to ./docextract.toml if present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_addr`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docextract=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }

    tracing::info!("Starting docextract server...");

    let document_repo: Arc<dyn DocumentRepository> = match config.storage.backend {
        StorageBackend::Mongodb => {
            let mongo_client = mongodb::Client::with_uri_str(&config.storage.mongodb_uri)
                .await
                .context("Failed to connect to MongoDB")?;
            let mongo_db = mongo_client.database(&config.storage.database);
            tracing::info!(
                "Connected to MongoDB at {} (database '{}')",
                config.storage.mongodb_uri,
                config.storage.database
            );
            Arc::new(MongoDocumentRepository::new(&mongo_db))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; documents are lost on restart");
            Arc::new(InMemoryDocumentRepository::new())
        }
    };
    document_repo.ensure_indexes().await?;

    let extractor = LlamaExtractClient::new(config.extractor.clone())?;
    match extractor.agent_id().await {
        Ok(id) => tracing::info!("Extraction agent '{}' ready ({id})", config.extractor.agent_name),
        Err(e) => tracing::warn!("Extraction agent not ready yet, will retry on first upload: {e}"),
    }

    let staging = StagingArea::open(&config.server.upload_dir).await?;
    tracing::info!("Staging uploads in {}", staging.root().display());

    let app_state = AppState {
        document_repo,
        extractor: Arc::new(extractor),
        staging: Arc::new(staging),
        search: config.search.clone(),
    };

    let app = build_router(app_state, &config.server);

    tracing::info!("Listening on http://{}", config.server.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
