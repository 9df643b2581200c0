use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "docextract.toml";

/// Service configuration, layered from an optional TOML file and
/// `DOCEXTRACT__SECTION__KEY` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub extractor: ExtractorConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Directory uploads are staged in while being extracted.
    pub upload_dir: PathBuf,
    /// Request body limit for uploads.
    pub max_upload_bytes: usize,
    /// Optional directory of static front-end assets served at `/`.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 16 * 1024 * 1024,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mongodb,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub mongodb_uri: String,
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Mongodb,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            database: "docextract".to_string(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub base_url: String,
    pub api_key: String,
    pub agent_name: String,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloud.llamaindex.ai".to_string(),
            api_key: String::new(),
            agent_name: "document-parser-app".to_string(),
            poll_interval_ms: 1000,
            timeout_secs: 300,
        }
    }
}

impl std::fmt::Debug for ExtractorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("agent_name", &self.agent_name)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum hits returned by `/api/search`.
    pub search_limit: usize,
    /// Maximum suggestions, both per source and overall.
    pub suggestion_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_limit: 50,
            suggestion_limit: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (required when given, otherwise
    /// `docextract.toml` if present) and the environment.
    ///
    /// `LLAMA_CLOUD_API_KEY` is used when no extractor API key is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = config::Config::builder().add_source(file).add_source(
            Environment::with_prefix("DOCEXTRACT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut cfg = Self::from_builder(builder)?;
        cfg.apply_api_key_fallback(std::env::var("LLAMA_CLOUD_API_KEY").ok());
        Ok(cfg)
    }

    /// Build from an already assembled set of sources.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let cfg: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AppError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Use `fallback` as the extractor key when none is configured.
    pub fn apply_api_key_fallback(&mut self, fallback: Option<String>) {
        if !self.extractor.api_key.is_empty() {
            return;
        }
        if let Some(key) = fallback.filter(|k| !k.is_empty()) {
            self.extractor.api_key = key;
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.search.search_limit == 0 {
            return Err(AppError::Config("search.search_limit must be at least 1".into()));
        }
        if self.search.suggestion_limit == 0 {
            return Err(AppError::Config(
                "search.suggestion_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<AppConfig, AppError> {
        AppConfig::from_builder(
            config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn test_defaults() {
        let cfg = from_toml("").unwrap();
        assert_eq!(cfg.server.bind_addr, "0.0.0.0:5000");
        assert_eq!(cfg.server.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(cfg.storage.backend, StorageBackend::Mongodb);
        assert_eq!(cfg.storage.database, "docextract");
        assert_eq!(cfg.extractor.agent_name, "document-parser-app");
        assert_eq!(cfg.search.search_limit, 50);
        assert_eq!(cfg.search.suggestion_limit, 10);
    }

    #[test]
    fn test_partial_override() {
        let cfg = from_toml(
            r#"
            [server]
            bind_addr = "127.0.0.1:8080"
            static_dir = "public"

            [storage]
            backend = "memory"

            [search]
            suggestion_limit = 5
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.server.static_dir, Some(PathBuf::from("public")));
        assert_eq!(cfg.server.upload_dir, PathBuf::from("uploads"));
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert_eq!(cfg.search.suggestion_limit, 5);
        assert_eq!(cfg.search.search_limit, 50);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = from_toml(
            r#"
            [storage]
            backend = "postgres"
            "#,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        for toml in [
            "[search]\nsearch_limit = 0",
            "[search]\nsuggestion_limit = 0",
        ] {
            match from_toml(toml) {
                Err(AppError::Config(msg)) => assert!(msg.contains("at least 1"), "{msg}"),
                other => panic!("Expected config error for {toml:?}, got: {:?}", other),
            }
        }
    }

    #[test]
    fn test_api_key_fallback_only_fills_missing_key() {
        let mut cfg = from_toml("").unwrap();
        cfg.apply_api_key_fallback(None);
        assert!(cfg.extractor.api_key.is_empty());

        cfg.apply_api_key_fallback(Some(String::new()));
        assert!(cfg.extractor.api_key.is_empty());

        cfg.apply_api_key_fallback(Some("llx-from-env".to_string()));
        assert_eq!(cfg.extractor.api_key, "llx-from-env");

        let mut cfg = from_toml(
            r#"
            [extractor]
            api_key = "llx-from-file"
            "#,
        )
        .unwrap();
        cfg.apply_api_key_fallback(Some("llx-from-env".to_string()));
        assert_eq!(cfg.extractor.api_key, "llx-from-file");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let extractor = ExtractorConfig {
            api_key: "llx-secret".to_string(),
            ..Default::default()
        };
        let printed = format!("{:?}", extractor);
        assert!(!printed.contains("llx-secret"));
        assert!(printed.contains("***"));
    }
}
