//! Application configuration. Storage location, AI credentials, display limits.

use serde::Deserialize;
use std::path::PathBuf;

/// Rows shown in the recent-history view.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Whole-request timeout for category suggestions.
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

/// Which StoragePort adapter backs the expense store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per key under the data directory.
    #[default]
    Json,
    /// libsql database `expenses.db` under the data directory.
    Sqlite,
    /// Nothing is written to disk.
    Memory,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Read from EXPENSES_DATA_DIR. Defaults to ./data.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Read from EXPENSES_STORAGE_BACKEND (json | sqlite | memory).
    #[serde(default)]
    pub storage_backend: Option<StorageBackend>,

    /// Rows shown in recent history. Read from EXPENSES_HISTORY_LIMIT.
    #[serde(default)]
    pub history_limit: Option<usize>,

    // ─────────────────────────────────────────────────────────────────────────
    // Category Suggestion Configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// AI API key (e.g., OpenAI). Read from EXPENSES_AI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// AI API URL. Defaults to OpenAI. Read from EXPENSES_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// AI model name. Defaults to "gpt-4o-mini". Read from EXPENSES_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,

    /// Read from EXPENSES_AI_TIMEOUT_SECS.
    #[serde(default)]
    pub ai_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Reads the process environment. Expects `.env` to have been loaded by the caller.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(std::env::vars().collect())
    }

    /// Builds the config from `vars` only; `EXPENSES_CONFIG` in `vars` names an extra file.
    pub fn load_from(vars: config::Map<String, String>) -> Result<Self, config::ConfigError> {
        let mut c = config::Config::builder();
        if let Some(path) = vars.get("EXPENSES_CONFIG") {
            c = c.add_source(config::File::with_name(path));
        }
        // Environment wins over the file.
        c = c.add_source(
            config::Environment::with_prefix("EXPENSES")
                .try_parsing(true)
                .source(Some(vars)),
        );
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("./data"))
    }

    pub fn storage_backend_or_default(&self) -> StorageBackend {
        self.storage_backend.unwrap_or_default()
    }

    /// Returns the history row limit. Defaults to DEFAULT_HISTORY_LIMIT; zero is treated as unset.
    pub fn history_limit_or_default(&self) -> usize {
        self.history_limit
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // AI Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the AI API key if configured and non-empty.
    pub fn ai_api_key(&self) -> Option<String> {
        self.ai_api_key.clone().filter(|k| !k.trim().is_empty())
    }

    /// Returns the AI API URL. Defaults to OpenAI chat completions endpoint.
    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string())
    }

    /// Returns the AI model name. Defaults to "gpt-4o-mini".
    pub fn ai_model_or_default(&self) -> String {
        self.ai_model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".to_string())
    }

    pub fn ai_timeout_secs_or_default(&self) -> u64 {
        self.ai_timeout_secs.unwrap_or(DEFAULT_AI_TIMEOUT_SECS)
    }

    /// Returns true if AI is configured (API key present).
    pub fn is_ai_configured(&self) -> bool {
        self.ai_api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data_dir_or_default(), PathBuf::from("./data"));
        assert_eq!(cfg.storage_backend_or_default(), StorageBackend::Json);
        assert_eq!(cfg.history_limit_or_default(), 10);
        assert_eq!(cfg.ai_model_or_default(), "gpt-4o-mini");
        assert!(!cfg.is_ai_configured());
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let cfg = AppConfig {
            ai_api_key: Some("  ".to_string()),
            history_limit: Some(0),
            ..Default::default()
        };
        assert!(!cfg.is_ai_configured());
        assert_eq!(cfg.history_limit_or_default(), DEFAULT_HISTORY_LIMIT);
    }

    fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_load_reads_only_given_environment() {
        let cfg = AppConfig::load_from(vars(&[])).unwrap();
        assert_eq!(cfg.data_dir_or_default(), PathBuf::from("./data"));
        assert!(!cfg.is_ai_configured());

        let cfg = AppConfig::load_from(vars(&[
            ("EXPENSES_STORAGE_BACKEND", "memory"),
            ("EXPENSES_HISTORY_LIMIT", "3"),
            ("EXPENSES_AI_API_KEY", "sk-test"),
            ("OTHER_HISTORY_LIMIT", "99"),
        ]))
        .unwrap();
        assert_eq!(cfg.storage_backend_or_default(), StorageBackend::Memory);
        assert_eq!(cfg.history_limit_or_default(), 3);
        assert_eq!(cfg.ai_api_key().as_deref(), Some("sk-test"));
        // Loading never touches the process environment.
        assert!(std::env::var("EXPENSES_AI_API_KEY").map_or(true, |k| k != "sk-test"));
    }

    #[test]
    fn test_environment_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.toml");
        std::fs::write(&path, "history_limit = 25\nai_model = \"llama3.2\"\n").unwrap();

        let cfg = AppConfig::load_from(vars(&[
            ("EXPENSES_CONFIG", path.to_str().unwrap()),
            ("EXPENSES_HISTORY_LIMIT", "7"),
        ]))
        .unwrap();
        assert_eq!(cfg.history_limit_or_default(), 7);
        assert_eq!(cfg.ai_model_or_default(), "llama3.2");
    }

    #[test]
    fn test_deserialize_from_file_source() {
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "storage_backend = \"sqlite\"\nhistory_limit = 25\nai_model = \"llama3.2\"",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.storage_backend_or_default(), StorageBackend::Sqlite);
        assert_eq!(cfg.history_limit_or_default(), 25);
        assert_eq!(cfg.ai_model_or_default(), "llama3.2");
    }
}
