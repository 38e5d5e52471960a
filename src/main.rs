//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use daily_expenses::adapters::ai::{MockSuggester, OpenAiSuggester};
use daily_expenses::adapters::persistence::{JsonFileStorage, MemoryStorage, SqliteStorage};
use daily_expenses::adapters::ui::tui::TuiInputPort;
use daily_expenses::ports::{CategorySuggesterPort, InputPort, StoragePort};
use daily_expenses::shared::config::{AppConfig, StorageBackend};
use daily_expenses::usecases::{ExpenseStore, ExportService, SuggestionService};
use dotenv::dotenv;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("invalid configuration ({}), using defaults", e);
            AppConfig::default()
        }
    };

    let data_path = cfg.data_dir_or_default();
    std::fs::create_dir_all(&data_path)
        .map_err(|e| anyhow::anyhow!("create data dir {}: {}", data_path.display(), e))?;
    init_tracing(&data_path)?;

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }
    let data_dir_abs = data_path
        .canonicalize()
        .unwrap_or_else(|_| data_path.clone());
    info!(path = %data_dir_abs.display(), "data directory");

    // --- Storage ---
    let backend = cfg.storage_backend_or_default();
    let storage: Arc<dyn StoragePort> = match backend {
        StorageBackend::Json => Arc::new(JsonFileStorage::new(&data_path)),
        StorageBackend::Sqlite => Arc::new(
            SqliteStorage::connect(&data_path)
                .await
                .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
        ),
        StorageBackend::Memory => {
            warn!("memory storage selected, expenses will not be saved");
            Arc::new(MemoryStorage::new())
        }
    };
    info!(?backend, "storage backend ready");

    let store = Arc::new(
        ExpenseStore::load(storage)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?,
    );

    // --- Category suggestion ---
    let suggester: Arc<dyn CategorySuggesterPort> = if cfg.is_ai_configured() {
        info!(
            model = %cfg.ai_model_or_default(),
            url = %cfg.ai_api_url_or_default(),
            "category suggestion enabled with OpenAI adapter"
        );
        Arc::new(
            OpenAiSuggester::new(
                cfg.ai_api_url_or_default(),
                cfg.ai_api_key().unwrap_or_default(),
                cfg.ai_model_or_default(),
                Duration::from_secs(cfg.ai_timeout_secs_or_default()),
            )
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        )
    } else {
        warn!("EXPENSES_AI_API_KEY not set, using mock category suggester");
        Arc::new(MockSuggester::new())
    };
    let suggestions = Arc::new(SuggestionService::new(suggester));
    let export = Arc::new(ExportService::new(data_path.join("reports")));

    daily_expenses::adapters::ui::init_ui();

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        Arc::clone(&store),
        suggestions,
        export,
        cfg.history_limit_or_default(),
    ));

    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("session ended");
    Ok(())
}

/// Log to `<data_dir>/expenses.log` so output does not interleave with prompts.
/// Level from RUST_LOG, default info.
fn init_tracing(data_path: &Path) -> anyhow::Result<()> {
    let log_path = data_path.join("expenses.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| anyhow::anyhow!("open log file {}: {}", log_path.display(), e))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();
    Ok(())
}
