//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use cycle_sync::adapters::ml::{FsArtifactSource, HttpArtifactSource};
use cycle_sync::adapters::persistence::SqliteLogStore;
use cycle_sync::adapters::ui::TuiInputPort;
use cycle_sync::domain::RuleTable;
use cycle_sync::ports::{ArtifactSource, InputPort, LogStorePort, LogWriterPort};
use cycle_sync::shared::config::AppConfig;
use cycle_sync::usecases::{
    ChatService, CyclePredictor, HistoryService, IntentClassifier, ReportService,
};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });

    let data_path = PathBuf::from(cfg.data_dir_or_default());
    info!(path = %data_path.display(), "data directory");

    // --- Storage ---
    let sqlite = Arc::new(
        SqliteLogStore::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );
    let store: Arc<dyn LogStorePort> = Arc::clone(&sqlite) as Arc<dyn LogStorePort>;
    let writer: Arc<dyn LogWriterPort> = Arc::clone(&sqlite) as Arc<dyn LogWriterPort>;

    // --- Model artifacts (HTTP if configured, else local directory) ---
    let artifacts: Arc<dyn ArtifactSource> = match cfg.models_url() {
        Some(url) => {
            let timeout = Duration::from_secs(cfg.artifact_timeout_secs_or_default());
            Arc::new(
                HttpArtifactSource::new(url, timeout)
                    .map_err(|e| anyhow::anyhow!("artifact client: {}", e))?,
            )
        }
        None => Arc::new(FsArtifactSource::new(cfg.models_dir_or_default())),
    };
    info!(source = %artifacts.describe(), "model artifacts");

    // --- Services ---
    let predictor = Arc::new(CyclePredictor::new(
        Arc::clone(&store),
        Some(Arc::clone(&artifacts)),
    ));
    let classifier = Arc::new(IntentClassifier::new(
        RuleTable::default(),
        Some(Arc::clone(&artifacts)),
    ));

    // Warm both models in the background; callers share the in-flight load.
    {
        let predictor = Arc::clone(&predictor);
        let classifier = Arc::clone(&classifier);
        tokio::spawn(async move {
            let (cycle, intent) = tokio::join!(predictor.warm_up(), classifier.warm_up());
            info!(cycle = ?cycle, intent = ?intent, "model warm-up finished");
        });
    }

    let reports = Arc::new(ReportService::new(
        Arc::clone(&store),
        Arc::clone(&predictor),
        data_path.join("reports"),
    ));
    let chat = Arc::new(ChatService::new(Arc::clone(&classifier)));
    let history = Arc::new(HistoryService::new(Arc::clone(&store), writer));

    let input_port: Arc<dyn InputPort> = Arc::new(
        TuiInputPort::new(predictor, reports, chat, history).with_rng_seed(cfg.rng_seed),
    );

    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
