use anyhow::{Context, anyhow};
use autoagents_llm::LLMProvider;
use autoagents_llm::backends::openai::OpenAI;
use autoagents_llm::builder::LLMBuilder;
use carewatch_config::{CarewatchConfig, StorageBackend};
use carewatch_core::CheckinService;
use carewatch_store::{
    FileObservationStore, FileProfileStore, MemoryObservationStore, MemoryProfileStore,
    ObservationStore, ProfileStore,
};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_DATA_DIR: &str = ".carewatch/data";
/// Pending check-ins finished per startup sweep.
const RECOVERY_BATCH: usize = 100;

/// Command-line options for the Carewatch API server.
#[derive(Parser, Debug, Default)]
#[command(name = "carewatch", version)]
struct Cli {
    /// Optional path to a carewatch.json5 config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Interface to bind
    #[arg(long)]
    host: Option<String>,
    /// Port to bind
    #[arg(long)]
    port: Option<u16>,
    /// Directory for the file store
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Chat model used for risk feedback
    #[arg(long)]
    model: Option<String>,
}

/// Entry point for the Carewatch API server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let llm = build_llm(&config)?;
    let (observations, profiles) = build_stores(&config)?;
    let service = Arc::new(CheckinService::from_config(
        &config,
        observations,
        profiles,
        llm,
    ));
    info!(
        "check-in service ready (provider_configured={}, history_window={})",
        service.provider_configured(),
        config.assessment.history_window
    );

    let startup = chrono::Utc::now();
    let recovery = service.clone();
    tokio::spawn(async move {
        if let Err(err) = recovery.recover_pending(RECOVERY_BATCH, startup).await {
            warn!("pending check-in recovery failed (error={})", err);
        }
    });

    let addr = tokio::net::lookup_host((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| format!("failed to resolve {}", config.server.host))?
        .next()
        .ok_or_else(|| anyhow!("no address for {}", config.server.host))?;
    carewatch_server::serve(service, addr, shutdown_signal())
        .await
        .context("api server failed")?;
    info!("carewatch stopped");
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<CarewatchConfig> {
    let mut config = if let Some(path) = cli.config.as_ref() {
        info!("loading config from path: {}", path.display());
        CarewatchConfig::load_from_path(path).context("failed to load config")?
    } else {
        let cwd = std::env::current_dir().context("cwd")?;
        info!("loading layered config from cwd: {}", cwd.display());
        let layered =
            CarewatchConfig::load_layered(&cwd).context("failed to load layered config")?;
        debug!("layered config loaded (layers={})", layered.layers.len());
        layered.config
    };
    apply_overrides(&mut config, cli);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Command-line flags win over every config layer.
fn apply_overrides(config: &mut CarewatchConfig, cli: &Cli) {
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(dir) = &cli.data_dir {
        config.storage.backend = StorageBackend::File;
        config.storage.path = Some(dir.to_string_lossy().to_string());
    }
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
}

/// Chat model for risk feedback, or `None` when no API key is present.
fn build_llm(config: &CarewatchConfig) -> anyhow::Result<Option<Arc<dyn LLMProvider>>> {
    let provider = &config.provider;
    let api_key = std::env::var(&provider.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty());
    let Some(api_key) = api_key else {
        info!(
            "no provider credentials, using trend fallback only (env={})",
            provider.api_key_env
        );
        return Ok(None);
    };
    info!("building reasoning provider (model={})", provider.model);
    let llm: Arc<dyn LLMProvider> = LLMBuilder::<OpenAI>::new()
        .api_key(api_key)
        .model(provider.model.clone())
        .temperature(provider.temperature)
        .max_tokens(provider.max_tokens)
        .build()
        .context("failed to build OpenAI LLM provider")?;
    Ok(Some(llm))
}

type Stores = (Arc<dyn ObservationStore>, Arc<dyn ProfileStore>);

fn build_stores(config: &CarewatchConfig) -> anyhow::Result<Stores> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("using in-memory storage; check-ins are lost on exit");
            Ok((
                Arc::new(MemoryObservationStore::new()),
                Arc::new(MemoryProfileStore::new()),
            ))
        }
        StorageBackend::File => {
            let root = data_dir(config);
            let observations = FileObservationStore::new(&root)
                .context("failed to open observation store")?;
            let profiles =
                FileProfileStore::new(&root).context("failed to open profile store")?;
            Ok((Arc::new(observations), Arc::new(profiles)))
        }
    }
}

fn data_dir(config: &CarewatchConfig) -> PathBuf {
    PathBuf::from(
        config
            .storage
            .path
            .clone()
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
    )
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal (error={})", err);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_override_config() {
        let mut config = CarewatchConfig::default();
        config.storage.backend = StorageBackend::Memory;
        let cli = Cli {
            host: Some("127.0.0.1".to_string()),
            port: Some(8080),
            data_dir: Some(PathBuf::from("/tmp/carewatch")),
            model: Some("gpt-4o-mini".to_string()),
            ..Cli::default()
        };
        apply_overrides(&mut config, &cli);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(data_dir(&config), PathBuf::from("/tmp/carewatch"));
        assert_eq!(config.provider.model, "gpt-4o-mini");
    }

    #[test]
    fn missing_flags_keep_defaults() {
        let mut config = CarewatchConfig::default();
        apply_overrides(&mut config, &Cli::default());
        assert_eq!(config.server.port, 5000);
        assert_eq!(data_dir(&config), PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn cli_parses_long_flags() {
        let cli = Cli::parse_from(["carewatch", "--port", "5001", "--data-dir", "data"]);
        assert_eq!(cli.port, Some(5001));
        assert_eq!(cli.data_dir, Some(PathBuf::from("data")));
    }
}
