//! MedPredict Server
//!
//! Serves the diabetes, heart, Parkinson's and common-disease models over
//! HTTP. All artifacts are loaded before the listener is bound; a missing
//! artifact aborts startup.

use anyhow::{Context, Result};
use clap::Parser;
use medpredict_models::ModelsConfig;
use medpredict_server::{create_router, AppState, ServerConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "medpredict-server")]
#[command(about = "MedPredict health prediction API", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "server.yaml")]
    config: PathBuf,

    /// Models catalog (YAML)
    #[arg(short, long, env = "MEDPREDICT_MODELS_CONFIG")]
    models: Option<PathBuf>,

    /// Override the models catalog's base directory
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long, env = "HOST")]
    host: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "PORT")]
    port: Option<u16>,

    /// Key required in the x-api-key header
    #[arg(long, env = "MODEL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Debug mode
    #[arg(long, env = "DEBUG")]
    debug: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Apply command line and environment overrides
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = api_key.clone();
        }
        if let Some(models) = &self.models {
            config.models_config = Some(models.clone());
        }
        config.debug |= self.debug;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ServerConfig::load(&cli.config).context("Failed to load server config")?;
    cli.apply(&mut config);

    init_tracing(cli.verbose || config.debug);

    info!("Starting MedPredict Server");

    let mut models = ModelsConfig::load(config.models_config.as_deref())
        .context("Failed to load models config")?;
    if let Some(base_dir) = &cli.base_dir {
        models = models.with_base_dir(base_dir);
    }
    info!("Configured models: {}", models.model_keys().join(", "));

    let metrics_handle = init_metrics()?;

    let addr = config.socket_addr()?;
    let state = AppState::initialize(config, &models)
        .context("Model loading failed")?
        .with_metrics(metrics_handle);
    info!("Application state initialized successfully");

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("medpredict=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("medpredict=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "medpredict_requests_total",
        "Total number of prediction requests by domain"
    );
    metrics::describe_counter!(
        "medpredict_degraded_inputs_total",
        "Requests with unrecognized answers replaced by sentinels"
    );
    metrics::describe_histogram!(
        "medpredict_inference_latency_us",
        metrics::Unit::Microseconds,
        "Model inference latency in microseconds by domain"
    );
    metrics::describe_counter!("medpredict_errors_total", "Total number of errors by kind");

    info!("Metrics exporter initialized");
    Ok(handle)
}
