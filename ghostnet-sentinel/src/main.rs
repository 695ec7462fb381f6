//! GHOSTNET Sentinel CLI
//!
//! Entry point for the wallet-monitoring binary. Provides subcommands for:
//! - `run` - start the Sentinel pipeline and HTTP/WebSocket surface
//! - `version` - print version information

use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use tracing::{error, info, warn};

use evm_provider::StandardEvmProvider;
use ghostnet_sentinel::chain::ChainClient;
use ghostnet_sentinel::config::Settings;
use ghostnet_sentinel::coordinator::Coordinator;
use ghostnet_sentinel::error::AppError;
use ghostnet_sentinel::features::FeatureExtractor;
use ghostnet_sentinel::flag_registry::FlagRegistryClient;
use ghostnet_sentinel::hub::Hub;
use ghostnet_sentinel::ingester::Ingester;
use ghostnet_sentinel::scoring::ScoringEngine;
use ghostnet_sentinel::{api, hub, metrics};

/// GHOSTNET Sentinel
#[derive(Parser, Debug)]
#[command(name = "ghostnet-sentinel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Runtime environment name, selects `config/{environment}.toml`.
    #[arg(short, long, env = "SENTINEL_ENV", default_value = "development")]
    environment: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Sentinel pipeline and HTTP/WebSocket surface.
    Run,

    /// Show version information.
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            let settings = Settings::load(&cli.environment).wrap_err("failed to load configuration")?;
            init_logging(&settings.logging)?;
            run(settings).await
        }
        Commands::Version => {
            println!("ghostnet-sentinel {}", ghostnet_sentinel::version());
            Ok(())
        }
    }
}

async fn run(settings: Settings) -> Result<()> {
    info!(
        version = ghostnet_sentinel::version(),
        chain_id = settings.rpc.chain_id,
        has_signer = settings.has_signer(),
        has_flag_registry = settings.has_flag_registry(),
        "Starting GHOSTNET Sentinel"
    );

    if let Err(errors) = settings.validate() {
        for err in &errors {
            error!(error = %err, "configuration error");
        }
        return Err(eyre::eyre!("invalid configuration ({} error(s))", errors.len()));
    }

    let metrics_handle = metrics::install(&settings.metrics).wrap_err("failed to install metrics exporter")?;
    if metrics_handle.is_some() {
        info!(addr = %settings.metrics.socket_addr(), "Prometheus exporter listening");
    }

    let provider = Arc::new(
        StandardEvmProvider::new(&settings.rpc.url)
            .await
            .map_err(|err| eyre::eyre!("failed to connect to chain RPC: {err}"))?,
    );
    let chain = Arc::new(ChainClient::new(provider, &settings.rpc));
    let ingester = Arc::new(Ingester::new(Arc::clone(&chain), None));
    let extractor = Arc::new(FeatureExtractor::new());
    let scoring = Arc::new(ScoringEngine::load(&settings.model));
    if scoring.is_model_loaded() {
        info!("scoring model loaded, ML inference enabled");
    } else {
        warn!("no scoring model configured, running rule-based fallback only");
    }

    let flag_registry = if settings.has_flag_registry() {
        match FlagRegistryClient::new(Arc::clone(&chain), &settings.contracts, &settings.rpc) {
            Ok(client) => Some(Arc::new(client)),
            Err(AppError::Domain(domain)) => {
                warn!(error = %domain, "flag registry disabled");
                None
            }
            Err(err) => return Err(eyre::eyre!("failed to build flag registry client: {err}")),
        }
    } else {
        info!("no flag registry contract configured, flagging endpoints disabled");
        None
    };

    let hub = Arc::new(Hub::new(settings.hub.clone()));
    let coordinator = Arc::new(Coordinator::new(
        Arc::clone(&chain),
        ingester,
        extractor,
        scoring,
        flag_registry.clone(),
        Arc::clone(&hub),
        None,
        settings.coordinator.clone(),
    ));

    let (heartbeat_task, reaper_task) = hub::spawn_background_tasks(Arc::clone(&hub));
    let batch_task = coordinator.spawn_batch_processor();

    let facade = Arc::new(api::ApiFacade::new(Arc::clone(&coordinator), flag_registry));
    let state = api::AppState { facade, hub: Arc::clone(&hub) };
    let router = api::build_router(state, &settings.api);

    let listener = tokio::net::TcpListener::bind(settings.api.socket_addr())
        .await
        .wrap_err("failed to bind HTTP listener")?;
    info!(addr = %settings.api.socket_addr(), "HTTP/WebSocket surface listening");

    if let Err(err) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %err, "HTTP server error");
    }

    heartbeat_task.abort();
    reaper_task.abort();
    batch_task.abort();

    info!("GHOSTNET Sentinel stopped");
    Ok(())
}

/// Initialize the tracing subscriber for logging, per [`LoggingSettings`].
fn init_logging(settings: &ghostnet_sentinel::config::LoggingSettings) -> Result<()> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.level.clone()));

    let _guard = if let Some(path) = &settings.file_path {
        let file_appender = tracing_appender::rolling::daily(
            std::path::Path::new(path).parent().unwrap_or_else(|| std::path::Path::new(".")),
            std::path::Path::new(path).file_name().unwrap_or_default().to_string_lossy().to_string(),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        if settings.format == "json" {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(non_blocking))
                .try_init()
                .map_err(|err| eyre::eyre!("failed to init logging: {err}"))?;
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(non_blocking))
                .try_init()
                .map_err(|err| eyre::eyre!("failed to init logging: {err}"))?;
        }
        Some(guard)
    } else {
        if settings.format == "json" {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .try_init()
                .map_err(|err| eyre::eyre!("failed to init logging: {err}"))?;
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .try_init()
                .map_err(|err| eyre::eyre!("failed to init logging: {err}"))?;
        }
        None
    };

    // Leak the guard so the non-blocking writer keeps flushing for the life
    // of the process; the binary only exits via process termination.
    std::mem::forget(_guard);
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => error!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => warn!("received Ctrl+C, initiating graceful shutdown"),
        () = terminate => warn!("received SIGTERM, initiating graceful shutdown"),
    }
}
