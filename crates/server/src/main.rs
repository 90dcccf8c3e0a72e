use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use depot_core::routes::RoutePolicy;
use depot_registry::FileRegistry;
use depot_server::api::AppState;
use depot_server::backend_factory;
use depot_server::config::DepotConfig;

/// Depot file-sharing gateway HTTP server.
#[derive(Parser, Debug)]
#[command(name = "depot-server", about = "HTTP server for the Depot file-sharing gateway")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "depot.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration from the TOML file, or use defaults if it does
    // not exist.
    let mut config: DepotConfig = if Path::new(&cli.config).exists() {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        info!(path = %cli.config, "config file not found, using defaults");
        DepotConfig::default()
    };

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Resolve the backend connection values from the environment. Missing
    // values are logged and startup proceeds; backend calls will fail at
    // call time until they are provided.
    config.backend.resolve_env();
    let missing: Vec<String> = config
        .backend
        .missing_values()
        .into_iter()
        .map(str::to_owned)
        .collect();
    for name in &missing {
        warn!(name, "backend configuration value missing; backend calls will fail");
    }

    let (auth, blob, records) = backend_factory::create_backend(&config.backend);
    let registry = Arc::new(FileRegistry::new(blob, records));

    let state = AppState {
        auth,
        registry,
        policy: Arc::new(RoutePolicy::default()),
        external_url: config.server.external_url(),
        backend_kind: config.backend.kind.as_str(),
        missing_config: Arc::new(missing),
    };
    let app = depot_server::api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "depot server listening");

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("depot server stopped");
    Ok(())
}

/// Resolve when ctrl-c arrives; in-flight requests get until the shutdown
/// timeout to finish after that.
async fn shutdown_signal(timeout: Duration) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    info!(timeout_seconds = timeout.as_secs(), "shutdown signal received");
}
