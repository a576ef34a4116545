//! TrendSniper - AI-powered product & ad mention analyzer
//!
//! HTTP backend that scans page content for product/ad mentions using a
//! generative model and maintains a ranked popularity leaderboard.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

use trendsniper::analyze::Analyzer;
use trendsniper::api::{build_app, AppState};
use trendsniper::cli::Args;
use trendsniper::client::OpenRouterClient;
use trendsniper::config::Config;
use trendsniper::leaderboard::{InMemoryStore, Leaderboard};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("TrendSniper v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let api_key = std::env::var(&config.model.api_key_env).unwrap_or_else(|_| {
        warn!(
            "{} is not set; model calls will fail until it is provided",
            config.model.api_key_env
        );
        String::new()
    });

    info!("Model: {} via {}", config.model.name, config.model.base_url);

    // Wire up the pipeline: model client -> analyzer -> leaderboard
    let model = Arc::new(OpenRouterClient::new(&config.model, api_key));
    let store = Arc::new(InMemoryStore::new());
    let leaderboard = Leaderboard::new(store);
    let analyzer = Arc::new(Analyzer::new(model, leaderboard.clone(), &config));

    let state = AppState {
        analyzer,
        leaderboard,
        verify_codes: Arc::new(config.verify.codes.clone()),
        proxy_client: reqwest::Client::new(),
        top_limit: config.leaderboard.top_limit,
    };

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    info!("TrendSniper backend live on http://{}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Handle --init-config: generate a default .trendsniper.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".trendsniper.toml");

    if path.exists() {
        eprintln!("⚠️  .trendsniper.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .trendsniper.toml")?;

    println!("✅ Created .trendsniper.toml with default settings.");
    println!("   Edit it to customize model, tier caps, verify codes, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .trendsniper.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Completes when the process receives ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("received shutdown signal, starting graceful shutdown");
}
