//! LabTrack - Laboratory inventory management server
//!
//! Tracks chemicals and equipment, records usage and maintenance events,
//! raises alerts (low stock, expiration, maintenance due) and keeps an
//! append-only audit trail of administrative actions.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use labtrack::{api, config::LogFormat, db, middleware, services, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("LabTrack {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration first (before logging, so we know the log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must be kept alive for the duration of the program to
    // ensure log messages are flushed to files
    let _log_guard = init_logging(&config);

    info!("LabTrack starting up");

    ensure_data_directory(&config)?;

    info!("Initializing database connection");
    let db = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;

    let state = AppState {
        config: config.clone(),
        db: db.clone(),
    };

    // In-process sweep scheduler; disable to run sweeps via cron and the
    // run-notification-sweep binary instead
    if config.alerts.sweep_enabled {
        services::start_sweep_scheduler(db, config.alerts.clone());
    } else {
        info!("In-process notification sweep disabled");
    }

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Assemble the full router with middleware layers
fn build_router(state: AppState) -> Router {
    let protected = api::protected_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth_middleware,
    ));

    Router::new()
        .nest("/api", api::public_routes().merge(protected))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// Initialize logging based on configuration
fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match &config.logging.log_dir {
        None => {
            let registry = tracing_subscriber::registry().with(env_filter);
            match config.logging.format {
                LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
                LogFormat::Json => {
                    registry.with(tracing_subscriber::fmt::layer().json()).init()
                }
            }
            None
        }
        Some(log_dir) => {
            if let Err(e) = std::fs::create_dir_all(log_dir) {
                eprintln!("Warning: Failed to create log directory {:?}: {}", log_dir, e);
            }

            let appender =
                tracing_appender::rolling::daily(log_dir, &config.logging.log_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let registry = tracing_subscriber::registry().with(env_filter);
            match config.logging.format {
                LogFormat::Pretty => registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(writer)
                            .with_ansi(false),
                    )
                    .init(),
                LogFormat::Json => registry
                    .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                    .init(),
            }
            Some(guard)
        }
    }
}

/// Make sure the SQLite database directory exists
fn ensure_data_directory(config: &AppConfig) -> Result<()> {
    let url = &config.database.url;
    if let Some(path) = url.strip_prefix("sqlite://") {
        let path = path.split('?').next().unwrap_or(path);
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    warn!("Creating data directory {:?}", parent);
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create data directory {:?}", parent))?;
                }
            }
        }
    }
    Ok(())
}

fn print_help() {
    println!("LabTrack - Laboratory inventory management server");
    println!();
    println!("Usage:");
    println!("  labtrack [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -h, --help       Show this help message");
    println!("  -V, --version    Show version information");
    println!();
    println!("Configuration is read from config.yaml, config/config.yaml or");
    println!("/etc/labtrack/config.yaml (override with LABTRACK_CONFIG), with");
    println!("LABTRACK_* environment variables taking precedence.");
}
