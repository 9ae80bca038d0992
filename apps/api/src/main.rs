mod compile;
mod config;
mod errors;
mod models;
mod render;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::compile::{spawn_sweep_worker, DocumentCompiler, LatexCompiler, LatexSettings};
use crate::config::Config;
use crate::render::deedy::deedy_compiler;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (malformed values abort startup)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    tokio::fs::create_dir_all(&config.scratch_dir)
        .await
        .with_context(|| format!("create scratch root {}", config.scratch_dir.display()))?;

    let settings = LatexSettings::from_config(&config);
    info!(
        engine = %settings.engine,
        passes = settings.passes,
        timeout_secs = settings.timeout.as_secs(),
        scratch_root = %settings.scratch_root.display(),
        "LaTeX compiler configured"
    );

    let deedy = match deedy_compiler(&config).await? {
        Some(compiler) => {
            info!(engine = %config.deedy_latex_engine, "Deedy resume style enabled");
            let compiler: Arc<dyn DocumentCompiler> = Arc::new(compiler);
            Some(compiler)
        }
        None => {
            info!("DEEDY_CLASS_PATH not set, Deedy resume style disabled");
            None
        }
    };

    let shutdown_token = CancellationToken::new();
    let sweeper = spawn_sweep_worker(
        config.scratch_dir.clone(),
        config.sweep_interval,
        config.sweep_max_age,
        shutdown_token.clone(),
    );

    let state = AppState {
        compiler: Arc::new(LatexCompiler::new(settings)),
        deedy_compiler: deedy,
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_url
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid FRONTEND_URL {}", config.frontend_url))?,
        )
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token))
        .await?;

    if let Err(e) = sweeper.await {
        tracing::error!(error = %e, "Scratch sweep worker did not stop cleanly");
    }
    info!("Server shutdown complete");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM and cancels background workers.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }

    shutdown_token.cancel();
}
