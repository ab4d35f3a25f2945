//! Application entry point and server initialization
//!
//! Startup order:
//! - load `.env` and read configuration
//! - open the database and make sure the uploads directory exists
//! - seed demo recipes into an empty store
//! - bind the listener and serve until SIGINT/SIGTERM

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use recipebook::config::Config;
use recipebook::database::{init_db, AppState};
use recipebook::route::create_app;
use recipebook::seed::seed_demo;
use recipebook::store::RecipeStore;
use recipebook::upload::UploadStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("recipebook=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    let db = init_db(&config.database_url)
        .with_context(|| format!("failed to open database {}", config.database_url))?;

    let uploads = UploadStore::new(&config.upload_dir);
    uploads
        .ensure_dir()
        .with_context(|| format!("failed to create {}", config.upload_dir.display()))?;

    let state = AppState {
        store: RecipeStore::new(Arc::new(db)),
        uploads,
    };

    // seeding failures are logged; the server still starts
    if let Err(err) = seed_demo(&state.store) {
        error!(error = %err, "Seed error");
    }

    let app = create_app(state, &config.public_dir).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Server running at http://localhost:{}", config.port);
    info!("Using database: {}", config.database_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on Unix, so in-flight requests and open
/// write transactions can finish before exit.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
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

    info!("Shutdown signal received, stopping server.");
}
