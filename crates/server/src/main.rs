mod auth;
mod config;
mod error;
mod http;
mod state;

use adapter::{MemoryStore, PostStore};
use anyhow::Context;
use dotenvy::dotenv;
use std::{sync::Arc, time::Duration};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Settings;
use http::router::build_router;
use state::AppState;
use storage::Db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new().context("Failed to load configuration")?;
    if settings.security.session_secret == "change_me_please" {
        warn!("Using the default session secret; set CAMPUSWORK_SECURITY__SESSION_SECRET");
    }

    let store: Arc<dyn PostStore> = if settings.database.url == "memory" {
        warn!("Posts are kept in memory and will be lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            Db::new(&settings.database.url)
                .await
                .with_context(|| format!("Failed to open database {}", settings.database.url))?,
        )
    };

    let (tx_cmd, rx_cmd) = mpsc::channel(settings.worker.queue_size);
    let (tx_events, _rx_events) = broadcast::channel(settings.worker.queue_size);
    let cancel_token = CancellationToken::new();

    let worker = {
        let store = store.clone();
        let tx_events = tx_events.clone();
        let cancel_token = cancel_token.clone();
        tokio::spawn(async move {
            if let Err(e) =
                adapter::start_with_cancel_token(store, rx_cmd, tx_events, cancel_token).await
            {
                tracing::error!("Thread worker crashed: {:?}", e);
            }
        })
    };

    let state = AppState {
        store,
        sender: tx_cmd,
        tx_events,
        session_secret: settings.security.session_secret.as_str().into(),
        reply_timeout: Duration::from_secs(settings.worker.reply_timeout_secs),
    };

    let app = build_router(state, &settings.server.cors_origins);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel_token.cancel();
    worker.await.context("Thread worker panicked")?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
