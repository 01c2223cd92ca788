mod bootstrap;
mod health;
mod webhook;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dialogbridge_core::config::{AppConfig, LoadOptions};
use dialogbridge_session::SessionStore;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) {
    use dialogbridge_core::config::LogFormat::*;

    // RUST_LOG wins over the configured level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    let sweeper = spawn_session_sweeper(
        app.sessions.clone(),
        Duration::from_secs(app.config.session.ttl_secs),
        Duration::from_secs(app.config.session.sweep_interval_secs),
    );

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    let router = app.router().layer(TraceLayer::new_for_http());

    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        intents = app.registry.len(),
        "dialogbridge-server listening"
    );

    let shutdown = Arc::new(Notify::new());
    let server = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { shutdown.notified().await })
                .await
        })
    };

    wait_for_shutdown().await?;
    tracing::info!(
        event_name = "system.server.stopping",
        grace_secs = app.config.server.graceful_shutdown_secs,
        "dialogbridge-server stopping"
    );

    shutdown.notify_one();
    sweeper.abort();

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => tracing::warn!(
            event_name = "system.server.shutdown_timeout",
            grace_secs = app.config.server.graceful_shutdown_secs,
            "in-flight requests did not finish before the grace period"
        ),
    }

    Ok(())
}

fn spawn_session_sweeper(
    sessions: Arc<dyn SessionStore>,
    ttl: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            let evicted = sessions.evict_idle(ttl).await;
            if evicted > 0 {
                let remaining = sessions.len().await;
                tracing::info!(
                    event_name = "session.sweep.evicted",
                    evicted,
                    remaining,
                    "idle sessions evicted"
                );
            }
        }
    })
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
