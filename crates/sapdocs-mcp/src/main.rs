//! Server binary: loads the catalog and index, then serves the streaming
//! HTTP transport until interrupted.
//!
//! Configuration comes from the environment: `SAPDOCS_PORT`,
//! `SAPDOCS_BIND`, `SAPDOCS_LOG`, `SAPDOCS_LOG_FORMAT`, `SAPDOCS_DATA_DIR`
//! and `SAPDOCS_SOURCES_DIR`. A missing catalog or index, or an unbindable
//! port, is an unrecoverable startup failure with a non-zero exit code.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sapdocs_core::{
    AdapterSet, Catalog, DocumentFetcher, Registry, SearchEngine, SearchIndex, Storage,
};

use sapdocs_mcp::session::MAX_IDLE;
use sapdocs_mcp::{AppState, router};

/// Interval of the idle-session sweep.
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SAPDOCS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("SAPDOCS_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let storage = Storage::new().context("failed to open data directory")?;
    let mut catalog =
        Catalog::load(&storage).context("failed to load catalog (run the index build first)")?;
    if let Ok(sources_dir) = std::env::var("SAPDOCS_SOURCES_DIR") {
        catalog = catalog.with_sources_root(sources_dir);
    }
    let index = SearchIndex::open(&storage.index_dir())
        .context("failed to open full-text index (run the index build first)")?;
    let index_built_at: Option<DateTime<Utc>> = storage.catalog_modified().map(DateTime::from);

    let catalog = Arc::new(catalog);
    let registry = Arc::new(Registry::new());
    let adapters = Arc::new(AdapterSet::new().context("failed to initialize live adapters")?);

    let engine = Arc::new(SearchEngine::new(
        Arc::clone(&catalog),
        Some(index),
        Arc::clone(&registry),
        Arc::clone(&adapters),
    ));
    let fetcher = Arc::new(DocumentFetcher::new(catalog, registry, adapters));

    let state = Arc::new(AppState::new(engine, fetcher).with_index_built_at(index_built_at));

    // Background sweep of idle sessions and expired cache entries.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                let reaped = state.sessions.sweep(MAX_IDLE);
                if reaped > 0 {
                    info!(reaped, "idle sessions swept");
                }
                state.engine.adapters().cache().evict_expired();
            }
        });
    }

    let bind = std::env::var("SAPDOCS_BIND").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("SAPDOCS_PORT")
        .unwrap_or_else(|_| "3122".to_string())
        .parse()
        .context("SAPDOCS_PORT must be a port number")?;

    let listener = tokio::net::TcpListener::bind((bind.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {bind}:{port}"))?;
    info!(%bind, port, "listening");

    let sessions = Arc::clone(&state.sessions);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Close all sessions before exiting so in-flight requests abort.
    sessions.close_all();
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install interrupt handler");
    }
    info!("interrupt received, shutting down");
}
