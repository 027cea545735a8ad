//! CalBot API: conversational scheduling server.
//!
//! Usage: `cb-api [config.toml]`. Without a path the built-in defaults are
//! used; `CALBOT_TIMEZONE` and `FALLBACK_ENABLED` override either.

use std::sync::Arc;

use cb_api::{ApiConfig, AppState, build_router};
use cb_dialogue::{DialogueEngine, FallbackResponder, MockCalendar, OllamaFallback, StaticFallback};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cb-api starting");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path = %path, "loading config");
            ApiConfig::from_file(&path)?
        }
        None => ApiConfig::default(),
    }
    .with_env();
    let tz = config.timezone()?;

    let fallback: Arc<dyn FallbackResponder> = if config.fallback.enabled {
        tracing::info!(host = %config.fallback.host, model = %config.fallback.model, "ollama fallback enabled");
        Arc::new(OllamaFallback::new(config.fallback.clone()))
    } else {
        Arc::new(StaticFallback)
    };

    tracing::warn!("no external calendar configured, using in-memory calendar");
    let engine = DialogueEngine::new(Arc::new(MockCalendar::new()), fallback, tz);
    let app = build_router(AppState::new(engine));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, timezone = %tz, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
