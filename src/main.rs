//! aihub - AI feature gateway
//!
//! Proxies prompts to hosted inference providers (Hugging Face,
//! AssemblyAI) behind a per-user usage-limit gate and tracks realtime
//! usage analytics. Features whose provider key is absent run in demo
//! mode and answer from the fallback catalog.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aihub::analytics::{spawn_aggregation_tick, RealtimeAnalytics};
use aihub::config::{Args, Config};
use aihub::events::EventBus;
use aihub::providers::assemblyai::AssemblyAiClient;
use aihub::providers::fallback::FallbackCatalog;
use aihub::providers::huggingface::HuggingFaceClient;
use aihub::usage::UsageGate;
use aihub::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting aihub (AI feature gateway)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::resolve(args)?;
    info!("Database: {}", config.database.display());

    let db_pool = aihub::db::init_database_pool(&config.database).await?;
    info!("Database connection established");

    let event_bus = EventBus::new(100);

    let analytics = Arc::new(RealtimeAnalytics::new(event_bus.clone()));
    spawn_aggregation_tick(analytics.clone());

    let gate = UsageGate::new(
        db_pool.clone(),
        config.free_tier_limit,
        config.bypass_limits,
    );
    if config.bypass_limits {
        warn!("Usage-limit enforcement is DISABLED (bypass flag set)");
    }

    let hf = HuggingFaceClient::new(config.huggingface_api_key.clone())?;
    if !hf.has_api_key() {
        warn!("HUGGINGFACE_API_KEY not set; HF-backed features run in demo mode");
    }
    let lemur = AssemblyAiClient::new(config.assemblyai_api_key.clone())?;
    if !lemur.has_api_key() {
        warn!("ASSEMBLYAI_API_KEY not set; content generation runs in demo mode");
    }

    let catalog = Arc::new(FallbackCatalog::with_overrides(config.fallbacks.clone()));

    let state = AppState::new(db_pool, event_bus, analytics, gate, hf, lemur, catalog);
    let app = aihub::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Listening on http://{}", config.bind_addr());
    info!("Health check: http://{}/health", config.bind_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
