//! Triage Cloud Server binary

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_core::logic::config::SafetyConfig;

use triage_cloud::{config::Config, create_router, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Invalid configuration")?;

    // Initialize logging; JSON lines in production
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "triage_cloud=debug,triage_core=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Triage Cloud Server starting ({})", config.environment);
    tracing::info!("Database: {}", config.database_url.split('@').last().unwrap_or("***"));

    let table = config.load_scoring_table().context("Failed to load scoring table")?;
    tracing::info!(
        "Scoring profile: {} ({} categories)",
        table.profile.as_str(),
        table.categories.len()
    );

    SafetyConfig::set_adaptive_rules(config.adaptive_rules_enabled);
    SafetyConfig::set_learning(config.learning_enabled);
    if !config.adaptive_rules_enabled {
        tracing::warn!("Adaptive rules disabled; classification uses the base table only");
    }
    if !config.learning_enabled {
        tracing::warn!("Learning disabled; learning runs will not write rules");
    }

    // Initialize database pool
    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Running database migrations...");
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let state = AppState {
        pool,
        config: config.clone(),
        table: Arc::new(table),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
