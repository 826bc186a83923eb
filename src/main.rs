mod ai;
mod api;
mod app;
mod auth;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod middleware;
mod routes;
mod services;

use anyhow::{Context, Result};
use std::sync::Arc;

use ai::{DesignTask, SustainabilityTask, TaskRunner};
use services::{GeminiClient, MistralClient, PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;

    logging::init_logging(settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        extraction = ?settings.extraction_strategy,
        "Starting sustainable design backend"
    );

    let pool = db::create_pool(&settings).await?;
    let store = Arc::new(PgStore::new(pool));

    // Model clients are built once and shared by every request
    let gemini = GeminiClient::new(
        &settings.gemini_base_url,
        &settings.gemini_model,
        &settings.gemini_api_key,
        settings.ai_request_timeout,
    )
    .context("Failed to create Gemini client")?;
    let mistral = MistralClient::new(
        &settings.mistral_base_url,
        &settings.mistral_model,
        &settings.mistral_api_key,
        settings.ai_request_timeout,
    )
    .context("Failed to create Mistral client")?;

    let design_runner = TaskRunner::new(
        DesignTask,
        Arc::new(gemini),
        settings.extraction_strategy,
    );
    let scoring_runner = TaskRunner::new(
        SustainabilityTask,
        Arc::new(mistral),
        settings.extraction_strategy,
    );

    let jwks_cache = auth::JwksCache::new(
        reqwest::Client::new(),
        settings.supabase_jwt_jwks_url.clone(),
        settings.supabase_jwt_issuer.clone(),
        settings.supabase_jwt_audience.clone(),
        settings.jwks_cache_ttl_seconds,
    );

    if let Err(e) = jwks_cache.warm_cache().await {
        tracing::warn!(error = %e, "Failed to warm JWKS cache - will fetch on first request");
    }

    let state = app::AppState::new(
        settings.clone(),
        Arc::new(jwks_cache),
        store,
        design_runner,
        scoring_runner,
    );

    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
