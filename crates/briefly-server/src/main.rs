mod config;
mod http;
mod identity;

use std::sync::Arc;
use std::time::Instant;

use axum::middleware;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use briefly_core::{
    BriefingService, BriefingStore, CompletionClient, GroqClient, MemoryStore, SupabaseStore,
};

use config::Config;
use identity::{GoTrueIdentity, IdentityProvider, StaticIdentity};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    info!("Starting briefly server v{}", env!("CARGO_PKG_VERSION"));
    info!("Completion model: {}", config.completion_model);

    let completion: Arc<dyn CompletionClient> = Arc::new(GroqClient::new(
        config.groq_api_key.clone(),
        config.completion_model.clone(),
        config.completion_timeout(),
    )?);

    let store: Arc<dyn BriefingStore> = match config.store.as_str() {
        "memory" => {
            warn!("Using the in-memory store: briefings vanish on restart");
            Arc::new(MemoryStore::default())
        }
        _ => Arc::new(SupabaseStore::new(
            config.supabase_url.clone(),
            config.supabase_key.clone(),
        )?),
    };
    info!("Store backend: {}", config.store);

    let identity: Arc<dyn IdentityProvider> = if config.auth_disabled {
        warn!("Auth disabled: every request runs as the local development user");
        Arc::new(StaticIdentity::dev())
    } else {
        Arc::new(GoTrueIdentity::new(
            config.supabase_url.clone(),
            config.supabase_key.clone(),
        )?)
    };

    let state = http::AppState {
        service: Arc::new(BriefingService::new(completion, store)),
        start_time: Instant::now(),
    };

    let auth_disabled = config.auth_disabled;
    let app = http::create_router(state)
        .layer(middleware::from_fn(move |req, next| {
            let identity = identity.clone();
            async move { http::auth::check(req, next, identity, auth_disabled).await }
        }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!("Starting HTTP server on {}", config.http_addr);
    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, terminating...");
}
