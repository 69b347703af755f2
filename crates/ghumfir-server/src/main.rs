mod api;
mod middleware;

use std::sync::Arc;

use ghumfir_nearby::{HttpSource, MemoryCache, Resolver};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use crate::middleware::RateLimitState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(ghumfir_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting ghumfir-server");

    let popular = Arc::new(ghumfir_core::load_popular(&config.popular_path)?);
    tracing::info!(
        path = %config.popular_path.display(),
        count = popular.destinations.len(),
        "loaded popular destinations"
    );

    let resolver = Arc::new(Resolver::new(HttpSource::chain_from_config(&config)?));
    tracing::info!(sources = ?resolver.source_names(), "nearby source chain ready");

    let rate_limit = RateLimitState::from_config(&config);
    let state = AppState {
        resolver,
        popular,
        cache: Arc::new(MemoryCache::new()),
        config: Arc::clone(&config),
    };
    let app = build_app(state, rate_limit);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
