//! bizhub server binary.
//!
//! Loads configuration from the environment, wires the adapters into the
//! application services and serves the HTTP API.

use std::sync::Arc;

use anyhow::Context;
use http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bizhub::adapters::backend::{PostgrestClient, PostgrestConfig};
use bizhub::adapters::http::{app_router, AppState};
use bizhub::adapters::realtime::InMemoryRealtimeTransport;
use bizhub::adapters::storage::{
    FileKeyValueStore, InMemoryTrackingLinkLedger, KeyValueTrackingLinkLedger,
};
use bizhub::application::{
    ChannelRegistry, DecisionRepository, DecisionService, DeliveryTracking, PreferencesRepository,
};
use bizhub::config::{AppConfig, CorsPolicy, ServerConfig};
use bizhub::domain::delivery::TrackingLinkSigner;
use bizhub::ports::{KeyValueStore, TrackingLinkLedger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config);
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        environment = %config.server.environment,
        data_dir = %config.storage.data_dir.display(),
        "Starting bizhub"
    );

    let store: Arc<dyn KeyValueStore> =
        Arc::new(FileKeyValueStore::new(&config.storage.data_dir));

    let ledger: Arc<dyn TrackingLinkLedger> = if config.features.persist_tracking_links {
        Arc::new(KeyValueTrackingLinkLedger::new(store.clone()))
    } else {
        Arc::new(InMemoryTrackingLinkLedger::new())
    };

    let backend = PostgrestConfig::new(&config.backend.url, config.backend.anon_key.clone())
        .with_timeout(config.backend.timeout())
        .with_auth_timeout(config.backend.auth_timeout());
    let backend =
        Arc::new(PostgrestClient::new(backend).context("Failed to create backend client")?);

    let transport = Arc::new(InMemoryRealtimeTransport::new(config.delivery.channel_capacity));
    let channels = Arc::new(ChannelRegistry::new(transport));
    let signer = TrackingLinkSigner::new(
        &config.delivery.tracking_base_url,
        config.delivery.link_signing_secret.clone(),
        config.delivery.link_ttl_secs,
    );

    let decisions = DecisionService::load(DecisionRepository::new(store.clone())).await;
    let delivery = Arc::new(DeliveryTracking::new(
        channels.clone(),
        ledger,
        backend,
        signer,
    ));

    let state = AppState {
        decisions: Arc::new(decisions),
        preferences: PreferencesRepository::new(store),
        delivery: delivery.clone(),
        channels,
    };

    let app = app_router(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    delivery.end_all().await;
    tracing::info!("Shut down");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.features.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    match server.cors_policy() {
        CorsPolicy::AllowAny => layer.allow_origin(Any),
        CorsPolicy::Origins(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(origins)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
