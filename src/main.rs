//! Salão24h engine
//!
//! Session and data-sync engine for the Salão24h salon-management client.

use salao24h_engine::{api, bus, config, coordinator::SessionCoordinator, providers};

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salao24h_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting Salão24h engine v{} ({})",
        env!("S24_VERSION"),
        env!("S24_GIT_SHA")
    );

    // Load configuration
    let config = config::load_config()?;
    tracing::info!("Configuration loaded, port: {}", config.port);

    // Create event bus
    let bus = bus::create_bus();
    tracing::info!("Event bus initialized");

    // Backend providers share one HTTP client (one session cookie jar)
    let backend_url = config.backend_url()?;
    let client = providers::build_client(config.request_timeout())?;
    let auth: Arc<dyn providers::AuthProvider> = Arc::new(providers::HttpAuthProvider::new(
        client.clone(),
        backend_url.clone(),
    ));
    let data: Arc<dyn providers::DataProvider> =
        Arc::new(providers::HttpDataProvider::new(client, backend_url));
    tracing::info!("Backend providers configured for {}", config.backend_url);

    // Session coordinator
    let coordinator = Arc::new(SessionCoordinator::new(auth, data.clone(), bus.clone()));
    let shutdown = CancellationToken::new();

    // Resolve any remembered session before the UI shell connects
    coordinator.restore_session().await;

    // Coordinator event loop (externally raised subscription events)
    let coordinator_task = tokio::spawn(
        coordinator.clone().run(shutdown.clone()),
    );

    // Background data sync with retry/backoff
    let sync = providers::SyncTask::new(data, coordinator.clone(), bus.clone(), shutdown.clone());
    let sync_task = tokio::spawn(sync.run_with_retry(providers::RetryConfig::default()));

    // Build API routes
    let state = api::AppState::new(coordinator, bus.clone());
    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup: stop background tasks
    tracing::info!("Shutting down tasks...");
    bus.publish(salao24h_engine::bus::AppEvent::ShuttingDown {
        reason: "signal".to_string(),
    });
    shutdown.cancel();
    let _ = sync_task.await;
    let _ = coordinator_task.await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
