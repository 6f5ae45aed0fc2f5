/// Server setup and initialization
///
/// Wires together all components: step registry, stores, runner, broadcaster,
/// and HTTP routes. Provides the main application factory function for
/// creating the Axum app.

use crate::{
    api::{create_graph_routes, create_log_routes, AppState},
    config::Config,
    runtime::{broadcast::StepBroadcaster, runner::GraphRunner},
    steps::registry::StepRegistry,
    workflow::store::{GraphStore, RunStore},
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Create the main Axum application with all routes
///
/// Initializes all components and wires them together into a complete
/// application: registry seeded with the builtin steps, the in-memory graph
/// and run stores, the notification broadcaster, and the traversal engine.
pub fn create_app(config: &Config) -> Router {
    tracing::info!("📋 Seeding step registry with builtin code-review steps");
    let registry = Arc::new(StepRegistry::with_builtins());

    tracing::info!("🗄️ Initializing graph and run stores");
    let graphs = Arc::new(GraphStore::new());
    let runs = Arc::new(RunStore::new());

    tracing::info!(
        "📡 Initializing step broadcaster (capacity {})",
        config.engine.notify_capacity
    );
    let broadcaster = Arc::new(StepBroadcaster::new(config.engine.notify_capacity));

    tracing::info!("⚙️ Initializing graph runner");
    let runner = Arc::new(GraphRunner::new(
        Arc::clone(&graphs),
        Arc::clone(&runs),
        Arc::clone(&broadcaster),
    ));

    let app_state = AppState {
        registry,
        graphs,
        runs,
        runner,
        broadcaster,
    };

    tracing::info!("🔗 Creating HTTP router with all endpoints");
    Router::new()
        .route("/healthz", get(health_check))
        .merge(create_graph_routes().with_state(app_state.clone()))
        .merge(create_log_routes().with_state(app_state))
}

/// Start the HTTP server with the given configuration
///
/// Creates the application and starts the Axum server on the configured
/// address and port.
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting Stateflow server...");

    let app = create_app(&config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
