/// Stateflow: Minimalist workflow graph execution engine
///
/// Main entry point for the Stateflow server. Initializes configuration and
/// starts the HTTP server with graph management and execution capabilities.

use stateflow::{config::Config, server::start_server};

/// Application entry point
///
/// Initializes the server with default configuration and starts listening
/// for requests. The server provides:
/// - Graph creation at POST /graph/create
/// - Graph execution at POST /graph/run
/// - Run-state queries at GET /graph/state/{run_id}
/// - Live step streaming at GET /ws/logs
/// - Health check at /healthz
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (defaults to 0.0.0.0:3010)
    let config = Config::default();

    // Start the server
    start_server(config).await?;

    Ok(())
}
