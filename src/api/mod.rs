/// HTTP API Layer
///
/// This module provides the request/response boundary of the engine:
/// - Graph creation, run triggering, and run-state queries
/// - Live step-notification streaming over WebSocket

// Graph lifecycle endpoints (create/run/query)
pub mod graphs;

// WebSocket log streaming endpoint
pub mod logs;

// Re-export router builders and shared state
pub use graphs::{create_graph_routes, AppState};
pub use logs::create_log_routes;
