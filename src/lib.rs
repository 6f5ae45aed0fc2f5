/// Stateflow: Minimalist workflow graph execution engine
///
/// This library provides a graph execution engine over a shared mutable
/// state object: named steps connected by plain or conditional transitions,
/// with per-step run history and live step streaming to subscribers.

// Core configuration and setup
pub mod config;

// Typed error taxonomy shared across layers
pub mod error;

// Workflow management layer - graph/run data model and in-memory stores
pub mod workflow;

// Step layer - the Step capability trait, registry, and builtin steps
pub mod steps;

// Runtime execution engine - traversal loop and step broadcasting
pub mod runtime;

// HTTP API layer - graph lifecycle endpoints and WebSocket log streaming
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use config::Config;
pub use error::EngineError;
pub use runtime::{GraphRunner, StepBroadcaster};
pub use server::{create_app, start_server};
pub use steps::{Step, StepRegistry};
pub use workflow::{Graph, GraphStore, LogEntry, RunRecord, RunStore, State, Transition};
