/// Workflow Management Layer
///
/// This module holds the graph data model and the in-memory stores:
/// - Type definitions (Graph, Transition, LogEntry, RunRecord)
/// - Lock-free graph and run stores using ArcSwap

// Core graph and run type definitions
pub mod types;

// ArcSwap-backed graph and run stores
pub mod store;

// Re-export commonly used types
pub use store::{GraphStore, RunStore};
pub use types::{Graph, LogEntry, RunRecord, State, Transition};
