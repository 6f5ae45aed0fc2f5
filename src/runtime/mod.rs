/// Runtime Execution Engine
///
/// This module drives graph traversal and live observability:
/// - Step-by-step runner (conditional branching, state merge, log capture)
/// - Fire-and-forget step broadcaster for subscribed observers

// Core traversal engine
pub mod runner;

// Step notification fan-out
pub mod broadcast;

// Re-export main types
pub use broadcast::StepBroadcaster;
pub use runner::GraphRunner;
