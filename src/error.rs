/// Typed error taxonomy for graph execution
///
/// Every failure the engine can surface is enumerated here so the API layer
/// can map each class to a distinct HTTP status. Notification delivery
/// failures are deliberately absent: the broadcaster swallows them.

use thiserror::Error;

/// Errors produced by the graph stores and the execution engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unknown graph identifier. Lookup of graphs is fail-fast, unlike run
    /// lookup which reports an empty result instead.
    #[error("graph not found: {0}")]
    GraphNotFound(String),

    /// A graph with zero nodes cannot be executed, so creation rejects it.
    #[error("graph must contain at least one node")]
    EmptyGraph,

    /// A transition or condition rule named a node that is not part of the
    /// graph's node mapping. Surfaces when traversal reaches that edge, not
    /// at creation time.
    #[error("node '{node}' is not defined in the graph")]
    UnknownNode { node: String },

    /// A non-condition step returned something other than a JSON object, so
    /// there is nothing to merge into the working state.
    #[error("step '{node}' did not return a state mapping")]
    InvalidStepOutput { node: String },

    /// A step read a state key that no prior step produced.
    #[error("state key '{key}' has not been produced by any prior step")]
    MissingKey { key: String },

    /// A state key exists but holds a value the step cannot work with.
    #[error("state key '{key}' is not {expected}")]
    InvalidValue { key: String, expected: &'static str },
}
