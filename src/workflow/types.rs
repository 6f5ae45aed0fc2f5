/// Core workflow graph type definitions
///
/// Defines the fundamental structures for graphs, transitions, and run
/// records. Wire-facing types are serialized/deserialized from JSON; the
/// graph itself holds resolved step callables and never leaves the process.

use crate::{error::EngineError, steps::Step};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Working state threaded through one run
///
/// An open-ended key/value mapping: steps read whatever fields they need and
/// return partial mappings that are shallow-merged back in. serde_json's
/// `preserve_order` feature keeps key insertion order intact, which matters
/// because the first node key of a creation request selects the entry node.
pub type State = serde_json::Map<String, Value>;

/// Rule determining which node follows the current one
///
/// Wire format matches the creation request's `edges` values:
/// - a JSON string is a direct successor,
/// - a JSON object `{"condition", "true", "false"}` branches on a condition
///   step's truthiness,
/// - JSON `null` (or an absent entry) marks the node as terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transition {
    /// Conditional branch: run the named condition step against the current
    /// state and follow `true`/`false` accordingly
    Branch {
        condition: String,
        #[serde(rename = "true")]
        when_true: String,
        #[serde(rename = "false")]
        when_false: String,
    },
    /// Direct successor node
    Next(String),
    /// Terminal: the run ends after this node
    End,
}

/// An immutable workflow graph: ordered nodes bound to resolved steps
///
/// Node insertion order is part of the public contract: the first node in
/// the creation request is the entry node. Transition referential integrity
/// is NOT checked here; a dangling node name surfaces as `UnknownNode` when
/// traversal reaches that edge.
pub struct Graph {
    /// Unique graph identifier (UUID v4)
    pub id: String,
    /// Node names in creation order; the first entry is the entry node
    node_order: Vec<String>,
    /// Resolved step callable for each node
    steps: HashMap<String, Arc<dyn Step>>,
    /// Transition rule per node; absent entries are terminal
    transitions: HashMap<String, Transition>,
}

impl Graph {
    /// Build a graph from resolved steps in request order
    ///
    /// Rejects an empty node list since such a graph has no entry node.
    pub fn new(
        id: String,
        nodes: Vec<(String, Arc<dyn Step>)>,
        transitions: HashMap<String, Transition>,
    ) -> Result<Self, EngineError> {
        if nodes.is_empty() {
            return Err(EngineError::EmptyGraph);
        }

        let node_order: Vec<String> = nodes.iter().map(|(name, _)| name.clone()).collect();
        let steps: HashMap<String, Arc<dyn Step>> = nodes.into_iter().collect();

        Ok(Self {
            id,
            node_order,
            steps,
            transitions,
        })
    }

    /// Entry node: the first node of the creation request
    pub fn entry(&self) -> &str {
        &self.node_order[0]
    }

    /// Node names in creation order
    pub fn node_names(&self) -> &[String] {
        &self.node_order
    }

    /// Resolve a node name to its step callable
    pub fn step(&self, node: &str) -> Result<Arc<dyn Step>, EngineError> {
        self.steps
            .get(node)
            .cloned()
            .ok_or_else(|| EngineError::UnknownNode {
                node: node.to_string(),
            })
    }

    /// Transition rule for a node; `None` means terminal
    pub fn transition(&self, node: &str) -> Option<&Transition> {
        self.transitions.get(node)
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("nodes", &self.node_order)
            .field("transitions", &self.transitions)
            .finish()
    }
}

/// One entry of a run's execution log
///
/// Captures the node that executed and a snapshot of the working state after
/// that node's output was merged. The same entry is pushed to live
/// subscribers as the step notification payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Name of the node that executed
    pub node: String,
    /// Full working state after the merge
    pub state: State,
}

/// Outcome of one completed run
///
/// Committed to the run store atomically after a successful traversal; a
/// failed run never produces a record. Append-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    /// Unique run identifier (UUID v4)
    pub run_id: String,
    /// Working state at loop termination
    pub final_state: State,
    /// Ordered per-step snapshots, matching traversal order
    #[serde(rename = "execution_log")]
    pub log: Vec<LogEntry>,
    /// Completion timestamp
    pub finished_at: DateTime<Utc>,
}
