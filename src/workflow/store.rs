/// In-memory graph and run stores using ArcSwap
///
/// Both stores are lock-free for readers: lookups load the current map
/// pointer without blocking concurrent writers. Writers go through `rcu`,
/// which retries the clone-and-swap on contention so concurrent insertions
/// never lose updates. Graphs and run records are immutable once stored, so
/// handing out `Arc` clones is safe.

use crate::{
    error::EngineError,
    steps::Step,
    workflow::types::{Graph, RunRecord, Transition},
};
use arc_swap::ArcSwap;
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// Store of immutable graph definitions keyed by graph identifier
///
/// Graphs have no update or delete operation: once created they stay until
/// process exit. Lookup of an unknown identifier is a hard failure, unlike
/// the run store's empty result.
#[derive(Debug, Default)]
pub struct GraphStore {
    graphs: ArcSwap<HashMap<String, Arc<Graph>>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            graphs: ArcSwap::new(Arc::new(HashMap::new())),
        }
    }

    /// Create a graph from resolved steps and transition rules
    ///
    /// Generates a fresh UUID identifier, stores the immutable graph, and
    /// returns the identifier. Transition referential integrity is not
    /// validated here; dangling names fail at traversal time.
    pub fn create(
        &self,
        nodes: Vec<(String, Arc<dyn Step>)>,
        transitions: HashMap<String, Transition>,
    ) -> Result<String, EngineError> {
        let graph_id = Uuid::new_v4().to_string();
        let graph = Arc::new(Graph::new(graph_id.clone(), nodes, transitions)?);

        self.graphs.rcu(|current| {
            let mut next = (**current).clone();
            next.insert(graph_id.clone(), Arc::clone(&graph));
            next
        });

        tracing::info!("Created graph {} with {} nodes", graph_id, graph.node_names().len());

        Ok(graph_id)
    }

    /// Look up a graph by identifier (lock-free read)
    pub fn get(&self, graph_id: &str) -> Result<Arc<Graph>, EngineError> {
        self.graphs
            .load()
            .get(graph_id)
            .cloned()
            .ok_or_else(|| EngineError::GraphNotFound(graph_id.to_string()))
    }

    /// Number of stored graphs
    pub fn len(&self) -> usize {
        self.graphs.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append-only store of completed run records keyed by run identifier
///
/// An unknown run identifier yields `None` rather than an error. This
/// asymmetry with `GraphStore::get` mirrors the query boundary's contract:
/// run state queries report "nothing yet" instead of failing.
#[derive(Debug, Default)]
pub struct RunStore {
    runs: ArcSwap<HashMap<String, Arc<RunRecord>>>,
}

impl RunStore {
    pub fn new() -> Self {
        Self {
            runs: ArcSwap::new(Arc::new(HashMap::new())),
        }
    }

    /// Commit a completed run record
    ///
    /// Identifier uniqueness makes overwrites a non-event; the record
    /// becomes visible to readers atomically with the pointer swap.
    pub fn put(&self, record: RunRecord) -> Arc<RunRecord> {
        let record = Arc::new(record);

        self.runs.rcu(|current| {
            let mut next = (**current).clone();
            next.insert(record.run_id.clone(), Arc::clone(&record));
            next
        });

        record
    }

    /// Look up a run record; `None` for unknown identifiers
    pub fn get(&self, run_id: &str) -> Option<Arc<RunRecord>> {
        self.runs.load().get(run_id).cloned()
    }

    /// Number of committed runs
    pub fn len(&self) -> usize {
        self.runs.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
