/// Graph lifecycle REST endpoints
///
/// Translates JSON payloads into graph definitions and run invocations.
/// Symbolic step names are resolved through the registry here, at creation
/// time; the engine itself only ever sees resolved callables.

use crate::{
    error::EngineError,
    runtime::{broadcast::StepBroadcaster, runner::GraphRunner},
    steps::registry::StepRegistry,
    workflow::{
        store::{GraphStore, RunStore},
        types::{State, Transition},
    },
};
use axum::{
    extract::{Path, State as AxumState},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Symbolic name -> step instance registry
    pub registry: Arc<StepRegistry>,
    /// Immutable graph definitions
    pub graphs: Arc<GraphStore>,
    /// Completed run records
    pub runs: Arc<RunStore>,
    /// Traversal engine
    pub runner: Arc<GraphRunner>,
    /// Step notification fan-out (consumed by the WebSocket endpoint)
    pub broadcaster: Arc<StepBroadcaster>,
}

/// Request body for graph creation
///
/// `nodes` maps node names to symbolic step names; its JSON key order is
/// preserved and the first key becomes the entry node. `edges` maps node
/// names to transition rules (string, branch object, or null).
#[derive(Debug, Deserialize)]
pub struct CreateGraphRequest {
    pub nodes: serde_json::Map<String, Value>,
    #[serde(default)]
    pub edges: HashMap<String, Transition>,
}

/// Request body for triggering a run
#[derive(Debug, Deserialize)]
pub struct RunGraphRequest {
    pub graph_id: String,
    #[serde(default)]
    pub initial_state: State,
}

/// Create graph lifecycle routes
pub fn create_graph_routes() -> Router<AppState> {
    Router::new()
        .route("/graph/create", post(create_graph))
        .route("/graph/run", post(run_graph))
        .route("/graph/state/{run_id}", get(get_run_state))
}

/// Create a new graph
///
/// POST /graph/create
/// Body: { "nodes": { "a": "extract_functions", ... }, "edges": { "a": "b", "b": null } }
async fn create_graph(
    AxumState(state): AxumState<AppState>,
    Json(payload): Json<CreateGraphRequest>,
) -> Result<Json<Value>, StatusCode> {
    let mut nodes = Vec::with_capacity(payload.nodes.len());

    for (node_name, step_name) in payload.nodes {
        let step_name = match step_name.as_str() {
            Some(name) => name,
            None => {
                tracing::warn!("Node '{}' references a non-string step", node_name);
                return Err(StatusCode::BAD_REQUEST);
            }
        };

        match state.registry.resolve(step_name) {
            Some(step) => nodes.push((node_name, step)),
            None => {
                tracing::warn!(
                    "Node '{}' references unknown step '{}'",
                    node_name,
                    step_name
                );
                return Err(StatusCode::BAD_REQUEST);
            }
        }
    }

    match state.graphs.create(nodes, payload.edges) {
        Ok(graph_id) => Ok(Json(json!({ "graph_id": graph_id }))),
        Err(e) => {
            tracing::warn!("Graph creation rejected: {}", e);
            Err(status_for(&e))
        }
    }
}

/// Execute a graph and return the run outcome
///
/// POST /graph/run
/// Body: { "graph_id": "...", "initial_state": { ... } }
async fn run_graph(
    AxumState(state): AxumState<AppState>,
    Json(payload): Json<RunGraphRequest>,
) -> Result<Json<Value>, StatusCode> {
    match state.runner.run(&payload.graph_id, payload.initial_state).await {
        Ok(record) => Ok(Json(json!({
            "run_id": &record.run_id,
            "final_state": &record.final_state,
            "execution_log": &record.log,
        }))),
        Err(e) => {
            tracing::error!("Run of graph {} failed: {}", payload.graph_id, e);
            Err(status_for(&e))
        }
    }
}

/// Query the outcome of a completed run
///
/// GET /graph/state/{run_id}
/// Returns the run record, or JSON null for an unknown run identifier.
/// Unknown runs are deliberately not an error, unlike unknown graphs.
async fn get_run_state(
    AxumState(state): AxumState<AppState>,
    Path(run_id): Path<String>,
) -> Json<Value> {
    match state.runs.get(&run_id) {
        Some(record) => Json(serde_json::to_value(&*record).unwrap_or(Value::Null)),
        None => Json(Value::Null),
    }
}

/// Map the engine error taxonomy onto HTTP statuses
///
/// 404 for unknown graphs, 400 for structurally invalid definitions, 422
/// for failures that surface while a run executes.
fn status_for(error: &EngineError) -> StatusCode {
    match error {
        EngineError::GraphNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::EmptyGraph => StatusCode::BAD_REQUEST,
        EngineError::UnknownNode { .. }
        | EngineError::InvalidStepOutput { .. }
        | EngineError::MissingKey { .. }
        | EngineError::InvalidValue { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}
