/// Step-by-step graph traversal engine
///
/// Walks a graph from its entry node one step at a time: invoke the node's
/// step, shallow-merge its output into the working state, snapshot the state
/// into the log, notify subscribers, yield, then resolve the next node from
/// the transition rule. Strictly single-path per run; concurrent runs
/// interleave at the per-step yield point.

use crate::{
    error::EngineError,
    runtime::broadcast::StepBroadcaster,
    workflow::{
        store::{GraphStore, RunStore},
        types::{Graph, LogEntry, RunRecord, State, Transition},
    },
};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Execution engine over the shared graph and run stores
///
/// Owns the working state and log for the duration of one run; on success
/// the record moves to the run store and becomes read-only.
pub struct GraphRunner {
    graphs: Arc<GraphStore>,
    runs: Arc<RunStore>,
    broadcaster: Arc<StepBroadcaster>,
}

impl GraphRunner {
    pub fn new(
        graphs: Arc<GraphStore>,
        runs: Arc<RunStore>,
        broadcaster: Arc<StepBroadcaster>,
    ) -> Self {
        Self {
            graphs,
            runs,
            broadcaster,
        }
    }

    /// Execute a graph to termination and commit the run record
    ///
    /// Any step failure or dangling node reference aborts immediately; no
    /// partial record is committed for a failed run. A graph whose
    /// transitions form a cycle with no reachable terminal rule never
    /// returns; bounding that is the caller's concern.
    pub async fn run(
        &self,
        graph_id: &str,
        initial_state: State,
    ) -> Result<Arc<RunRecord>, EngineError> {
        let graph = self.graphs.get(graph_id)?;

        tracing::info!("🚀 Starting run of graph {} from node '{}'", graph.id, graph.entry());

        // Caller keeps its copy of the initial state; this one is ours to mutate
        let mut state = initial_state;
        let mut log: Vec<LogEntry> = Vec::new();
        let mut current = Some(graph.entry().to_string());

        while let Some(node) = current {
            let step = graph.step(&node)?;
            let output = step.run(&state)?;
            merge(&mut state, &node, output)?;

            let entry = LogEntry {
                node: node.clone(),
                state: state.clone(),
            };
            log.push(entry.clone());

            tracing::debug!("📍 Step {}: executed node '{}'", log.len(), node);

            // Fire-and-forget notification, then the designed fairness
            // point: hand the scheduler a chance to interleave other runs
            self.broadcaster.publish(entry);
            tokio::task::yield_now().await;

            current = self.next_node(&graph, &node, &state)?;
        }

        let run_id = Uuid::new_v4().to_string();
        let record = self.runs.put(RunRecord {
            run_id: run_id.clone(),
            final_state: state,
            log,
            finished_at: chrono::Utc::now(),
        });

        tracing::info!(
            "✅ Run {} of graph {} completed after {} steps",
            run_id,
            graph.id,
            record.log.len()
        );

        Ok(record)
    }

    /// Resolve the node that follows `node`, or `None` when terminal
    fn next_node(
        &self,
        graph: &Graph,
        node: &str,
        state: &State,
    ) -> Result<Option<String>, EngineError> {
        match graph.transition(node) {
            None | Some(Transition::End) => Ok(None),
            Some(Transition::Next(next)) => Ok(Some(next.clone())),
            Some(Transition::Branch {
                condition,
                when_true,
                when_false,
            }) => {
                let condition_step = graph.step(condition)?;
                let verdict = condition_step.run(state)?;
                let next = if truthy(&verdict) { when_true } else { when_false };
                tracing::debug!(
                    "🔀 Condition '{}' routed '{}' -> '{}'",
                    condition,
                    node,
                    next
                );
                Ok(Some(next.clone()))
            }
        }
    }
}

/// Shallow-merge a step's output into the working state
///
/// Existing keys are overwritten, new keys added, untouched keys kept. A
/// non-object output has nothing to merge and aborts the run.
fn merge(state: &mut State, node: &str, output: Value) -> Result<(), EngineError> {
    match output {
        Value::Object(patch) => {
            for (key, value) in patch {
                state.insert(key, value);
            }
            Ok(())
        }
        _ => Err(EngineError::InvalidStepOutput {
            node: node.to_string(),
        }),
    }
}

/// Boolean-like interpretation of a condition step's return value
///
/// Empty strings, zero numbers, and empty containers are false, matching
/// the loose "truthy value" contract condition steps are written against.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::Step;
    use serde_json::json;
    use std::collections::HashMap;

    fn patch_step(patch: Value) -> Arc<dyn Step> {
        Arc::new(move |_state: &State| -> Result<Value, EngineError> { Ok(patch.clone()) })
    }

    fn runner() -> (GraphRunner, Arc<GraphStore>, Arc<RunStore>, Arc<StepBroadcaster>) {
        let graphs = Arc::new(GraphStore::new());
        let runs = Arc::new(RunStore::new());
        let broadcaster = Arc::new(StepBroadcaster::new(64));
        let runner = GraphRunner::new(
            Arc::clone(&graphs),
            Arc::clone(&runs),
            Arc::clone(&broadcaster),
        );
        (runner, graphs, runs, broadcaster)
    }

    fn state_of(value: Value) -> State {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn linear_graph_merges_state_in_traversal_order() {
        let (runner, graphs, _runs, _b) = runner();

        let graph_id = graphs
            .create(
                vec![
                    ("a".to_string(), patch_step(json!({"x": 1}))),
                    ("b".to_string(), patch_step(json!({"y": 2}))),
                ],
                HashMap::from([
                    ("a".to_string(), Transition::Next("b".to_string())),
                    ("b".to_string(), Transition::End),
                ]),
            )
            .unwrap();

        let record = runner.run(&graph_id, State::new()).await.unwrap();

        assert_eq!(record.log.len(), 2);
        assert_eq!(record.log[0].node, "a");
        assert_eq!(record.log[0].state, state_of(json!({"x": 1})));
        assert_eq!(record.log[1].node, "b");
        assert_eq!(record.log[1].state, state_of(json!({"x": 1, "y": 2})));
        assert_eq!(record.final_state, state_of(json!({"x": 1, "y": 2})));
    }

    #[tokio::test]
    async fn single_node_graph_produces_one_log_entry() {
        let (runner, graphs, _runs, _b) = runner();

        let graph_id = graphs
            .create(
                vec![("only".to_string(), patch_step(json!({"done": true})))],
                HashMap::new(), // absent rule means terminal
            )
            .unwrap();

        let mut initial = State::new();
        initial.insert("seed".to_string(), json!(7));

        let record = runner.run(&graph_id, initial).await.unwrap();

        assert_eq!(record.log.len(), 1);
        assert_eq!(record.final_state, state_of(json!({"seed": 7, "done": true})));
    }

    #[tokio::test]
    async fn false_condition_routes_to_false_branch_only() {
        let (runner, graphs, _runs, _b) = runner();

        let graph_id = graphs
            .create(
                vec![
                    ("check".to_string(), patch_step(json!({"ok": false}))),
                    ("done_t".to_string(), patch_step(json!({"route": "t"}))),
                    ("done_f".to_string(), patch_step(json!({"route": "f"}))),
                    (
                        "is_ok".to_string(),
                        Arc::new(|state: &State| -> Result<Value, EngineError> {
                            Ok(state.get("ok").cloned().unwrap_or(Value::Null))
                        }) as Arc<dyn Step>,
                    ),
                ],
                HashMap::from([(
                    "check".to_string(),
                    Transition::Branch {
                        condition: "is_ok".to_string(),
                        when_true: "done_t".to_string(),
                        when_false: "done_f".to_string(),
                    },
                )]),
            )
            .unwrap();

        let record = runner.run(&graph_id, State::new()).await.unwrap();

        let visited: Vec<&str> = record.log.iter().map(|e| e.node.as_str()).collect();
        assert_eq!(visited, vec!["check", "done_f"]);
        assert_eq!(record.final_state["route"], json!("f"));
    }

    #[tokio::test]
    async fn true_condition_routes_to_true_branch_only() {
        let (runner, graphs, _runs, _b) = runner();

        let graph_id = graphs
            .create(
                vec![
                    ("check".to_string(), patch_step(json!({"ok": true}))),
                    ("done_t".to_string(), patch_step(json!({"route": "t"}))),
                    ("done_f".to_string(), patch_step(json!({"route": "f"}))),
                    (
                        "is_ok".to_string(),
                        Arc::new(|state: &State| -> Result<Value, EngineError> {
                            Ok(state.get("ok").cloned().unwrap_or(Value::Null))
                        }) as Arc<dyn Step>,
                    ),
                ],
                HashMap::from([(
                    "check".to_string(),
                    Transition::Branch {
                        condition: "is_ok".to_string(),
                        when_true: "done_t".to_string(),
                        when_false: "done_f".to_string(),
                    },
                )]),
            )
            .unwrap();

        let record = runner.run(&graph_id, State::new()).await.unwrap();

        let visited: Vec<&str> = record.log.iter().map(|e| e.node.as_str()).collect();
        assert_eq!(visited, vec!["check", "done_t"]);
    }

    #[tokio::test]
    async fn repeated_keys_overwrite_rather_than_accumulate() {
        let (runner, graphs, _runs, _b) = runner();

        let graph_id = graphs
            .create(
                vec![
                    ("first".to_string(), patch_step(json!({"x": 1}))),
                    ("second".to_string(), patch_step(json!({"x": 2}))),
                ],
                HashMap::from([("first".to_string(), Transition::Next("second".to_string()))]),
            )
            .unwrap();

        let record = runner.run(&graph_id, State::new()).await.unwrap();

        assert_eq!(record.final_state, state_of(json!({"x": 2})));
        // Snapshot of step 1 is unaffected by the later overwrite
        assert_eq!(record.log[0].state, state_of(json!({"x": 1})));
    }

    #[tokio::test]
    async fn unknown_graph_fails_with_not_found() {
        let (runner, _graphs, runs, _b) = runner();

        let err = runner.run("no-such-graph", State::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::GraphNotFound(_)));
        assert!(runs.is_empty());
    }

    #[tokio::test]
    async fn dangling_transition_surfaces_at_traversal_time() {
        let (runner, graphs, runs, _b) = runner();

        // Creation accepts the dangling reference; only running it fails
        let graph_id = graphs
            .create(
                vec![("a".to_string(), patch_step(json!({"x": 1})))],
                HashMap::from([("a".to_string(), Transition::Next("ghost".to_string()))]),
            )
            .unwrap();

        let err = runner.run(&graph_id, State::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::UnknownNode { node } if node == "ghost"));
        assert!(runs.is_empty(), "failed run must not commit a record");
    }

    #[tokio::test]
    async fn failing_step_aborts_without_committing_a_record() {
        let (runner, graphs, runs, _b) = runner();

        let graph_id = graphs
            .create(
                vec![
                    ("ok".to_string(), patch_step(json!({"x": 1}))),
                    (
                        "boom".to_string(),
                        Arc::new(|_state: &State| -> Result<Value, EngineError> {
                            Err(EngineError::MissingKey {
                                key: "absent".to_string(),
                            })
                        }) as Arc<dyn Step>,
                    ),
                ],
                HashMap::from([("ok".to_string(), Transition::Next("boom".to_string()))]),
            )
            .unwrap();

        let err = runner.run(&graph_id, State::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::MissingKey { .. }));
        assert!(runs.is_empty());
    }

    #[tokio::test]
    async fn non_mapping_step_output_aborts_the_run() {
        let (runner, graphs, runs, _b) = runner();

        let graph_id = graphs
            .create(
                vec![(
                    "odd".to_string(),
                    Arc::new(|_state: &State| -> Result<Value, EngineError> { Ok(json!(42)) })
                        as Arc<dyn Step>,
                )],
                HashMap::new(),
            )
            .unwrap();

        let err = runner.run(&graph_id, State::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidStepOutput { node } if node == "odd"));
        assert!(runs.is_empty());
    }

    #[tokio::test]
    async fn subscribers_observe_entries_in_traversal_order() {
        let (runner, graphs, _runs, broadcaster) = runner();
        let mut rx = broadcaster.subscribe();

        let graph_id = graphs
            .create(
                vec![
                    ("a".to_string(), patch_step(json!({"x": 1}))),
                    ("b".to_string(), patch_step(json!({"y": 2}))),
                ],
                HashMap::from([("a".to_string(), Transition::Next("b".to_string()))]),
            )
            .unwrap();

        runner.run(&graph_id, State::new()).await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.node, "a");
        assert_eq!(first.state, state_of(json!({"x": 1})));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.node, "b");
        assert_eq!(second.state, state_of(json!({"x": 1, "y": 2})));
    }

    #[tokio::test]
    async fn concurrent_runs_both_commit_independent_records() {
        let (runner, graphs, runs, _b) = runner();
        let runner = Arc::new(runner);

        let graph_id = graphs
            .create(
                vec![
                    ("a".to_string(), patch_step(json!({"x": 1}))),
                    ("b".to_string(), patch_step(json!({"y": 2}))),
                ],
                HashMap::from([("a".to_string(), Transition::Next("b".to_string()))]),
            )
            .unwrap();

        let (left, right) = tokio::join!(
            runner.run(&graph_id, State::new()),
            runner.run(&graph_id, State::new())
        );

        let left = left.unwrap();
        let right = right.unwrap();
        assert_ne!(left.run_id, right.run_id);
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn truthiness_follows_loose_boolean_semantics() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!([])));
        assert!(!truthy(&json!({})));

        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!(-3)));
        assert!(truthy(&json!("no")));
        assert!(truthy(&json!([0])));
        assert!(truthy(&json!({"k": 0})));
    }
}
