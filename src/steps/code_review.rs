/// Builtin code-review workflow steps
///
/// A small rule-based analysis pipeline over a `code` field in the working
/// state: extract metrics, score complexity, count issues, grade quality,
/// and decide whether the review loop should run another pass. These are the
/// domain callables the engine treats as opaque; nothing here is special to
/// the traversal algorithm.

use crate::{
    error::EngineError,
    steps::Step,
    workflow::types::State,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// All builtin steps keyed by their symbolic registry names
pub fn builtin_steps() -> Vec<(&'static str, Arc<dyn Step>)> {
    vec![
        ("extract_functions", Arc::new(ExtractFunctions) as Arc<dyn Step>),
        ("check_complexity", Arc::new(CheckComplexity)),
        ("detect_issues", Arc::new(DetectIssues)),
        ("suggest_improvements", Arc::new(SuggestImprovements)),
        ("should_loop", Arc::new(ShouldLoop)),
    ]
}

/// Read a required integer state key
///
/// Missing keys are the typed StateError of the engine: referencing a
/// derived metric before the step that computes it has run.
fn require_i64(state: &State, key: &str) -> Result<i64, EngineError> {
    let value = state.get(key).ok_or_else(|| EngineError::MissingKey {
        key: key.to_string(),
    })?;
    value.as_i64().ok_or_else(|| EngineError::InvalidValue {
        key: key.to_string(),
        expected: "an integer",
    })
}

/// Extract basic metrics from the submitted code
///
/// Counts function definitions and lines. Tolerates an absent `code` field
/// (treated as empty input) since this is the usual entry step.
pub struct ExtractFunctions;

impl Step for ExtractFunctions {
    fn run(&self, state: &State) -> Result<Value, EngineError> {
        let code = state.get("code").and_then(Value::as_str).unwrap_or("");

        let functions = code.matches("def").count();
        let lines = code.split('\n').count();

        Ok(json!({
            "functions": functions,
            "lines": lines,
            "step": "extract_done",
        }))
    }
}

/// Rule-based complexity score: functions * 2
pub struct CheckComplexity;

impl Step for CheckComplexity {
    fn run(&self, state: &State) -> Result<Value, EngineError> {
        let functions = require_i64(state, "functions")?;
        Ok(json!({ "complexity": functions * 2 }))
    }
}

/// Issue count from missing function coverage: max(0, 5 - functions)
pub struct DetectIssues;

impl Step for DetectIssues {
    fn run(&self, state: &State) -> Result<Value, EngineError> {
        let functions = require_i64(state, "functions")?;
        Ok(json!({ "issues": (5 - functions).max(0) }))
    }
}

/// Quality grade from complexity and issues: 10 - (complexity + issues)
///
/// Can go negative for sufficiently messy input; the review loop uses that
/// as a signal to keep iterating.
pub struct SuggestImprovements;

impl Step for SuggestImprovements {
    fn run(&self, state: &State) -> Result<Value, EngineError> {
        let complexity = require_i64(state, "complexity")?;
        let issues = require_i64(state, "issues")?;
        Ok(json!({ "quality_score": 10 - (complexity + issues) }))
    }
}

/// Condition step: keep looping while quality_score < threshold
pub struct ShouldLoop;

impl Step for ShouldLoop {
    fn run(&self, state: &State) -> Result<Value, EngineError> {
        let score = require_i64(state, "quality_score")?;
        let threshold = require_i64(state, "threshold")?;
        Ok(Value::Bool(score < threshold))
    }
}
