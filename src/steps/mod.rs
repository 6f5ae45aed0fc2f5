/// Step Layer
///
/// A step is the single capability the engine knows about: one execution
/// method over the shared state. Graphs hold resolved `Arc<dyn Step>`
/// instances; the translation from symbolic step names happens in the API
/// layer through the registry, never inside the engine.

// Name -> step instance registry
pub mod registry;

// Builtin code-review workflow steps
pub mod code_review;

pub use registry::StepRegistry;

use crate::{error::EngineError, workflow::types::State};
use serde_json::Value;

/// A named unit of work executed against the working state
///
/// Regular steps return a JSON object: a partial-state patch merged into the
/// working state by shallow key overwrite. Condition steps may return any
/// value; the engine interprets it through truthiness when resolving a
/// conditional transition.
pub trait Step: Send + Sync {
    fn run(&self, state: &State) -> Result<Value, EngineError>;
}

/// Plain closures over the state are steps too
///
/// Keeps tests and ad-hoc registrations free of wrapper structs.
impl<F> Step for F
where
    F: Fn(&State) -> Result<Value, EngineError> + Send + Sync,
{
    fn run(&self, state: &State) -> Result<Value, EngineError> {
        self(state)
    }
}
