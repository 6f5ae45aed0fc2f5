/// Step registry: symbolic names resolved to step instances
///
/// The creation request names steps symbolically ("check_complexity"); this
/// registry maps those names to `Arc<dyn Step>` instances exactly once, at
/// graph-creation time. Uses the same ArcSwap clone-and-swap pattern as the
/// stores so registration never blocks concurrent resolution.

use crate::steps::{code_review, Step};
use arc_swap::ArcSwap;
use std::{collections::HashMap, sync::Arc};

/// Lock-free name -> step mapping
#[derive(Default)]
pub struct StepRegistry {
    steps: ArcSwap<HashMap<String, Arc<dyn Step>>>,
}

impl StepRegistry {
    /// Empty registry with no steps registered
    pub fn new() -> Self {
        Self {
            steps: ArcSwap::new(Arc::new(HashMap::new())),
        }
    }

    /// Registry seeded with the builtin code-review steps
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for (name, step) in code_review::builtin_steps() {
            registry.register(name, step);
        }
        registry
    }

    /// Register (or replace) a step under a symbolic name
    pub fn register(&self, name: &str, step: Arc<dyn Step>) {
        self.steps.rcu(|current| {
            let mut next = (**current).clone();
            next.insert(name.to_string(), Arc::clone(&step));
            next
        });

        tracing::debug!("Registered step '{}'", name);
    }

    /// Resolve a symbolic name to its step instance (lock-free read)
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Step>> {
        self.steps.load().get(name).cloned()
    }

    /// Registered step names, unordered
    pub fn names(&self) -> Vec<String> {
        self.steps.load().keys().cloned().collect()
    }
}
