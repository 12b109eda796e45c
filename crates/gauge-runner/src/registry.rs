// StepRegistry: registered step implementations keyed by their description text.
//
// The registry is populated once before the runner starts and is read-only
// afterwards; lookups need no locking.

use gauge_sdk::step::variadic;
use gauge_sdk::{IntoStepImpl, StepArg, StepError, StepFn, StepOutput};
use std::fmt;

/// A registered step: the exact description it answers to and its implementation.
pub struct Step {
    description: String,
    implementation: StepFn,
}

impl Step {
    /// Create a step from a closure whose parameters implement `FromStepArg`.
    pub fn new<Args, F>(description: impl Into<String>, implementation: F) -> Self
    where
        F: IntoStepImpl<Args>,
    {
        Self {
            description: description.into(),
            implementation: implementation.into_step_impl(),
        }
    }

    /// Create a step whose closure receives the raw argument list.
    pub fn variadic<F, R>(description: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(Vec<StepArg>) -> R + Send + Sync + 'static,
        R: StepOutput,
    {
        Self {
            description: description.into(),
            implementation: variadic(implementation),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Bind `args` and run the implementation on the calling thread.
    pub fn call(&self, args: Vec<StepArg>) -> Result<(), StepError> {
        (self.implementation)(args)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of registered steps.
#[derive(Debug, Default)]
pub struct StepRegistry {
    steps: Vec<Step>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step. Registration order is significant: on duplicate
    /// descriptions the first registration is the one found.
    pub fn register(&mut self, step: Step) {
        if self.find(step.description()).is_some() {
            tracing::warn!(
                description = step.description(),
                "Duplicate step registration; the earlier implementation will be used"
            );
        }
        self.steps.push(step);
    }

    /// Builder form of [`StepRegistry::register`] for a typed closure.
    pub fn step<Args, F>(mut self, description: impl Into<String>, implementation: F) -> Self
    where
        F: IntoStepImpl<Args>,
    {
        self.register(Step::new(description, implementation));
        self
    }

    /// Builder form of [`StepRegistry::register`] for a variadic closure.
    pub fn variadic_step<F, R>(mut self, description: impl Into<String>, implementation: F) -> Self
    where
        F: Fn(Vec<StepArg>) -> R + Send + Sync + 'static,
        R: StepOutput,
    {
        self.register(Step::variadic(description, implementation));
        self
    }

    /// Find the step whose description equals `description` exactly.
    pub fn find(&self, description: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.description == description)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Descriptions in registration order.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.description.as_str())
    }
}
