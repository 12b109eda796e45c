// GaugeContext: read-only state handed to every message processor.

use crate::registry::{Step, StepRegistry};

/// Process-wide context for message processing.
///
/// Built once from a fully populated [`StepRegistry`]; there is no way to
/// mutate it afterwards, so it can be shared freely behind an `Arc`.
#[derive(Debug, Default)]
pub struct GaugeContext {
    registry: StepRegistry,
}

impl GaugeContext {
    pub fn new(registry: StepRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Look up the implementation for a parsed step text.
    pub fn find_step(&self, parsed_step_text: &str) -> Option<&Step> {
        self.registry.find(parsed_step_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_step_delegates_to_registry() {
        let context = GaugeContext::new(StepRegistry::new().step("Open the app", || {}));
        assert_eq!(context.registry().len(), 1);
        assert!(context.find_step("Open the app").is_some());
        assert!(context.find_step("Close the app").is_none());
    }
}
