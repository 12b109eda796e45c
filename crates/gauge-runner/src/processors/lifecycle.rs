// LifecycleProcessor: acknowledges execution/spec/scenario/step start and end
// notifications. No hooks are run; the host only needs a successful status.

use gauge_common::{Message, ProtoExecutionResult};

use super::MessageProcessor;
use crate::context::GaugeContext;

#[derive(Debug, Default)]
pub struct LifecycleProcessor;

impl LifecycleProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl MessageProcessor for LifecycleProcessor {
    fn process(&self, message: &Message, _context: &GaugeContext) -> Message {
        tracing::debug!(
            message_type = %message.message_type,
            message_id = message.message_id,
            "Acknowledging lifecycle notification"
        );
        Message::execution_status(message.message_id, ProtoExecutionResult::success(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_common::MessageType;

    #[test]
    fn acknowledges_with_success() {
        let context = GaugeContext::default();
        let message = Message::new(MessageType::ScenarioExecutionStarting, 99);

        let response = LifecycleProcessor::new().process(&message, &context);

        assert_eq!(response.message_type, MessageType::ExecutionStatusResponse);
        assert_eq!(response.message_id, 99);
        assert!(!response.execution_status_response.unwrap().execution_result.failed);
    }
}
