// Processors module - one handler per inbound message type.

pub mod execute_step;
pub mod lifecycle;

use gauge_common::Message;

use crate::context::GaugeContext;

pub use execute_step::ExecuteStepProcessor;
pub use lifecycle::LifecycleProcessor;

/// Handler for one kind of inbound message.
///
/// `process` always produces a well-formed response; failures are reported
/// inside the response rather than returned as errors.
pub trait MessageProcessor: Send + Sync {
    fn process(&self, message: &Message, context: &GaugeContext) -> Message;
}
