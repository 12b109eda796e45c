// ExecuteStepProcessor: resolve, bind, invoke and report one step.

use gauge_common::Message;
use std::time::Instant;

use super::MessageProcessor;
use crate::args::build_args;
use crate::context::GaugeContext;
use crate::error::ExecutionError;
use crate::invoker::{ExecutionOutcome, StepInvoker};

/// Handles `ExecuteStep` requests.
///
/// Holds no state between requests; every call is independent.
#[derive(Debug, Default)]
pub struct ExecuteStepProcessor {
    invoker: StepInvoker,
}

impl ExecuteStepProcessor {
    pub fn new() -> Self {
        Self {
            invoker: StepInvoker::new(),
        }
    }

    fn execute(&self, message: &Message, context: &GaugeContext) -> ExecutionOutcome {
        let Some(request) = message.execute_step_request.as_ref() else {
            tracing::warn!(
                message_id = message.message_id,
                "ExecuteStep message without request payload"
            );
            return ExecutionError::MissingRequest(message.message_id).into();
        };

        let step_text = request.parsed_step_text.as_str();
        let Some(step) = context.find_step(step_text) else {
            tracing::warn!(
                message_id = message.message_id,
                step_text,
                "No step implementation matches"
            );
            return ExecutionError::StepNotFound(step_text.to_string()).into();
        };

        let args = build_args(&request.parameters);
        tracing::debug!(
            message_id = message.message_id,
            step_text,
            arg_count = args.len(),
            "Invoking step"
        );

        self.invoker.invoke(step, args)
    }
}

impl MessageProcessor for ExecuteStepProcessor {
    fn process(&self, message: &Message, context: &GaugeContext) -> Message {
        let started = Instant::now();
        let outcome = self.execute(message, context);
        let execution_time_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);

        match &outcome {
            ExecutionOutcome::Success => tracing::info!(
                message_id = message.message_id,
                execution_time_ms,
                "Step passed"
            ),
            ExecutionOutcome::Failure { message: error, .. } => tracing::info!(
                message_id = message.message_id,
                execution_time_ms,
                error = %error,
                "Step failed"
            ),
        }

        Message::execution_status(message.message_id, outcome.into_result(execution_time_ms))
    }
}
