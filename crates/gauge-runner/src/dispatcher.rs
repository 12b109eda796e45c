// MessageDispatcher: routes inbound messages to processors and writes the
// responses back. Strictly one message in flight at a time.

use anyhow::{Context, Result};
use gauge_common::{GaugeConnection, Message, MessageType, ProtoExecutionResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::context::GaugeContext;
use crate::processors::{ExecuteStepProcessor, LifecycleProcessor, MessageProcessor};

/// What the message loop should do with an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Send this response to the host.
    Respond(Message),
    /// The host asked the runner to exit.
    Stop,
    /// No processor handles this message type.
    Ignore,
}

pub struct MessageDispatcher {
    context: Arc<GaugeContext>,
    processors: HashMap<MessageType, Arc<dyn MessageProcessor>>,
}

impl MessageDispatcher {
    /// Create a dispatcher with the built-in processors registered.
    pub fn new(context: Arc<GaugeContext>) -> Self {
        let mut dispatcher = Self {
            context,
            processors: HashMap::new(),
        };

        dispatcher.register(MessageType::ExecuteStep, Arc::new(ExecuteStepProcessor::new()));

        let lifecycle: Arc<dyn MessageProcessor> = Arc::new(LifecycleProcessor::new());
        for message_type in MessageType::ALL.into_iter().filter(MessageType::is_lifecycle) {
            dispatcher.register(message_type, lifecycle.clone());
        }

        dispatcher
    }

    /// Register (or replace) the processor for a message type.
    pub fn register(&mut self, message_type: MessageType, processor: Arc<dyn MessageProcessor>) {
        self.processors.insert(message_type, processor);
    }

    /// Decide how to handle one message, running its processor if any.
    pub fn dispatch(&self, message: &Message) -> Dispatch {
        if message.message_type == MessageType::KillProcessRequest {
            tracing::info!(message_id = message.message_id, "Received KillProcessRequest");
            return Dispatch::Stop;
        }

        match self.processors.get(&message.message_type) {
            Some(processor) => Dispatch::Respond(processor.process(message, &self.context)),
            None => {
                tracing::warn!(
                    message_type = %message.message_type,
                    message_id = message.message_id,
                    "No processor registered for message type"
                );
                Dispatch::Ignore
            }
        }
    }

    /// Response for a frame whose body does not decode.
    ///
    /// The host is answered with a failure when the body still names a
    /// message id; otherwise the frame is dropped.
    pub fn reject(&self, body: &[u8], error: &serde_json::Error) -> Option<Message> {
        let message_id = Message::peek_message_id(body);
        tracing::warn!(?message_id, error = %error, "Discarding undecodable message");

        message_id.map(|id| {
            Message::execution_status(
                id,
                ProtoExecutionResult::failure(format!("Failed to decode message: {error}"), "", 0),
            )
        })
    }

    /// Serve messages until the host sends `KillProcessRequest` or closes the
    /// connection.
    pub async fn run<S>(&self, connection: &mut GaugeConnection<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        tracing::info!(steps = self.context.registry().len(), "Runner ready");

        loop {
            let body = match connection
                .receive_frame()
                .await
                .context("Failed to receive message from Gauge")?
            {
                Some(body) => body,
                None => {
                    tracing::info!("Gauge closed the connection");
                    break;
                }
            };

            let dispatch = match Message::from_json(&body) {
                Ok(message) => self.dispatch(&message),
                Err(e) => match self.reject(&body, &e) {
                    Some(response) => Dispatch::Respond(response),
                    None => Dispatch::Ignore,
                },
            };

            match dispatch {
                Dispatch::Respond(response) => {
                    connection
                        .send_message(&response)
                        .await
                        .context("Failed to send response to Gauge")?;
                }
                Dispatch::Stop => break,
                Dispatch::Ignore => {}
            }
        }

        tracing::info!("Runner stopping");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StepRegistry;
    use gauge_common::ExecuteStepRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::AsyncWriteExt;

    fn dispatcher_with_counter() -> (MessageDispatcher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = StepRegistry::new().step("Count", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let dispatcher = MessageDispatcher::new(Arc::new(GaugeContext::new(registry)));
        (dispatcher, calls)
    }

    fn execute(message_id: i64, text: &str) -> Message {
        Message::execute_step(
            message_id,
            ExecuteStepRequest {
                parsed_step_text: text.to_string(),
                ..ExecuteStepRequest::default()
            },
        )
    }

    #[test]
    fn dispatch_execute_step() {
        let (dispatcher, calls) = dispatcher_with_counter();
        match dispatcher.dispatch(&execute(10, "Count")) {
            Dispatch::Respond(response) => {
                assert_eq!(response.message_id, 10);
                assert_eq!(response.message_type, MessageType::ExecutionStatusResponse);
            }
            other => panic!("unexpected dispatch: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_lifecycle_acknowledges() {
        let (dispatcher, calls) = dispatcher_with_counter();
        let dispatch = dispatcher.dispatch(&Message::new(MessageType::SpecExecutionEnding, 11));
        assert_eq!(
            dispatch,
            Dispatch::Respond(Message::execution_status(11, ProtoExecutionResult::success(0)))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dispatch_kill_stops() {
        let (dispatcher, _) = dispatcher_with_counter();
        assert_eq!(
            dispatcher.dispatch(&Message::new(MessageType::KillProcessRequest, 1)),
            Dispatch::Stop
        );
    }

    #[test]
    fn dispatch_unknown_is_ignored() {
        let (dispatcher, _) = dispatcher_with_counter();
        assert_eq!(
            dispatcher.dispatch(&Message::new(MessageType::Unknown, 1)),
            Dispatch::Ignore
        );
    }

    #[test]
    fn custom_processor_can_be_registered() {
        struct Echo;
        impl MessageProcessor for Echo {
            fn process(&self, message: &Message, _context: &GaugeContext) -> Message {
                Message::execution_status(message.message_id * 2, ProtoExecutionResult::success(0))
            }
        }

        let (mut dispatcher, _) = dispatcher_with_counter();
        dispatcher.register(MessageType::Unknown, Arc::new(Echo));
        match dispatcher.dispatch(&Message::new(MessageType::Unknown, 21)) {
            Dispatch::Respond(response) => assert_eq!(response.message_id, 42),
            other => panic!("unexpected dispatch: {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_serves_until_kill() {
        let (dispatcher, calls) = dispatcher_with_counter();
        let (host_side, runner_side) = tokio::io::duplex(16 * 1024);
        let mut host = GaugeConnection::new(host_side);
        let mut runner = GaugeConnection::new(runner_side);

        host.send_message(&Message::new(MessageType::ExecutionStarting, 1))
            .await
            .unwrap();
        host.send_message(&execute(2, "Count")).await.unwrap();
        host.send_message(&execute(3, "Missing step")).await.unwrap();
        host.send_message(&Message::new(MessageType::Unknown, 4))
            .await
            .unwrap();
        host.send_message(&Message::new(MessageType::KillProcessRequest, 5))
            .await
            .unwrap();

        dispatcher.run(&mut runner).await.unwrap();
        drop(runner);

        let first = host.receive_message().await.unwrap().unwrap();
        let second = host.receive_message().await.unwrap().unwrap();
        let third = host.receive_message().await.unwrap().unwrap();
        assert_eq!(first.message_id, 1);
        assert_eq!(second.message_id, 2);
        assert!(!second.execution_status_response.unwrap().execution_result.failed);
        assert_eq!(third.message_id, 3);
        assert!(third.execution_status_response.unwrap().execution_result.failed);
        // Unknown message got no response; the stream ends after the kill.
        assert!(host.receive_message().await.unwrap().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn run_ends_when_host_disconnects() {
        let (dispatcher, _) = dispatcher_with_counter();
        let (host_side, runner_side) = tokio::io::duplex(1024);
        drop(host_side);
        let mut runner = GaugeConnection::new(runner_side);
        dispatcher.run(&mut runner).await.unwrap();
    }

    #[test]
    fn lifecycle_types_are_acknowledged() {
        let (dispatcher, _) = dispatcher_with_counter();
        for message_type in MessageType::ALL.into_iter().filter(MessageType::is_lifecycle) {
            assert!(matches!(
                dispatcher.dispatch(&Message::new(message_type, 1)),
                Dispatch::Respond(_)
            ));
        }
    }

    #[tokio::test]
    async fn undecodable_request_fails_alone() {
        let (dispatcher, calls) = dispatcher_with_counter();
        let (mut host_side, runner_side) = tokio::io::duplex(16 * 1024);

        // Bad parameter type on an otherwise valid request, then a body with no id.
        for bad in [
            &br#"{"messageType":"ExecuteStep","messageId":9,"executeStepRequest":{"parsedStepText":"Count","parameters":[{"parameterType":"Bogus","value":"x"}]}}"#[..],
            &b"{not json"[..],
        ] {
            host_side.write_all(&(bad.len() as u32).to_le_bytes()).await.unwrap();
            host_side.write_all(bad).await.unwrap();
        }

        let mut host = GaugeConnection::new(host_side);
        let mut runner = GaugeConnection::new(runner_side);
        host.send_message(&execute(10, "Count")).await.unwrap();
        host.send_message(&Message::new(MessageType::KillProcessRequest, 11))
            .await
            .unwrap();

        dispatcher.run(&mut runner).await.unwrap();
        drop(runner);

        let rejected = host.receive_message().await.unwrap().unwrap();
        assert_eq!(rejected.message_id, 9);
        let result = rejected.execution_status_response.unwrap().execution_result;
        assert!(result.failed);
        assert!(result
            .error_message
            .unwrap_or_default()
            .starts_with("Failed to decode message"));

        let served = host.receive_message().await.unwrap().unwrap();
        assert_eq!(served.message_id, 10);
        assert!(!served.execution_status_response.unwrap().execution_result.failed);

        assert!(host.receive_message().await.unwrap().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn request_without_parameter_type_is_served() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = StepRegistry::new().step("Say {}", move |word: String| {
            assert_eq!(word, "x");
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let dispatcher = MessageDispatcher::new(Arc::new(GaugeContext::new(registry)));
        let (mut host_side, runner_side) = tokio::io::duplex(4096);

        let body = br#"{"messageType":"ExecuteStep","messageId":12,"executeStepRequest":{"parsedStepText":"Say {}","parameters":[{"value":"x"}]}}"#;
        host_side.write_all(&(body.len() as u32).to_le_bytes()).await.unwrap();
        host_side.write_all(body).await.unwrap();

        let mut host = GaugeConnection::new(host_side);
        let mut runner = GaugeConnection::new(runner_side);
        host.send_message(&Message::new(MessageType::KillProcessRequest, 13))
            .await
            .unwrap();

        dispatcher.run(&mut runner).await.unwrap();

        let response = host.receive_message().await.unwrap().unwrap();
        assert_eq!(response.message_id, 12);
        assert!(!response.execution_status_response.unwrap().execution_result.failed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
