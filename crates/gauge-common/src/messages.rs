// Wire messages exchanged with the Gauge host.
// JSON field names follow the host's camelCase message schema.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message kinds understood by the runner.
///
/// Unrecognised names deserialize to [`MessageType::Unknown`] so that a newer
/// host does not break the message loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum MessageType {
    ExecutionStarting,
    SpecExecutionStarting,
    ScenarioExecutionStarting,
    StepExecutionStarting,
    ExecuteStep,
    StepExecutionEnding,
    ScenarioExecutionEnding,
    SpecExecutionEnding,
    ExecutionEnding,
    ExecutionStatusResponse,
    KillProcessRequest,
    Unknown,
}

impl MessageType {
    /// Every known message kind, in protocol order.
    pub const ALL: [MessageType; 11] = [
        MessageType::ExecutionStarting,
        MessageType::SpecExecutionStarting,
        MessageType::ScenarioExecutionStarting,
        MessageType::StepExecutionStarting,
        MessageType::ExecuteStep,
        MessageType::StepExecutionEnding,
        MessageType::ScenarioExecutionEnding,
        MessageType::SpecExecutionEnding,
        MessageType::ExecutionEnding,
        MessageType::ExecutionStatusResponse,
        MessageType::KillProcessRequest,
    ];

    /// Convert from the wire name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ExecutionStarting" => MessageType::ExecutionStarting,
            "SpecExecutionStarting" => MessageType::SpecExecutionStarting,
            "ScenarioExecutionStarting" => MessageType::ScenarioExecutionStarting,
            "StepExecutionStarting" => MessageType::StepExecutionStarting,
            "ExecuteStep" => MessageType::ExecuteStep,
            "StepExecutionEnding" => MessageType::StepExecutionEnding,
            "ScenarioExecutionEnding" => MessageType::ScenarioExecutionEnding,
            "SpecExecutionEnding" => MessageType::SpecExecutionEnding,
            "ExecutionEnding" => MessageType::ExecutionEnding,
            "ExecutionStatusResponse" => MessageType::ExecutionStatusResponse,
            "KillProcessRequest" => MessageType::KillProcessRequest,
            _ => MessageType::Unknown,
        }
    }

    /// Lifecycle notifications the host sends around spec, scenario and step execution.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            MessageType::ExecutionStarting
                | MessageType::SpecExecutionStarting
                | MessageType::ScenarioExecutionStarting
                | MessageType::StepExecutionStarting
                | MessageType::StepExecutionEnding
                | MessageType::ScenarioExecutionEnding
                | MessageType::SpecExecutionEnding
                | MessageType::ExecutionEnding
        )
    }
}

impl From<String> for MessageType {
    fn from(name: String) -> Self {
        MessageType::from_name(&name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Envelope for every message on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_type: MessageType,

    /// Correlation id; responses echo the id of the request they answer.
    #[serde(default)]
    pub message_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_step_request: Option<ExecuteStepRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_status_response: Option<ExecutionStatusResponse>,
}

impl Message {
    /// A message with no payload.
    pub fn new(message_type: MessageType, message_id: i64) -> Self {
        Self {
            message_type,
            message_id,
            execute_step_request: None,
            execution_status_response: None,
        }
    }

    pub fn execute_step(message_id: i64, request: ExecuteStepRequest) -> Self {
        Self {
            execute_step_request: Some(request),
            ..Self::new(MessageType::ExecuteStep, message_id)
        }
    }

    /// An `ExecutionStatusResponse` answering the request with `message_id`.
    pub fn execution_status(message_id: i64, result: ProtoExecutionResult) -> Self {
        Self {
            execution_status_response: Some(ExecutionStatusResponse {
                execution_result: result,
            }),
            ..Self::new(MessageType::ExecutionStatusResponse, message_id)
        }
    }

    /// Decode one frame body.
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    /// Pull the correlation id out of a body that does not decode as a
    /// whole, so the host can still be answered.
    pub fn peek_message_id(body: &[u8]) -> Option<i64> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Envelope {
            message_id: i64,
        }

        serde_json::from_slice::<Envelope>(body)
            .ok()
            .map(|envelope| envelope.message_id)
    }
}

/// Request to run one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStepRequest {
    /// Step text as written in the spec, with parameter values inline.
    #[serde(default)]
    pub actual_step_text: String,

    /// Step text with parameters replaced by placeholders; the lookup key.
    #[serde(default)]
    pub parsed_step_text: String,

    #[serde(default)]
    pub scenario_failing: bool,

    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// Kind of a step parameter.
///
/// The host omits the field for `Static`, its zero value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    #[default]
    Static,
    Dynamic,
    #[serde(rename = "Special_String")]
    SpecialString,
    #[serde(rename = "Special_Table")]
    SpecialTable,
    Table,
}

impl ParameterType {
    /// Whether the parameter carries a table payload rather than a string value.
    pub fn is_table(&self) -> bool {
        matches!(self, ParameterType::Table | ParameterType::SpecialTable)
    }
}

/// One positional step parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(default)]
    pub parameter_type: ParameterType,

    #[serde(default)]
    pub value: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<ProtoTable>,
}

impl Parameter {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self {
            parameter_type: ParameterType::Static,
            value: value.into(),
            name: String::new(),
            table: None,
        }
    }

    pub fn table(parameter_type: ParameterType, table: ProtoTable) -> Self {
        Self {
            parameter_type,
            value: String::new(),
            name: String::new(),
            table: Some(table),
        }
    }
}

/// Wire form of a table: a header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtoTable {
    #[serde(default)]
    pub headers: ProtoTableRow,

    #[serde(default)]
    pub rows: Vec<ProtoTableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtoTableRow {
    #[serde(default)]
    pub cells: Vec<String>,
}

impl ProtoTableRow {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStatusResponse {
    pub execution_result: ProtoExecutionResult,
}

/// Outcome of a step (or lifecycle notification) as reported to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtoExecutionResult {
    #[serde(default)]
    pub failed: bool,

    #[serde(default)]
    pub recoverable_error: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,

    /// Wall-clock execution time in milliseconds.
    #[serde(default)]
    pub execution_time: i64,
}

impl ProtoExecutionResult {
    pub fn success(execution_time: i64) -> Self {
        Self {
            execution_time,
            ..Self::default()
        }
    }

    pub fn failure(
        error_message: impl Into<String>,
        stack_trace: impl Into<String>,
        execution_time: i64,
    ) -> Self {
        Self {
            failed: true,
            recoverable_error: false,
            error_message: Some(error_message.into()),
            stack_trace: Some(stack_trace.into()),
            execution_time,
        }
    }
}
