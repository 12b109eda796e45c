// gauge-common: Shared protocol types and infrastructure for the Gauge Rust runner.
// Depends on nothing else in the workspace; `gauge-runner` builds on it.

pub mod connection;
pub mod constants;
pub mod messages;
pub mod settings;

// ---------------------------------------------------------------------------
// Re-exports for convenient access
// ---------------------------------------------------------------------------

pub use connection::GaugeConnection;
pub use messages::{
    ExecuteStepRequest, ExecutionStatusResponse, Message, MessageType, Parameter, ParameterType,
    ProtoExecutionResult, ProtoTable, ProtoTableRow,
};
pub use settings::RunnerSettings;
