// gauge-runner: Step lookup, argument binding and invocation for the Gauge Rust runner.
// Depends on `gauge-sdk` and `gauge-common`.
//
// Architecture:
//   runner::run → MessageDispatcher::run → MessageProcessor::process
//     → ExecuteStepProcessor: StepRegistry::find → args::build_args → StepInvoker::invoke

pub mod args;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod invoker;
pub mod processors;
pub mod registry;
pub mod runner;
pub mod table_converter;

pub use context::GaugeContext;
pub use dispatcher::{Dispatch, MessageDispatcher};
pub use error::ExecutionError;
pub use invoker::{ExecutionOutcome, StepInvoker};
pub use processors::MessageProcessor;
pub use registry::{Step, StepRegistry};
pub use runner::{run, serve};

// Step authors only need this crate.
pub use gauge_sdk::{FromStepArg, Row, StepArg, StepError, Table};
