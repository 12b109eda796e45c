// gauge-sdk: Foundation layer for the Gauge Rust runner.
// This crate has ZERO dependencies on other runner crates. It defines the
// values a step implementation receives and the adapters that turn ordinary
// closures into callable step implementations.

pub mod error;
pub mod step;
pub mod step_arg;
pub mod table;

// Re-export commonly used items at crate root
pub use error::StepError;
pub use step::{IntoStepImpl, StepFn, StepOutput};
pub use step_arg::{FromStepArg, StepArg};
pub use table::{Row, Table};
