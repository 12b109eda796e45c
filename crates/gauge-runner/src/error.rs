// Failures that end a single step request. None of them are fatal to the runner.

use gauge_sdk::StepError;

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// No registered step matches the parsed step text.
    #[error("Step implementation not found for step text: {0}")]
    StepNotFound(String),

    /// An `ExecuteStep` message arrived without its request payload.
    #[error("ExecuteStep message {0} carries no executeStepRequest")]
    MissingRequest(i64),

    /// Argument binding failed or the implementation reported an error.
    #[error(transparent)]
    Step(#[from] StepError),

    /// The implementation panicked.
    #[error("Step panicked: {message}")]
    Panicked {
        message: String,
        location: Option<String>,
        backtrace: Option<String>,
    },
}

impl ExecutionError {
    /// Text reported to the host as the failure's stack trace.
    pub fn stack_trace(&self) -> String {
        match self {
            ExecutionError::Step(e) => e.details(),
            ExecutionError::Panicked {
                location,
                backtrace,
                ..
            } => {
                let mut trace = match location {
                    Some(location) => format!("panicked at {location}"),
                    None => "panicked at unknown location".to_string(),
                };
                if let Some(backtrace) = backtrace {
                    trace.push('\n');
                    trace.push_str(backtrace);
                }
                trace
            }
            other => other.to_string(),
        }
    }
}
