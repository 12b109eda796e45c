// Errors raised while binding arguments to, or running, a step implementation.

/// Error produced by a step adapter or by the step implementation itself.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// The request carried a different number of parameters than the
    /// implementation declares.
    #[error("Argument count mismatch: step expects {expected} argument(s) but {actual} were supplied.")]
    ArityMismatch { expected: usize, actual: usize },

    /// A parameter had the wrong shape (e.g. a table where a string was expected).
    #[error("Argument type mismatch at position {index}: expected {expected}, got {actual}.")]
    ArgumentTypeMismatch {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// A scalar parameter could not be parsed into the declared native type.
    #[error("Argument at position {index} could not be converted to {target}: '{value}'.")]
    InvalidScalar {
        index: usize,
        value: String,
        target: &'static str,
    },

    /// The step implementation returned an error.
    #[error("{0:#}")]
    Failed(anyhow::Error),
}

impl StepError {
    /// Detailed, multi-line description used as the reported stack trace.
    pub fn details(&self) -> String {
        match self {
            StepError::Failed(e) => format!("{e:?}"),
            other => other.to_string(),
        }
    }
}
