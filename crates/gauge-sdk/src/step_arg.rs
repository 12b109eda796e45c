// Native step arguments and their conversion into implementation parameter types.

use crate::error::StepError;
use crate::table::Table;

/// A call-ready argument, already decoded from its wire representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepArg {
    Scalar(String),
    Table(Table),
}

impl StepArg {
    /// Short name of the argument shape, used in mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            StepArg::Scalar(_) => "string",
            StepArg::Table(_) => "table",
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            StepArg::Scalar(value) => Some(value),
            StepArg::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            StepArg::Table(table) => Some(table),
            StepArg::Scalar(_) => None,
        }
    }
}

/// Conversion from a positional [`StepArg`] into a step parameter type.
///
/// `index` is the zero-based parameter position, reported in errors.
pub trait FromStepArg: Sized {
    fn from_step_arg(arg: StepArg, index: usize) -> Result<Self, StepError>;
}

impl FromStepArg for StepArg {
    fn from_step_arg(arg: StepArg, _index: usize) -> Result<Self, StepError> {
        Ok(arg)
    }
}

impl FromStepArg for String {
    fn from_step_arg(arg: StepArg, index: usize) -> Result<Self, StepError> {
        match arg {
            StepArg::Scalar(value) => Ok(value),
            other => Err(StepError::ArgumentTypeMismatch {
                index,
                expected: "string",
                actual: other.kind(),
            }),
        }
    }
}

impl FromStepArg for Table {
    fn from_step_arg(arg: StepArg, index: usize) -> Result<Self, StepError> {
        match arg {
            StepArg::Table(table) => Ok(table),
            other => Err(StepError::ArgumentTypeMismatch {
                index,
                expected: "table",
                actual: other.kind(),
            }),
        }
    }
}

// Scalars parsed into primitive types via `FromStr`.
macro_rules! impl_from_step_arg_parse {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl FromStepArg for $ty {
                fn from_step_arg(arg: StepArg, index: usize) -> Result<Self, StepError> {
                    let value = String::from_step_arg(arg, index).map_err(|_| {
                        StepError::ArgumentTypeMismatch {
                            index,
                            expected: $name,
                            actual: "table",
                        }
                    })?;
                    value.trim().parse::<$ty>().map_err(|_| StepError::InvalidScalar {
                        index,
                        value,
                        target: $name,
                    })
                }
            }
        )*
    };
}

impl_from_step_arg_parse! {
    i32 => "i32",
    i64 => "i64",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
    f64 => "f64",
    bool => "bool",
}
