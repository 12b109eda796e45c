// Argument builder: wire parameters to positional step arguments.

use gauge_common::Parameter;
use gauge_sdk::{StepArg, Table};

use crate::table_converter::to_table;

/// Convert parameters in order; the result has one argument per parameter.
///
/// Inline and special (file-referenced) tables decode identically.
pub fn build_args(parameters: &[Parameter]) -> Vec<StepArg> {
    parameters.iter().enumerate().map(build_arg).collect()
}

fn build_arg((index, parameter): (usize, &Parameter)) -> StepArg {
    if !parameter.parameter_type.is_table() {
        return StepArg::Scalar(parameter.value.clone());
    }

    match parameter.table.as_ref() {
        Some(proto) => StepArg::Table(to_table(proto)),
        None => {
            tracing::warn!(
                index,
                parameter_type = ?parameter.parameter_type,
                "Table parameter has no table payload; passing an empty table"
            );
            StepArg::Table(Table::default())
        }
    }
}
