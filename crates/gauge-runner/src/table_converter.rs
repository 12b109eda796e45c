// Conversion of wire tables into the native table model.

use gauge_common::ProtoTable;
use gauge_sdk::Table;

/// Convert a wire table, keeping header order and row order.
///
/// Rows whose cell count differs from the header count are repaired rather
/// than rejected: short rows are padded with empty cells, long rows are
/// truncated. Each repair is logged.
pub fn to_table(proto: &ProtoTable) -> Table {
    let headers = proto.headers.cells.clone();
    let width = headers.len();
    let mut table = Table::new(headers);

    for (index, row) in proto.rows.iter().enumerate() {
        let mut cells = row.cells.clone();
        if cells.len() != width {
            tracing::warn!(
                row = index,
                cells = cells.len(),
                headers = width,
                "Table row does not match header count; padding or truncating"
            );
            cells.resize(width, String::new());
        }
        table.add_row(cells);
    }

    table
}
