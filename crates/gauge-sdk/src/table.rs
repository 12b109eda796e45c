// Native table model handed to step implementations.

use serde::{Deserialize, Serialize};

/// A single table row. Cell order matches the owning table's header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }
}

/// Tabular step parameter: ordered headers plus ordered rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given headers.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row of cells.
    pub fn add_row(&mut self, cells: Vec<String>) {
        self.rows.push(Row::new(cells));
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows (the header row is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the named header, if present.
    pub fn header_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// All values of the named column, in row order.
    ///
    /// Returns `None` when the header does not exist. Rows that are too short
    /// to hold the column contribute an empty string.
    pub fn column(&self, header: &str) -> Option<Vec<&str>> {
        let index = self.header_index(header)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.cells.get(index).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    /// Cell value at `row` under the named header.
    pub fn get(&self, row: usize, header: &str) -> Option<&str> {
        let index = self.header_index(header)?;
        self.rows
            .get(row)
            .and_then(|r| r.cells.get(index))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec!["Name".to_string(), "Count".to_string()]);
        table.add_row(vec!["apples".to_string(), "3".to_string()]);
        table.add_row(vec!["pears".to_string(), "5".to_string()]);
        table
    }

    #[test]
    fn new_table_is_empty() {
        let table = Table::new(vec!["A".to_string()]);
        assert!(table.is_empty());
        assert_eq!(table.headers(), ["A".to_string()]);
    }

    #[test]
    fn rows_keep_insertion_order() {
        let table = sample();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].cells, vec!["apples".to_string(), "3".to_string()]);
        assert_eq!(table.rows()[1].cells[0], "pears");
    }

    #[test]
    fn column_lookup() {
        let table = sample();
        assert_eq!(table.column("Count"), Some(vec!["3", "5"]));
        assert_eq!(table.column("Missing"), None);
    }

    #[test]
    fn cell_lookup() {
        let table = sample();
        assert_eq!(table.get(1, "Name"), Some("pears"));
        assert_eq!(table.get(2, "Name"), None);
        assert_eq!(table.get(0, "Nope"), None);
    }

    #[test]
    fn serialization_roundtrip() {
        let table = sample();
        let json = serde_json::to_string(&table).unwrap();
        let back: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
