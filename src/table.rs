// src/table.rs

/// A parsed sheet, as received from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column names from the header row, exactly as the source sent them.
    pub headers: Vec<String>,
    /// Each data row, one cell per header. `None` is an absent cell.
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Table { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
