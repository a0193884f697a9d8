// src/reshape/mod.rs
//
// Turns a fetched `Table` into the `Snapshot` shown on the dashboard:
// trim headers, fill absent cells, take the last row, keep the tracked
// columns and pivot them into attribute/value records.

use std::collections::HashMap;
use tracing::debug;

use crate::error::{DashError, DashResult};
use crate::snapshot::{Snapshot, SnapshotRecord};
use crate::table::Table;

/// The ordered column names the dashboard displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedColumns(Vec<String>);

impl TrackedColumns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TrackedColumns(names.into_iter().map(Into::into).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Run every step against `table` and build the snapshot for `tracked`.
pub fn reshape(table: &Table, tracked: &TrackedColumns) -> DashResult<Snapshot> {
    let headers = normalize_headers(&table.headers)?;
    let rows = fill_missing(&table.rows);
    let row = last_row(&rows)?;
    let projected = project(&headers, row, tracked)?;
    let snapshot = pivot(projected);
    debug!(
        rows = rows.len(),
        records = snapshot.len(),
        "reshaped last row"
    );
    Ok(snapshot)
}

/// 1) Strip surrounding whitespace from each header.
///
/// Two different raw names that trim to the same name make the column
/// ambiguous. A raw name repeated verbatim is not ambiguous: the first copy
/// wins and later ones are never looked up. Blank headers (trailing empty
/// cells in a sheet export) can never match a tracked column and are exempt.
pub fn normalize_headers(raw: &[String]) -> DashResult<Vec<String>> {
    let mut seen: HashMap<&str, &str> = HashMap::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());
    for name in raw {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            match seen.get(trimmed).copied() {
                Some(first) if first != name.as_str() => {
                    return Err(DashError::Schema {
                        column: trimmed.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert(trimmed, name.as_str());
                }
            }
        }
        out.push(trimmed.to_string());
    }
    Ok(out)
}

/// 2) Absent cells become empty strings; present cells are untouched.
pub fn fill_missing(rows: &[Vec<Option<String>>]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|c| c.clone().unwrap_or_default()).collect())
        .collect()
}

/// 3) The last data row.
pub fn last_row(rows: &[Vec<String>]) -> DashResult<&[String]> {
    rows.last().map(Vec::as_slice).ok_or(DashError::EmptyTable)
}

/// 4) Look up every tracked column, in tracked order, in `row`.
pub fn project<'a>(
    headers: &[String],
    row: &'a [String],
    tracked: &'a TrackedColumns,
) -> DashResult<Vec<(&'a str, &'a str)>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(headers.len());
    for (i, h) in headers.iter().enumerate() {
        index.entry(h.as_str()).or_insert(i);
    }

    tracked
        .names()
        .iter()
        .map(|name| -> DashResult<(&'a str, &'a str)> {
            let i = index
                .get(name.as_str())
                .copied()
                .ok_or_else(|| DashError::MissingColumn {
                    column: name.clone(),
                })?;
            let value = row.get(i).map(String::as_str).unwrap_or("");
            Ok((name.as_str(), value))
        })
        .collect()
}

/// 5) One record per projected column.
pub fn pivot(projected: Vec<(&str, &str)>) -> Snapshot {
    Snapshot::new(
        projected
            .into_iter()
            .map(|(attribute, value)| SnapshotRecord::new(attribute, value))
            .collect(),
    )
}
