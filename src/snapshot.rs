// src/snapshot.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One table row on the dashboard: a column name and its latest value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRecord {
    #[serde(rename = "Attribute")]
    pub attribute: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl SnapshotRecord {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        SnapshotRecord {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// The records for every tracked column, in tracked order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot(Vec<SnapshotRecord>);

impl Snapshot {
    pub fn new(records: Vec<SnapshotRecord>) -> Self {
        Snapshot(records)
    }

    pub fn records(&self) -> &[SnapshotRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A snapshot as served to the browser, stamped with when it was built.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedSnapshot {
    pub updated_at: DateTime<Utc>,
    pub data: Snapshot,
}

impl PublishedSnapshot {
    pub fn now(data: Snapshot) -> Self {
        PublishedSnapshot {
            updated_at: Utc::now(),
            data,
        }
    }
}
