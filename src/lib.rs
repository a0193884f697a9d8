pub mod config;
pub mod error;
pub mod fetch;
pub mod refresh;
pub mod render;
pub mod reshape;
pub mod server;
pub mod snapshot;
pub mod table;

pub use error::{DashError, DashResult};
pub use reshape::{reshape, TrackedColumns};
pub use snapshot::{PublishedSnapshot, Snapshot, SnapshotRecord};
pub use table::Table;
