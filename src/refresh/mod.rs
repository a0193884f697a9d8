// src/refresh/mod.rs

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    time::{interval, Instant, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::error::DashResult;
use crate::fetch::TableSource;
use crate::reshape::{reshape, TrackedColumns};
use crate::snapshot::PublishedSnapshot;

type Slot = Option<Arc<PublishedSnapshot>>;

/// Create the cell holding the currently displayed snapshot. There is one
/// writer (the refresh task) and any number of readers.
pub fn snapshot_cell() -> (SnapshotWriter, SnapshotReader) {
    let (tx, rx) = watch::channel(None);
    (SnapshotWriter { tx }, SnapshotReader { rx })
}

/// Write half of the snapshot cell. Not `Clone`: only the refresher holds it.
pub struct SnapshotWriter {
    tx: watch::Sender<Slot>,
}

impl SnapshotWriter {
    /// Replace the displayed snapshot as a whole.
    pub fn publish(&self, snapshot: PublishedSnapshot) -> Arc<PublishedSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.tx.send_replace(Some(Arc::clone(&snapshot)));
        snapshot
    }
}

/// Read half of the snapshot cell.
#[derive(Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Slot>,
}

impl SnapshotReader {
    pub fn current(&self) -> Option<Arc<PublishedSnapshot>> {
        self.rx.borrow().clone()
    }

    /// Wait for the next publish. Returns `false` once the writer is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// One tick: fetch, reshape, publish. On error nothing is published and the
/// previous snapshot stays in place.
pub async fn refresh_once<S: TableSource>(
    source: &S,
    tracked: &TrackedColumns,
    writer: &SnapshotWriter,
) -> DashResult<Arc<PublishedSnapshot>> {
    let table = source.fetch().await?;
    let snapshot = reshape(&table, tracked)?;
    Ok(writer.publish(PublishedSnapshot::now(snapshot)))
}

/// Poll `source` every `every`, forever. The first tick fires immediately.
///
/// Ticks run one after another; a tick that overruns the interval makes the
/// loop skip the ticks it missed instead of bursting. Failures are logged and
/// retried on the next tick, with no backoff.
pub async fn run<S: TableSource>(
    source: S,
    tracked: TrackedColumns,
    every: Duration,
    writer: SnapshotWriter,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let start = Instant::now();
        match refresh_once(&source, &tracked, &writer).await {
            Ok(published) => {
                info!(
                    records = published.data.len(),
                    elapsed = ?start.elapsed(),
                    "snapshot refreshed"
                );
            }
            Err(e) => {
                warn!(
                    code = e.error_code(),
                    error = %e,
                    elapsed = ?start.elapsed(),
                    "refresh failed; keeping previous snapshot"
                );
            }
        }
    }
}
