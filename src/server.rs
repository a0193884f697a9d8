// src/server.rs

use anyhow::{Context, Result};
use serde::Serialize;
use std::{convert::Infallible, future::Future, net::SocketAddr, sync::Arc};
use tracing::info;
use warp::{http::StatusCode, reject::Rejection, reply::Reply, Filter};

use crate::config::PageConfig;
use crate::refresh::SnapshotReader;
use crate::render::render_page;

const SERVICE_NAME: &str = "sheetdash";

/// What every handler needs: a read handle on the snapshot cell plus the
/// static page settings.
#[derive(Clone)]
pub struct AppState {
    pub snapshots: SnapshotReader,
    pub page: Arc<PageConfig>,
    pub refresh_interval_ms: u64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: Option<String>,
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

async fn dashboard_page(state: AppState) -> Result<impl Reply, Rejection> {
    let current = state.snapshots.current();
    Ok(warp::reply::html(render_page(
        &state.page,
        current.as_ref().map(|p| &p.data),
        state.refresh_interval_ms,
    )))
}

async fn latest_snapshot(state: AppState) -> Result<impl Reply, Rejection> {
    match state.snapshots.current() {
        Some(published) => Ok(warp::reply::with_status(
            warp::reply::json(&*published),
            StatusCode::OK,
        )),
        None => Ok(warp::reply::with_status(
            warp::reply::json(&ErrorResponse {
                error: "No snapshot yet".to_string(),
                details: Some("the first refresh has not completed".to_string()),
            }),
            StatusCode::SERVICE_UNAVAILABLE,
        )),
    }
}

async fn health_check(state: AppState) -> Result<impl Reply, Rejection> {
    let current = state.snapshots.current();
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "has_snapshot": current.is_some(),
        "updated_at": current.map(|p| p.updated_at),
    })))
}

/// `GET /`, `GET /api/snapshot` and `GET /health`.
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(dashboard_page);

    let snapshot = warp::path!("api" / "snapshot")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(latest_snapshot);

    let health = warp::path!("health")
        .and(warp::get())
        .and(with_state(state))
        .and_then(health_check);

    index
        .or(snapshot)
        .or(health)
        .with(warp::trace::request())
}

/// Bind `0.0.0.0:port` and serve until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let (addr, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(SocketAddr::from(([0, 0, 0, 0], port)), shutdown)
        .with_context(|| format!("binding port {}", port))?;

    info!("Server listening on http://{}", addr);
    info!("Snapshot endpoint: http://{}/api/snapshot", addr);
    server.await;
    Ok(())
}
