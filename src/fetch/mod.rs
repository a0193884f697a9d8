// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{DashError, DashResult};
use crate::table::Table;

pub mod parse;

pub use parse::parse_table;

/// Anything that can hand the refresher a fresh `Table`.
pub trait TableSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = DashResult<Table>> + Send;
}

/// GET `url` and parse the body as CSV. One request, no retry.
#[instrument(level = "debug", skip(client, url), fields(url = %url))]
pub async fn fetch_table(client: &Client, url: &Url) -> DashResult<Table> {
    let transport = |source| DashError::Transport {
        url: url.to_string(),
        source,
    };

    let body = client
        .get(url.clone())
        .send()
        .await
        .map_err(transport)?
        .error_for_status()
        .map_err(transport)?
        .text()
        .await
        .map_err(transport)?;
    debug!(bytes = body.len(), "fetched sheet");

    parse_table(&body)
}

/// The published spreadsheet, read over HTTP.
#[derive(Clone)]
pub struct SheetSource {
    client: Client,
    url: Url,
}

impl SheetSource {
    /// Build a source whose requests give up after `timeout`.
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, url })
    }
}

impl TableSource for SheetSource {
    async fn fetch(&self) -> DashResult<Table> {
        fetch_table(&self.client, &self.url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use warp::{http::StatusCode, Filter};

    /// Serve `body` with `status` at `/sheet.csv` on an ephemeral port.
    fn serve_csv(status: StatusCode, body: &'static str) -> SocketAddr {
        let route = warp::path("sheet.csv")
            .map(move || warp::reply::with_status(body, status));
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn sheet_url(addr: SocketAddr) -> Url {
        Url::parse(&format!("http://{}/sheet.csv", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_table_over_http() {
        let addr = serve_csv(StatusCode::OK, "Total Registered,Visitors\n10,5\n12,7\n");
        let source = SheetSource::new(sheet_url(addr), Duration::from_secs(5)).unwrap();

        let table = source.fetch().await.unwrap();
        assert_eq!(table.headers, vec!["Total Registered", "Visitors"]);
        assert_eq!(table.row_count(), 2);
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let addr = serve_csv(StatusCode::NOT_FOUND, "nope");
        let source = SheetSource::new(sheet_url(addr), Duration::from_secs(5)).unwrap();

        let err = source.fetch().await.unwrap_err();
        assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    }

    #[tokio::test]
    async fn test_unreachable_source_is_transport_error() {
        // Port 9 (discard) on loopback is not listening in test environments.
        let url = Url::parse("http://127.0.0.1:9/sheet.csv").unwrap();
        let source = SheetSource::new(url, Duration::from_secs(2)).unwrap();

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, DashError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_slow_source_times_out_as_transport_error() {
        let route = warp::path("sheet.csv").and_then(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok::<_, warp::Rejection>("Visitors\n5\n")
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let source = SheetSource::new(sheet_url(addr), Duration::from_millis(100)).unwrap();
        let start = std::time::Instant::now();
        let err = source.fetch().await.unwrap_err();

        match err {
            DashError::Transport { source: e, .. } => assert!(e.is_timeout()),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_empty_body_is_format_error() {
        let addr = serve_csv(StatusCode::OK, "");
        let source = SheetSource::new(sheet_url(addr), Duration::from_secs(5)).unwrap();

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, DashError::Format { .. }));
    }
}
