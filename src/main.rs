use anyhow::Result;
use sheetdash::{
    config::Config,
    fetch::SheetSource,
    refresh::{self, snapshot_cell},
    server::{self, AppState},
};
use std::{env, sync::Arc};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config = Config::load()?;
    let source_url = config.source_url()?;
    info!(
        url = %source_url,
        columns = config.tracked_columns.len(),
        interval_ms = config.refresh_interval_ms,
        timeout_secs = config.fetch_timeout_secs,
        "config loaded"
    );

    // ─── 3) spawn the refresher ──────────────────────────────────────
    let source = SheetSource::new(source_url, config.fetch_timeout())?;
    let (writer, reader) = snapshot_cell();
    let refresher = tokio::spawn(refresh::run(
        source,
        config.tracked(),
        config.refresh_interval(),
        writer,
    ));

    // ─── 4) serve until ctrl-c ───────────────────────────────────────
    let state = AppState {
        snapshots: reader,
        page: Arc::new(config.page.clone()),
        refresh_interval_ms: config.refresh_interval_ms,
    };
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
        info!("shutdown requested");
    };
    server::serve(state, config.port, shutdown).await?;

    refresher.abort();
    info!("all done");
    Ok(())
}
