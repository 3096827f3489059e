//! Activity Feed Monitor: binary entrypoint
//! Boots the Axum HTTP server: dataset listing, per-dataset freshness and
//! Prometheus metrics.

use activity_feed_monitor::{build_state, config, metrics::Metrics, router};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("activity_feed_monitor=info,feed=info,datasets=info,warn"));

    // shuttle may already have installed a subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = config::load_config_default()?;
    tracing::info!(
        window_secs = cfg.recency_window_secs,
        datasets = %cfg.datasets_path.display(),
        "monitor config loaded"
    );

    let metrics = Metrics::init(cfg.recency_window_secs)?;
    let state = build_state(&cfg).await?;
    let app = router(state).merge(metrics.router());

    Ok(app.into())
}
