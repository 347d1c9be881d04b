use std::sync::Arc;

use chrono::Weekday;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exam_archive::{
    api,
    asset_store::AssetStore,
    catalog::Catalog,
    config::Config,
    download_log::DownloadLog,
    scheduler::{self, Schedule},
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "exam-archive starting");

    // Load configuration
    let config = Config::load()?;

    // Initialize the asset store
    let assets = AssetStore::new(&config.assets.directory)?;
    info!("Serving assets from: {}", config.assets.directory);

    // Download log shared between request handlers and housekeeping
    let download_log = DownloadLog::new(&config.log.path, config.log.retention_days);
    info!(
        "Logging downloads to: {} (retention {} days)",
        config.log.path, config.log.retention_days
    );

    // Housekeeping: daily log prune, weekly usage report
    let prune_log = download_log.clone();
    let report_log = download_log.clone();
    let housekeeping_handles = vec![
        scheduler::spawn("log-prune", Schedule::daily(3, 0), move || {
            let log = prune_log.clone();
            async move {
                match log.prune().await {
                    Ok(dropped) => info!(dropped, "Pruned download log"),
                    Err(e) => tracing::error!(error = %e, "Download log prune failed"),
                }
            }
        }),
        scheduler::spawn("usage-report", Schedule::weekly(Weekday::Mon, 9, 0), move || {
            let log = report_log.clone();
            async move {
                match log.usage_summary().await {
                    Ok(summary) => info!(
                        total = summary.total,
                        top_subjects = ?summary.top_subjects,
                        top_users = ?summary.top_users,
                        "Weekly usage report"
                    ),
                    Err(e) => tracing::error!(error = %e, "Usage report failed"),
                }
            }
        }),
    ];

    // Create shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        catalog: Catalog::new(),
        assets,
        download_log,
    });

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup: abort background tasks
    info!("Shutting down background tasks");
    for handle in housekeeping_handles {
        handle.abort();
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
