//! Shared test helpers for exam-archive tests.

use std::sync::Arc;

use crate::asset_store::AssetStore;
use crate::catalog::Catalog;
use crate::config::{AssetConfig, Config, LogConfig, ServerConfig};
use crate::download_log::DownloadLog;
use crate::AppState;

/// Create a test AppState rooted in a temporary directory.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let asset_dir = temp_dir.path().join("pdfs");
    let log_path = temp_dir.path().join("download_log.csv");

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
        },
        assets: AssetConfig {
            directory: asset_dir.to_string_lossy().to_string(),
        },
        log: LogConfig {
            path: log_path.to_string_lossy().to_string(),
            retention_days: 30,
        },
    };

    let assets = AssetStore::new(&asset_dir).expect("Failed to create test asset store");
    let download_log = DownloadLog::new(&log_path, config.log.retention_days);

    Arc::new(AppState {
        config,
        catalog: Catalog::new(),
        assets,
        download_log,
    })
}
