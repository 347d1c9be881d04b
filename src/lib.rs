//! exam-archive - A backend API for browsing academic subjects and downloading exam paper PDFs
//!
//! This crate serves a fixed catalog of theory and lab subjects and streams
//! the matching PDF documents (question papers, unit notes, lab materials):
//! - Static subject catalog with deterministic filename resolution
//! - Flat-directory asset store with path-traversal hardening
//! - Append-only CSV download log shared across in-flight requests
//! - Wall-clock housekeeping jobs (log pruning, weekly usage report)
//! - REST API for listing subjects/options/years and downloading files

pub mod api;
pub mod asset_store;
pub mod catalog;
pub mod config;
pub mod download_log;
pub mod scheduler;
#[cfg(test)]
pub mod testutil;

use asset_store::AssetStore;
use catalog::Catalog;
use config::Config;
use download_log::DownloadLog;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    pub assets: AssetStore,
    pub download_log: DownloadLog,
}
