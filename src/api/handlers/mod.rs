mod catalog;
mod downloads;

pub use catalog::{health, index, list_options, list_subjects, list_years};
pub use downloads::{download, download_by_name};
