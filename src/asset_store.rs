use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Asset not found: {0}")]
    NotFound(String),
}

/// An open asset ready to be streamed back to the client.
pub struct Asset {
    pub file: tokio::fs::File,
    pub byte_size: u64,
}

/// Read-only accessor for the flat directory of downloadable PDFs.
pub struct AssetStore {
    base_dir: PathBuf,
}

impl AssetStore {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&base_dir)?;
        // Canonicalized so fetch() can prefix-check resolved paths against it.
        let base_dir = base_dir.as_ref().canonicalize()?;
        Ok(Self { base_dir })
    }

    /// Open the named asset for reading.
    ///
    /// The filename is resolved against the base directory only; anything
    /// that escapes it (`..` segments, absolute paths, symlinks pointing
    /// outside) is treated as not found.
    pub async fn fetch(&self, filename: &str) -> Result<Asset, AssetStoreError> {
        let candidate = self.base_dir.join(filename);

        let resolved = tokio::fs::canonicalize(&candidate)
            .await
            .map_err(|_| AssetStoreError::NotFound(filename.to_string()))?;

        if !resolved.starts_with(&self.base_dir) {
            return Err(AssetStoreError::NotFound(filename.to_string()));
        }

        let file = tokio::fs::File::open(&resolved)
            .await
            .map_err(|_| AssetStoreError::NotFound(filename.to_string()))?;

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(AssetStoreError::NotFound(filename.to_string()));
        }

        Ok(Asset {
            file,
            byte_size: metadata.len(),
        })
    }
}
