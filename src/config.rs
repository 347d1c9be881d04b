use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub assets: AssetConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
}

#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// Directory holding the downloadable PDFs
    pub directory: String,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Path of the append-only download log
    pub path: String,
    /// Records older than this many days are dropped by the prune job
    pub retention_days: i64,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            directory: "./pdfs".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: "./download_log.csv".to_string(),
            retention_days: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        let directory = std::env::var("ASSET_DIR").unwrap_or_else(|_| "./pdfs".to_string());

        let log_path =
            std::env::var("LOG_FILE").unwrap_or_else(|_| "./download_log.csv".to_string());

        let retention_days = std::env::var("RETENTION_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let config = Config {
            server: ServerConfig {
                bind_address: format!("0.0.0.0:{port}"),
            },
            assets: AssetConfig { directory },
            log: LogConfig {
                path: log_path,
                retention_days,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.assets.directory.is_empty() {
            return Err(ConfigError::ValidationError(
                "ASSET_DIR cannot be empty".to_string(),
            ));
        }

        if self.log.path.is_empty() {
            return Err(ConfigError::ValidationError(
                "LOG_FILE cannot be empty".to_string(),
            ));
        }

        if self.log.retention_days < 1 {
            return Err(ConfigError::ValidationError(
                "RETENTION_DAYS must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
