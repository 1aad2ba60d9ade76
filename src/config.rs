use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{DictionaryError, ServiceOptions};
use crate::database::{DatabaseOptions, DEFAULT_DATABASE_FILE};
use crate::lexicon::DEFAULT_CAPTURE_CONCURRENCY;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub database: DatabaseConfig,
    pub ingestion: IngestionConfig,
    pub query: QueryConfig,
    pub server: ServerConfig,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// File name inside the data directory, or an absolute path.
    pub filename: PathBuf,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Directory loaded when `redic load` is given no argument.
    pub source_dir: Option<PathBuf>,
    /// Parsed files in flight before the parser waits on the writer.
    pub capture_concurrency: usize,
    pub timeout_secs: u64,
    /// Fail a batch on a word id count mismatch instead of skipping it.
    pub strict_consistency: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub lookup_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            filename: PathBuf::from(DEFAULT_DATABASE_FILE),
            max_connections: 5,
            busy_timeout_secs: 30,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            source_dir: None,
            capture_concurrency: DEFAULT_CAPTURE_CONCURRENCY,
            timeout_secs: 15 * 60,
            strict_consistency: false,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_secs: 2,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 2,
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/redic/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e}, using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Load an explicitly chosen file. Unlike [`load`](Self::load), a
    /// missing or invalid file is an error.
    pub fn load_from(path: &Path) -> Result<Self, DictionaryError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DictionaryError::Config(format!("{}: {e}", path.display())))?;
        let config = toml::from_str(&contents)
            .map_err(|e| DictionaryError::Config(format!("{}: {e}", path.display())))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("redic"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    /// Database file; a relative `filename` is resolved against the data directory.
    pub fn database_path(&self) -> PathBuf {
        if self.database.filename.is_absolute() {
            self.database.filename.clone()
        } else {
            self.data_dir().join(&self.database.filename)
        }
    }

    pub fn database_options(&self) -> DatabaseOptions {
        DatabaseOptions {
            max_connections: self.database.max_connections,
            busy_timeout: Duration::from_secs(self.database.busy_timeout_secs),
        }
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            capture_concurrency: self.ingestion.capture_concurrency,
            handoff_capacity: self.ingestion.capture_concurrency,
            strict_consistency: self.ingestion.strict_consistency,
        }
    }

    pub fn ingestion_timeout(&self) -> Duration {
        Duration::from_secs(self.ingestion.timeout_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.query.lookup_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("redic").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
