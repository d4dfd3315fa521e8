use std::{env, net::SocketAddr, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be a number")]
    NotANumber(&'static str),
    #[error("invalid {var} value: {value}")]
    UnknownBackend { var: &'static str, value: String },
    #[error("invalid host or port: {0}")]
    BadAddress(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    Mongo,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Local,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_type: DatabaseType,
    pub mongo_uri: String,
    pub database_name: String,
    pub storage_type: StorageType,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let database_type = match or("DATABASE_TYPE", "mongo").as_str() {
            "mongo" => DatabaseType::Mongo,
            "memory" => DatabaseType::Memory,
            other => {
                return Err(ConfigError::UnknownBackend {
                    var: "DATABASE_TYPE",
                    value: other.to_string(),
                });
            }
        };
        let storage_type = match or("STORAGE_TYPE", "local").as_str() {
            "local" => StorageType::Local,
            "memory" => StorageType::Memory,
            other => {
                return Err(ConfigError::UnknownBackend {
                    var: "STORAGE_TYPE",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            host: or("HOST", "0.0.0.0"),
            port: or("PORT", "5000")
                .parse()
                .map_err(|_| ConfigError::NotANumber("PORT"))?,
            database_type,
            mongo_uri: or("MONGO_URI", "mongodb://localhost:27017"),
            database_name: or("DATABASE_NAME", "event_management"),
            storage_type,
            upload_dir: PathBuf::from(or("UPLOAD_DIR", "./uploads")),
            max_upload_bytes: or("MAX_UPLOAD_BYTES", "10485760")
                .parse()
                .map_err(|_| ConfigError::NotANumber("MAX_UPLOAD_BYTES"))?,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::BadAddress(addr))
    }
}
