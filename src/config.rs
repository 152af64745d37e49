use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_COLLECTION: &str = "students";
const DEFAULT_LOG_FILE: &str = "logs/student-directory.log";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the student directory service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend that persists student records.
    pub storage_backend: StorageBackend,
    /// MongoDB connection string; required for the `mongo` backend.
    pub mongo_uri: Option<String>,
    /// Optional database override; otherwise the database named in the URI is used.
    pub mongo_database: Option<String>,
    /// Collection holding student documents.
    pub student_collection: String,
    /// HTTP listening port.
    pub server_port: u16,
    /// File that mirrors the stdout log; appended to across restarts.
    pub log_file: PathBuf,
}

/// Supported storage backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// MongoDB deployment reached through `MONGO_URI`.
    #[default]
    Mongo,
    /// Process-local store; contents are lost on exit.
    Memory,
}

/// Values supplied on the command line that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Overrides `PORT`.
    pub server_port: Option<u16>,
    /// Overrides `MONGO_URI`.
    pub mongo_uri: Option<String>,
    /// Overrides `STORAGE_BACKEND`.
    pub storage_backend: Option<StorageBackend>,
    /// Overrides `STUDENT_DIRECTORY_LOG_FILE`.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables, applying command-line overrides.
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok(), overrides)
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, overrides: ConfigOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let storage_backend = match overrides.storage_backend {
            Some(backend) => backend,
            None => optional("STORAGE_BACKEND")
                .map(|value| value.parse::<StorageBackend>())
                .transpose()?
                .unwrap_or_default(),
        };

        let mongo_uri = overrides.mongo_uri.or_else(|| optional("MONGO_URI"));
        if storage_backend == StorageBackend::Mongo && mongo_uri.is_none() {
            return Err(ConfigError::MissingVariable("MONGO_URI".into()));
        }

        let server_port = match overrides.server_port {
            Some(port) => port,
            None => optional("PORT")
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("PORT".into()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_PORT),
        };

        let log_file = overrides
            .log_file
            .or_else(|| optional("STUDENT_DIRECTORY_LOG_FILE").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

        Ok(Self {
            storage_backend,
            mongo_uri,
            mongo_database: optional("MONGO_DATABASE"),
            student_collection: optional("STUDENT_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            server_port,
            log_file,
        })
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::InvalidValue("STORAGE_BACKEND".into())),
        }
    }
}

/// Load configuration from `.env` and the environment.
///
/// Runs before tracing is installed, so it does not log; see [`crate::logging::init_tracing`].
pub fn init_config(overrides: ConfigOverrides) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    Config::from_env(overrides)
}
