//! Application-level configuration loading: listen port, storage backend and
//! password hashing cost.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAME_REGISTRY_CONFIG_PATH";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// MongoDB collections with unique indexes.
    Mongo,
    /// Process-local maps; data is lost on restart.
    Memory,
}

impl StorageKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Some(StorageKind::Mongo),
            "memory" | "in-memory" => Some(StorageKind::Memory),
            _ => None,
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PasswordHashingConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for PasswordHashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// TCP port the HTTP server listens on.
    pub port: u16,
    /// Which storage backend to install.
    pub storage: StorageKind,
    /// MongoDB connection string.
    pub mongo_uri: String,
    /// MongoDB database name; the backend default applies when absent.
    pub mongo_db: Option<String>,
    /// Cost of password hashes created from now on.
    pub password_hashing: PasswordHashingConfig,
}

impl AppConfig {
    /// Load the configuration file, falling back to built-in defaults, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_overrides(|key| env::var(key).ok())
    }

    /// Apply `PORT`/`API_PORT`, `STORAGE`, `MONGO_URI` and `MONGO_DB` overrides.
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("PORT").or_else(|| lookup("API_PORT")) {
            match raw.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(err) => warn!(value = %raw, error = %err, "ignoring invalid port override"),
            }
        }

        if let Some(raw) = lookup("STORAGE") {
            match StorageKind::parse(&raw) {
                Some(kind) => self.storage = kind,
                None => warn!(value = %raw, "ignoring unknown storage backend override"),
            }
        }

        if let Some(uri) = lookup("MONGO_URI").filter(|uri| !uri.is_empty()) {
            self.mongo_uri = uri;
        }

        if let Some(db) = lookup("MONGO_DB").filter(|db| !db.is_empty()) {
            self.mongo_db = Some(db);
        }

        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            storage: StorageKind::Mongo,
            mongo_uri: DEFAULT_MONGO_URI.to_owned(),
            mongo_db: None,
            password_hashing: PasswordHashingConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    port: Option<u16>,
    storage: Option<StorageKind>,
    mongo_uri: Option<String>,
    mongo_db: Option<String>,
    password_hashing: PasswordHashingConfig,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            port: value.port.unwrap_or(defaults.port),
            storage: value.storage.unwrap_or(defaults.storage),
            mongo_uri: value.mongo_uri.unwrap_or(defaults.mongo_uri),
            mongo_db: value.mongo_db,
            password_hashing: value.password_hashing,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"storage": "memory", "password_hashing": {"iterations": 3}}"#)
                .unwrap();
        let config: AppConfig = raw.into();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.password_hashing.iterations, 3);
        assert_eq!(
            config.password_hashing.memory_kib,
            argon2::Params::DEFAULT_M_COST
        );
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = AppConfig::default().with_overrides(lookup(&[
            ("API_PORT", "9000"),
            ("STORAGE", "Memory"),
            ("MONGO_URI", "mongodb://db:27017"),
            ("MONGO_DB", "rtype"),
        ]));

        assert_eq!(config.port, 9000);
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.mongo_uri, "mongodb://db:27017");
        assert_eq!(config.mongo_db.as_deref(), Some("rtype"));
    }

    #[test]
    fn port_takes_precedence_and_invalid_values_are_ignored() {
        let config = AppConfig::default()
            .with_overrides(lookup(&[("PORT", "7000"), ("API_PORT", "9000")]));
        assert_eq!(config.port, 7000);

        let config = AppConfig::default()
            .with_overrides(lookup(&[("PORT", "not-a-port"), ("STORAGE", "sqlite")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.storage, StorageKind::Mongo);
    }
}
