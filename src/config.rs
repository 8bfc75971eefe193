use std::path::Path;

use serde::Deserialize;

use crate::classifier::{DEFAULT_ANCHOR, DEFAULT_SUFFIX};
use crate::dispatcher::DEFAULT_CONCURRENCY;
use crate::error::ConfigError;

/// Root configuration structure, deserialized from `.jar-sizer/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub database: DatabaseSettings,
}

/// How the repository tree is walked and classified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Path segment that marks the repository root, e.g. `repository`.
    pub anchor: String,
    /// File name suffix of the artifacts to measure.
    pub suffix: String,
    /// Maximum number of artifacts processed at once.
    pub concurrency: usize,
    pub progress_interval_ms: u64,
    /// Treat artifacts with no matching row as failures.
    pub strict: bool,
    /// Fixed shuffle seed; random when unset.
    pub seed: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            anchor: DEFAULT_ANCHOR.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            progress_interval_ms: 1000,
            strict: false,
            seed: None,
        }
    }
}

/// Non-secret database settings. Credentials only come from the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub table: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            table: "libraries".to_string(),
            max_connections: DEFAULT_CONCURRENCY as u32,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        validate_identifier(&self.database.table)
    }
}

/// The table name is interpolated into SQL, so only plain identifiers pass.
pub fn validate_identifier(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidTable(name.to_string()))
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<base_dir>/.jar-sizer/config.toml`
/// 3. `~/.config/jar-sizer/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(base_dir: &Path, config_override: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let local_config = base_dir.join(".jar-sizer").join("config.toml");
    if local_config.exists() {
        return read_config(&local_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("jar-sizer").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Connection parameters for the MySQL sink.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub table: String,
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("table", &self.table)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DatabaseConfig {
    /// Read `MYSQL_HOST`, `MYSQL_PORT`, `MYSQL_USER`, `MYSQL_PASSWORD` and
    /// `MYSQL_DATABASE` from the process environment.
    pub fn from_env(settings: &DatabaseSettings) -> Result<Self, ConfigError> {
        Self::from_lookup(settings, |var| std::env::var(var).ok())
    }

    pub fn from_lookup(
        settings: &DatabaseSettings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.is_empty());
        let required = |var: &'static str| non_empty(var).ok_or(ConfigError::MissingEnv { var });

        let port = match non_empty("MYSQL_PORT") {
            Some(value) => value.parse::<u16>().map_err(|e| {
                ConfigError::InvalidEnv {
                    var: "MYSQL_PORT",
                    value,
                    reason: e.to_string(),
                }
            })?,
            None => 3306,
        };

        Ok(Self {
            host: non_empty("MYSQL_HOST").unwrap_or_else(|| "localhost".to_string()),
            port,
            user: required("MYSQL_USER")?,
            // An empty password is legitimate; an unset one is not.
            password: lookup("MYSQL_PASSWORD").ok_or(ConfigError::MissingEnv {
                var: "MYSQL_PASSWORD",
            })?,
            database: required("MYSQL_DATABASE")?,
            table: settings.table.clone(),
            max_connections: settings.max_connections.max(1),
        })
    }
}
