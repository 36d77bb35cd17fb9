//! TOML-based configuration for sqlblend.
//!
//! Supports a config file (sqlblend.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [compile]
//! stable_views = true
//! pretty = true
//!
//! [source]
//! sql_dir = "${BLEND_SQL_DIR}"
//!
//! [source.slugs]
//! AbCdEf12 = "4211"
//!
//! [connections.warehouse]
//! dialect = "snowflake"
//!
//! [connections.lake]
//! dialect = "bigquery_standard_sql"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SQLBLEND_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Defaults for compile requests.
    pub compile: CompileSettings,

    /// Where query SQL is read from.
    pub source: SourceSettings,

    /// Named warehouse connections.
    pub connections: HashMap<String, ConnectionSettings>,
}

/// Compile defaults; CLI flags override them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompileSettings {
    /// Rewrite ephemeral derived tables to their stable views.
    pub stable_views: bool,

    /// Pretty-print the blended SQL.
    pub pretty: bool,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            stable_views: false,
            pretty: true,
        }
    }
}

/// Query SQL location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Directory holding `<query_id>.sql` files (supports ${ENV_VAR} expansion).
    pub sql_dir: String,

    /// Slug → query id.
    pub slugs: HashMap<String, String>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            sql_dir: ".".to_string(),
            slugs: HashMap::new(),
        }
    }
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Upstream dialect name, e.g. `snowflake` (supports ${ENV_VAR} expansion).
    pub dialect: String,
}

impl ConnectionSettings {
    /// Get the dialect name with environment variables expanded.
    pub fn resolved_dialect(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.dialect)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SQLBLEND_CONFIG`
    /// 2. `./sqlblend.toml`
    /// 3. `~/.config/sqlblend/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("sqlblend.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("sqlblend").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Load from `path` when given, otherwise search the default locations.
    pub fn load_from(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// The SQL directory with environment variables expanded.
    pub fn sql_dir(&self) -> Result<PathBuf, SettingsError> {
        expand_env_vars(&self.source.sql_dir).map(PathBuf::from)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
