//! Run configuration
//!
//! [`ReorderConfig`] is resolved once at startup and passed by value to the
//! rest of the crate; nothing else reads the environment. Sources, lowest
//! precedence first:
//!
//! 1. built-in defaults (`root`, empty password, `127.0.0.1`, no house style)
//! 2. `config/tablesort.toml` if present (keys `user`, `password`, `host`, `custom`)
//! 3. `MYSQL_USER`, `MYSQL_PASSWORD`, `MYSQL_HOST` (empty values are ignored)
//! 4. command-line flags
//!
//! The database name only comes from the command line.

use crate::connection::{parse_host, ConnectionOptions};
use crate::error::{ConnectionError, ReorderError, UsageError};
use config::{Config, ConfigBuilder, ConfigError, Environment, File, Map};
use config::builder::DefaultState;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "config/tablesort.toml";
pub const ENV_PREFIX: &str = "MYSQL";

/// The only environment variables consulted; `--custom` has no fallback
pub const ENV_VARS: [&str; 3] = ["MYSQL_USER", "MYSQL_PASSWORD", "MYSQL_HOST"];

/// Values given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub db: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub custom: bool,
}

#[derive(Debug, Deserialize)]
struct Settings {
    #[serde(default = "default_user")]
    user: String,
    #[serde(default)]
    password: String,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default)]
    custom: bool,
}

fn default_user() -> String {
    "root".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Fully resolved settings for one run
#[derive(Clone, PartialEq, Eq)]
pub struct ReorderConfig {
    pub db: String,
    pub user: String,
    pub password: String,
    pub host: String,
    /// House-style rendering
    pub custom: bool,
}

impl fmt::Debug for ReorderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReorderConfig")
            .field("db", &self.db)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("custom", &self.custom)
            .finish()
    }
}

impl ReorderConfig {
    /// Resolve from `config/tablesort.toml`, the process environment and `overrides`
    ///
    /// # Errors
    ///
    /// Returns `ReorderError::Usage` if no database was given, or
    /// `ReorderError::Config` if the sources cannot be merged.
    pub fn load(overrides: ConfigOverrides) -> Result<Self, ReorderError> {
        Self::load_from(overrides, DEFAULT_CONFIG_FILE, None)
    }

    /// Like [`ReorderConfig::load`] with an explicit file and environment
    ///
    /// `env` replaces the process environment when `Some`.
    pub fn load_from(
        overrides: ConfigOverrides,
        config_file: impl AsRef<Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ReorderError> {
        let db = overrides
            .db
            .clone()
            .filter(|db| !db.is_empty())
            .ok_or(UsageError::MissingDatabase)?;

        let config_file = config_file.as_ref();
        let environment = Environment::with_prefix(ENV_PREFIX)
            .ignore_empty(true)
            .source(Some(connection_env(env)));

        let with_file = base_builder()?
            .add_source(File::from(config_file).required(false))
            .add_source(environment.clone());

        let settings = match apply_overrides(with_file, &overrides)?.build() {
            Ok(settings) => settings,
            Err(err) => {
                // Unreadable file: warn and carry on with env + flags only
                if config_file.exists() {
                    log::warn!(
                        "Failed to load {}, falling back to env. Error: {}",
                        config_file.display(),
                        err
                    );
                }
                apply_overrides(base_builder()?.add_source(environment), &overrides)?
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, \
                             then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        let settings: Settings = settings.try_deserialize()?;

        Ok(Self {
            db,
            user: settings.user,
            password: settings.password,
            host: settings.host,
            custom: settings.custom,
        })
    }

    /// Connection parameters for this configuration
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::InvalidHost` if `host` is not `host[:port]`.
    pub fn connection_options(&self) -> Result<ConnectionOptions, ConnectionError> {
        let (host, port) = parse_host(&self.host)?;
        Ok(ConnectionOptions {
            host,
            port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.db.clone(),
        })
    }
}

/// `ENV_VARS` from `env`, or from the process environment when `None`
fn connection_env(env: Option<Map<String, String>>) -> Map<String, String> {
    env.unwrap_or_else(|| std::env::vars().collect())
        .into_iter()
        .filter(|(key, _)| ENV_VARS.contains(&key.as_str()))
        .collect()
}

fn base_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("user", default_user())?
        .set_default("password", "")?
        .set_default("host", default_host())?
        .set_default("custom", false)
}

fn apply_overrides(
    builder: ConfigBuilder<DefaultState>,
    overrides: &ConfigOverrides,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_override_option("user", overrides.user.clone())?
        .set_override_option("password", overrides.password.clone())?
        .set_override_option("host", overrides.host.clone())?
        .set_override_option("custom", overrides.custom.then_some(true))
}
