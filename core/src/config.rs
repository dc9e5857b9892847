pub use config::ConfigError;

use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

/// File consulted by [`RelDbConfig::load`] unless `RELDB_CONFIG` names another.
/// The extension is resolved by the `config` crate (`.toml`, `.json`, ...).
pub const DEFAULT_CONFIG_PATH: &str = "config/reldb";
pub const ENV_PREFIX: &str = "RELDB";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            json: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Database created and selected when a store is built from config.
    pub default_database: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct RelDbConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl RelDbConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("RELDB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_from(&path, ENV_PREFIX)
    }

    /// Layers defaults, the optional file at `path` and `{env_prefix}__SECTION__KEY`
    /// environment variables, later sources winning.
    pub fn load_from(path: &str, env_prefix: &str) -> Result<Self, ConfigError> {
        let defaults = LoggingConfig::default();

        let builder = Config::builder()
            .set_default("logging.filter", defaults.filter)?
            .set_default("logging.json", defaults.json)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(env_prefix).separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent");

        let config = RelDbConfig::load_from(path.to_str().unwrap(), "RELDB_TEST_NONE").unwrap();
        assert_eq!(config, RelDbConfig::default());
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reldb.toml");
        std::fs::write(
            &path,
            "[logging]\nfilter = \"reldb=debug\"\njson = true\n\n[store]\ndefault_database = \"main\"\n",
        )
        .unwrap();

        let config = RelDbConfig::load_from(path.to_str().unwrap(), "RELDB_TEST_FILE").unwrap();
        assert_eq!(config.logging.filter, "reldb=debug");
        assert!(config.logging.json);
        assert_eq!(config.store.default_database.as_deref(), Some("main"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reldb.toml");
        std::fs::write(&path, "[store]\ndefault_database = \"from_file\"\n").unwrap();

        std::env::set_var("RELDB_TEST_ENV__STORE__DEFAULT_DATABASE", "from_env");
        let config = RelDbConfig::load_from(path.to_str().unwrap(), "RELDB_TEST_ENV").unwrap();
        std::env::remove_var("RELDB_TEST_ENV__STORE__DEFAULT_DATABASE");

        assert_eq!(config.store.default_database.as_deref(), Some("from_env"));
    }
}
