use config::Config;
use error_stack::{report, ResultExt};
use thiserror::Error;

use super::{database_config::DatabaseConfig, sheets_config::SpreadsheetConfig};

pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
const DEFAULT_CONFIG_NAME: &str = "Config";

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sheets: SpreadsheetConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing config property: {0}")]
    MissingProperty(String),
    #[error("Error reading config file '{0}'")]
    Read(String),
    #[error("Failed to deserialize config field '{0}'")]
    InvalidField(String),
}

impl AppConfig {
    /// Loads `Config.{toml,yaml,json}` from the working directory, or the file named by
    /// `CONFIG_PATH`.
    pub fn load() -> error_stack::Result<AppConfig, ConfigError> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_NAME.to_string());
        tracing::debug!("Loading config from '{}'", config_path);
        Self::load_from(config::File::with_name(&config_path), &config_path)
    }

    pub fn load_from<S>(source: S, origin: &str) -> error_stack::Result<AppConfig, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(source)
            .build()
            .map_err(|e| match e {
                config::ConfigError::NotFound(property) => {
                    report!(ConfigError::MissingProperty(property))
                }
                other => report!(other).change_context(ConfigError::Read(origin.to_string())),
            })?;

        let value = config
            .try_deserialize::<serde_json::Value>()
            .change_context(ConfigError::Read(origin.to_string()))?;

        let app_config: AppConfig = serde_path_to_error::deserialize(value).map_err(|e| {
            let path = e.path().to_string();
            report!(e.into_inner())
                .change_context(ConfigError::InvalidField(path))
                .attach_printable(format!(
                    "Make sure all required fields are present in the configuration file '{}'",
                    origin
                ))
        })?;

        Ok(app_config)
    }
}
