use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "LONGBOX_ENV";
const CONFIG_DIR_ENV: &str = "LONGBOX_CONFIG_DIR";
const ENV_PREFIX: &str = "LONGBOX";

/// Plain variables honoured for compatibility with existing deployments.
const PORT_ENV: &str = "PORT";
const MONGO_URI_ENV: &str = "MONGO_URI";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub inventory: InventorySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay,
    /// `LONGBOX__*` variables and finally `PORT` / `MONGO_URI`.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let mut builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(port) = std::env::var(PORT_ENV) {
            builder = builder
                .set_override("server.port", port)
                .context("invalid PORT override")?;
        }
        if let Ok(uri) = std::env::var(MONGO_URI_ENV) {
            builder = builder
                .set_override("database.uri", uri)
                .context("invalid MONGO_URI override")?;
        }

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        // The selector variable wins over any `environment` key in the files.
        settings.environment = environment.parse()?;
        settings.validate()?;

        Ok(settings)
    }

    /// Reject combinations the service cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.inventory.default_page_size == 0 || self.inventory.max_page_size == 0 {
            return Err(anyhow!("inventory page sizes must be at least 1"));
        }
        if self.inventory.default_page_size > self.inventory.max_page_size {
            return Err(anyhow!(
                "inventory.default_page_size ({}) exceeds inventory.max_page_size ({})",
                self.inventory.default_page_size,
                self.inventory.max_page_size
            ));
        }
        if self.database.collection.trim().is_empty() {
            return Err(anyhow!("database.collection must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        5001
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Which storage implementation backs the repositories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Mongodb,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "DatabaseSettings::default_uri")]
    pub uri: String,
    #[serde(default = "DatabaseSettings::default_name")]
    pub name: String,
    #[serde(default = "DatabaseSettings::default_collection")]
    pub collection: String,
}

impl DatabaseSettings {
    fn default_uri() -> String {
        "mongodb://127.0.0.1:27017".to_string()
    }

    fn default_name() -> String {
        "longbox".to_string()
    }

    fn default_collection() -> String {
        "books".to_string()
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            uri: Self::default_uri(),
            name: Self::default_name(),
            collection: Self::default_collection(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Directive used when `RUST_LOG` is not set.
    #[serde(default = "TelemetrySettings::default_log_filter")]
    pub log_filter: String,
}

impl TelemetrySettings {
    fn default_log_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_filter: Self::default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Paging limits applied to the inventory listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySettings {
    #[serde(default = "InventorySettings::default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "InventorySettings::default_max_page_size")]
    pub max_page_size: u64,
}

impl InventorySettings {
    fn default_page_size() -> u64 {
        10
    }

    fn default_max_page_size() -> u64 {
        100
    }
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            default_page_size: Self::default_page_size(),
            max_page_size: Self::default_max_page_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_database_targets_local_mongodb() {
        let settings = Settings::default();
        assert_eq!(settings.database.backend, StorageBackend::Mongodb);
        assert_eq!(settings.database.uri, "mongodb://127.0.0.1:27017");
        assert_eq!(settings.database.collection, "books");
    }

    #[test]
    fn default_server_port_is_5001() {
        assert_eq!(Settings::default().server.port, 5001);
    }

    #[test]
    fn default_settings_validate() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn default_page_size_above_max_is_rejected() {
        let mut settings = Settings::default();
        settings.inventory.default_page_size = 500;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn environment_parsing_rejects_unknown_values() {
        assert_eq!(
            "staging".parse::<Environment>().unwrap(),
            Environment::Staging
        );
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn storage_backend_deserializes_lowercase() {
        let settings: DatabaseSettings =
            serde_json::from_value(serde_json::json!({ "backend": "memory" })).unwrap();
        assert_eq!(settings.backend, StorageBackend::Memory);
        assert_eq!(settings.name, "longbox");
    }
}
