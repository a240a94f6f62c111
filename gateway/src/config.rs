use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use ledger_core::LedgerLayout;
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub layout: LedgerLayout,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Google Sheets document
    Sheets,
    /// In-process document, lost on restart
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub spreadsheet_id: String,
    /// Service-account JSON key content
    pub service_account_key: Option<String>,
    /// Path to a service-account JSON key file
    pub service_account_key_file: Option<String>,
    /// Fixed bearer token, bypasses the service-account grant
    pub access_token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Create the ledger tab, header and settings defaults at startup
    pub provision_on_start: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is unset
    pub level: String,
    pub json: bool,
}

impl Config {
    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.bind_addr", "0.0.0.0:8080")?
            .set_default("store.backend", "sheets")?
            .set_default("store.spreadsheet_id", "")?
            .set_default("store.base_url", sheets_adapter::DEFAULT_BASE_URL)?
            .set_default(
                "store.timeout_secs",
                sheets_adapter::DEFAULT_REQUEST_TIMEOUT_SECONDS as i64,
            )?
            .set_default("store.provision_on_start", true)?
            .set_default("layout.ledger_tab", ledger_core::config::DEFAULT_LEDGER_TAB)?
            .set_default("layout.settings_tab", ledger_core::config::DEFAULT_SETTINGS_TAB)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)
    }

    /// Built-in defaults only, no file or environment
    pub fn default_config() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut builder = Self::defaults()?;

        // Add environment-specific config file if it exists
        if let Ok(config_file) = env::var("CONFIG_FILE") {
            builder = builder.add_source(File::with_name(&config_file).required(false));
        } else {
            builder = builder.add_source(
                File::with_name(&format!("config/{}", environment)).required(false),
            );
        }

        // Override with environment variables
        builder = builder.add_source(Environment::with_prefix("LEDGER_GATEWAY").separator("__"));

        // Special handling for common env vars
        if let Ok(sheet_id) = env::var("GOOGLE_SHEET_ID") {
            builder = builder.set_override("store.spreadsheet_id", sheet_id)?;
        }

        if let Ok(key) = env::var("GOOGLE_SERVICE_ACCOUNT_KEY") {
            builder = builder.set_override("store.service_account_key", key)?;
        }

        if let Ok(path) = env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            builder = builder.set_override("store.service_account_key_file", path)?;
        }

        if let Ok(addr) = env::var("BIND_ADDR") {
            builder = builder.set_override("server.bind_addr", addr)?;
        }

        if let Ok(tab) = env::var("LEDGER_TAB") {
            builder = builder.set_override("layout.ledger_tab", tab)?;
        }

        if let Ok(tab) = env::var("LEDGER_SETTINGS_TAB") {
            builder = builder.set_override("layout.settings_tab", tab)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(format!("Invalid bind address: {}", self.server.bind_addr));
        }

        self.layout.validate().map_err(|e| e.to_string())?;

        if self.store.backend == StoreBackend::Sheets {
            if self.store.spreadsheet_id.is_empty() {
                return Err("Spreadsheet id is required (GOOGLE_SHEET_ID)".to_string());
            }

            let has_credentials = [
                &self.store.service_account_key,
                &self.store.service_account_key_file,
                &self.store.access_token,
            ]
            .iter()
            .any(|c| c.as_deref().map_or(false, |v| !v.is_empty()));
            if !has_credentials {
                return Err(
                    "Sheets credentials are required (GOOGLE_SERVICE_ACCOUNT_KEY)".to_string(),
                );
            }

            if self.store.timeout_secs == 0 {
                return Err("Store timeout cannot be 0".to_string());
            }
        }

        Ok(())
    }
}
