//! # Storefront Configuration
//!
//! Server settings, currency display and the pricing catalog.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_BIND_ADDR=127.0.0.1                                     │
//! │     STOREFRONT_PORT=9000                                               │
//! │     STOREFRONT_DEFAULT_TAX_RATE=10.5   (percent)                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or STOREFRONT_CONFIG=<path>, or                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.storefront.storefront/ (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     0.0.0.0:8080, euro/es-ES display, seeded pricing catalog          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [server]
//! bind_addr = "127.0.0.1"
//! port = 8080
//!
//! [currency]
//! code = "USD"
//! symbol = "$"
//! decimal_separator = "."
//! group_separator = ","
//! symbol_position = "before"
//!
//! [catalog.tax]
//! default_rate = 1000
//!
//! [catalog.tax.rates]
//! ES = 2100
//! US = 725
//! ```
//!
//! Any section left out keeps its built-in default. A `[catalog]` section
//! replaces only the tables it names.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use storefront_core::{CoreError, CurrencyFormat, PricingCatalog, TaxRate};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "STOREFRONT_CONFIG";

// =============================================================================
// Errors
// =============================================================================

/// Configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid pricing catalog: {0}")]
    Catalog(#[from] CoreError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Server Settings
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address (default: 0.0.0.0 for all interfaces).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub server: ServerSettings,

    /// How money is rendered in display strings.
    #[serde(default)]
    pub currency: CurrencyFormat,

    /// Coupons, shipping zones and tax rates.
    #[serde(default)]
    pub catalog: PricingCatalog,
}

impl StorefrontConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, then `STOREFRONT_CONFIG`, then the
    ///    platform config dir)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.bind_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_addr must not be empty".into()));
        }

        if self.currency.code.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "currency code must not be empty".into(),
            ));
        }

        self.catalog.validate()?;
        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("STOREFRONT_BIND_ADDR") {
            debug!(bind_addr = %addr, "Overriding bind address from environment");
            self.server.bind_addr = addr;
        }

        if let Ok(port) = std::env::var("STOREFRONT_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(port = %port, "Ignoring invalid STOREFRONT_PORT"),
            }
        }

        if let Ok(rate) = std::env::var("STOREFRONT_DEFAULT_TAX_RATE") {
            match rate.parse::<f64>() {
                Ok(pct) => {
                    let rate = TaxRate::from_percentage(pct);
                    debug!(bps = rate.bps(), "Overriding default tax rate from environment");
                    self.catalog.tax.default_rate = rate;
                }
                Err(_) => warn!(rate = %rate, "Ignoring invalid STOREFRONT_DEFAULT_TAX_RATE"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        self.server.bind_address()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::Destination;

    #[test]
    fn test_default_config() {
        let config = StorefrontConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.currency.code, "EUR");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_str = r#"
            [server]
            port = 9000

            [catalog.tax]
            default_rate = 500

            [catalog.tax.rates]
            ES = 2100
        "#;

        let config: StorefrontConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "0.0.0.0");

        // Coupons and shipping fall back to the seeded catalog
        assert!(config.catalog.coupon("DESCUENTO10").is_some());
        assert!(!config.catalog.shipping.zones.is_empty());

        let fr = Destination::country("FR");
        assert_eq!(config.catalog.tax.rate_for(&fr).unwrap().bps(), 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_currency_section() {
        let toml_str = r#"
            [currency]
            code = "USD"
            symbol = "$"
            decimal_separator = "."
            group_separator = ","
            symbol_position = "before"
        "#;

        let config: StorefrontConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.currency, CurrencyFormat::usd());
    }

    #[test]
    fn test_validation_rejects_empty_bind_addr() {
        let mut config = StorefrontConfig::default();
        config.server.bind_addr = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validation_rejects_bad_catalog() {
        let mut config = StorefrontConfig::default();
        config.catalog.tax.default_rate = TaxRate::from_bps(20_000);
        assert!(matches!(config.validate(), Err(ConfigError::Catalog(_))));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("storefront-missing-config-test.toml");
        let config = StorefrontConfig::load_or_default(Some(path));
        assert_eq!(config.server.port, StorefrontConfig::default().server.port);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "storefront-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[server]\nbind_addr = \"127.0.0.1\"\n").unwrap();

        let config = StorefrontConfig::load(Some(path.clone())).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let path = std::env::temp_dir().join(format!(
            "storefront-config-bad-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[server\nport = ").unwrap();

        let result = StorefrontConfig::load(Some(path.clone()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_toml_serialization() {
        let config = StorefrontConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[currency]"));
    }
}
