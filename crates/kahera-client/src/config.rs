//! # Register Configuration
//!
//! Backend location, store header, pricing rules and receipt layout.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KAHERA_API_URL=https://pos.example.ph/api                          │
//! │     KAHERA_API_TOKEN=eyJhbGciOi...                                     │
//! │     KAHERA_VAT_RATE=12  KAHERA_CASH_LIMIT=10000                        │
//! │     KAHERA_STORE_NAME="Sari-Sari ni Aling Nena"                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/kahera-pos/kahera.toml (Linux)                           │
//! │     ~/Library/Application Support/ph.kahera.pos/kahera.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "http://localhost:5000/api"
//! timeout_secs = 30
//!
//! [store]
//! name = "Sari-Sari ni Aling Nena"
//! address = "Brgy. San Isidro, Quezon City"
//! tin = "123-456-789-000"
//! currency_symbol = "₱"
//!
//! [pricing]
//! vat_rate_percent = 12.0
//! senior_discount_percent = 20.0
//! cash_limit = 10000.0
//!
//! [receipt]
//! paper_width = 42
//!
//! # Cashier credited on receipts when the backend omits one
//! [cashier]
//! id = "u-1"
//! name = "Maria"
//! ```

use std::path::{Path, PathBuf};

use kahera_core::receipt::MIN_PAPER_WIDTH;
use kahera_core::validation::validate_percentage;
use kahera_core::{Cashier, DiscountPolicy, Money, Rate, StoreInfo};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::session::Session;

// =============================================================================
// API Settings
// =============================================================================

/// Where the backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL; endpoints are joined onto it (`{base}/products`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Bearer token. Usually supplied through `KAHERA_API_TOKEN` rather
    /// than written to disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            token: None,
        }
    }
}

// =============================================================================
// Store Settings
// =============================================================================

/// Receipt header details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    #[serde(default)]
    pub address: Option<String>,

    /// BIR taxpayer identification number.
    #[serde(default)]
    pub tin: Option<String>,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_store_name() -> String {
    "Kahera POS".to_string()
}

fn default_currency_symbol() -> String {
    "₱".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            address: None,
            tin: None,
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

/// Tax and discount rules. Amounts are in pesos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default = "default_vat_rate")]
    pub vat_rate_percent: f64,

    #[serde(default = "default_senior_discount")]
    pub senior_discount_percent: f64,

    /// Largest single cash tender accepted.
    #[serde(default = "default_cash_limit")]
    pub cash_limit: f64,
}

fn default_vat_rate() -> f64 {
    kahera_core::DEFAULT_VAT_RATE_PERCENT
}

fn default_senior_discount() -> f64 {
    kahera_core::DEFAULT_SENIOR_DISCOUNT_PERCENT
}

fn default_cash_limit() -> f64 {
    Money::from_cents(kahera_core::DEFAULT_CASH_LIMIT_CENTS).to_major_f64()
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            vat_rate_percent: default_vat_rate(),
            senior_discount_percent: default_senior_discount(),
            cash_limit: default_cash_limit(),
        }
    }
}

// =============================================================================
// Receipt Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptSettings {
    /// Characters per line on the receipt printer.
    #[serde(default = "default_paper_width")]
    pub paper_width: usize,
}

fn default_paper_width() -> usize {
    42
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        ReceiptSettings {
            paper_width: default_paper_width(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete register configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PosConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub receipt: ReceiptSettings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashier: Option<Cashier>,
}

impl PosConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`kahera.toml`), if it exists
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                config = Self::read_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads configuration from an explicit file without consulting the
    /// environment. The file must exist.
    pub fn load_from_path(path: &Path) -> ClientResult<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> ClientResult<Self> {
        info!(?path, "Loading register config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to `path`, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> ClientResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Register config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        validate_percentage("vat_rate_percent", self.pricing.vat_rate_percent)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        validate_percentage("senior_discount_percent", self.pricing.senior_discount_percent)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        if !self.pricing.cash_limit.is_finite() || self.pricing.cash_limit <= 0.0 {
            return Err(ClientError::InvalidConfig(
                "cash_limit must be a positive amount".into(),
            ));
        }

        if self.receipt.paper_width < MIN_PAPER_WIDTH {
            return Err(ClientError::InvalidConfig(format!(
                "paper_width must be at least {}",
                MIN_PAPER_WIDTH
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("KAHERA_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(token) = lookup("KAHERA_API_TOKEN") {
            self.api.token = Some(token);
        }

        if let Some(rate) = lookup("KAHERA_VAT_RATE") {
            match rate.parse::<f64>() {
                Ok(r) => self.pricing.vat_rate_percent = r,
                Err(_) => warn!(rate = %rate, "Ignoring unparseable KAHERA_VAT_RATE"),
            }
        }

        if let Some(limit) = lookup("KAHERA_CASH_LIMIT") {
            match limit.parse::<f64>() {
                Ok(l) => self.pricing.cash_limit = l,
                Err(_) => warn!(limit = %limit, "Ignoring unparseable KAHERA_CASH_LIMIT"),
            }
        }

        if let Some(name) = lookup("KAHERA_STORE_NAME") {
            self.store.name = name;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("ph", "kahera", "kahera-pos")
            .map(|dirs| dirs.config_dir().join("kahera.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn vat_rate(&self) -> Rate {
        Rate::from_percentage(self.pricing.vat_rate_percent)
    }

    pub fn discount_policy(&self) -> ClientResult<DiscountPolicy> {
        DiscountPolicy::from_percentages(
            self.pricing.senior_discount_percent,
            self.pricing.vat_rate_percent,
        )
        .map_err(|e| ClientError::InvalidConfig(e.to_string()))
    }

    pub fn cash_limit(&self) -> Money {
        Money::from_major_f64(self.pricing.cash_limit)
    }

    pub fn store_info(&self) -> StoreInfo {
        StoreInfo {
            name: self.store.name.clone(),
            address: self.store.address.clone(),
            tin: self.store.tin.clone(),
            currency_symbol: self.store.currency_symbol.clone(),
        }
    }

    /// Session carrying the configured bearer token and cashier.
    pub fn session(&self) -> Session {
        let session = Session::new(self.api.token.clone());
        match &self.cashier {
            Some(cashier) => session.with_cashier(cashier.clone()),
            None => session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = PosConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.vat_rate().bps(), 1200);
        assert_eq!(config.cash_limit(), Money::from_cents(1_000_000));
        assert_eq!(config.discount_policy().unwrap(), DiscountPolicy::default());
        assert_eq!(config.receipt.paper_width, 42);
    }

    #[test]
    fn test_config_validation() {
        let mut config = PosConfig::default();

        config.api.base_url = "ftp://example.com".into();
        assert!(config.validate().is_err());

        config.api.base_url = "not a url".into();
        assert!(config.validate().is_err());

        config.api.base_url = "https://pos.example.ph/api".into();
        assert!(config.validate().is_ok());

        config.pricing.vat_rate_percent = 112.0;
        assert!(config.validate().is_err());
        config.pricing.vat_rate_percent = 12.0;

        config.pricing.cash_limit = 0.0;
        assert!(config.validate().is_err());
        config.pricing.cash_limit = 10000.0;

        config.receipt.paper_width = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("KAHERA_API_URL", "https://pos.example.ph/api"),
            ("KAHERA_API_TOKEN", "secret"),
            ("KAHERA_VAT_RATE", "10"),
            ("KAHERA_CASH_LIMIT", "not-a-number"),
            ("KAHERA_STORE_NAME", "Tindahan"),
        ]
        .into_iter()
        .collect();

        let mut config = PosConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://pos.example.ph/api");
        assert_eq!(config.session().token(), Some("secret"));
        assert_eq!(config.vat_rate().bps(), 1000);
        assert_eq!(config.pricing.cash_limit, 10000.0);
        assert_eq!(config.store_info().name, "Tindahan");
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("kahera.toml");

        let mut config = PosConfig::default();
        config.store.name = "Sari-Sari ni Aling Nena".into();
        config.store.tin = Some("123-456-789-000".into());
        config.receipt.paper_width = 32;
        config.save_to_path(&path).unwrap();

        let loaded = PosConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.store.name, "Sari-Sari ni Aling Nena");
        assert_eq!(loaded.store.tin.as_deref(), Some("123-456-789-000"));
        assert_eq!(loaded.receipt.paper_width, 32);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[pricing]"));
        assert!(!text.contains("token"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kahera.toml");
        std::fs::write(&path, "[store]\nname = \"Tindahan\"\n").unwrap();

        let config = PosConfig::load_from_path(&path).unwrap();
        assert_eq!(config.store.name, "Tindahan");
        assert_eq!(config.pricing.vat_rate_percent, 12.0);
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_cashier_section_reaches_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kahera.toml");
        std::fs::write(&path, "[cashier]\nid = \"u-7\"\nname = \"Nena\"\n").unwrap();

        let config = PosConfig::load_from_path(&path).unwrap();
        let session = config.session();
        assert_eq!(session.cashier().map(|c| c.name.as_str()), Some("Nena"));
        assert_eq!(session.token(), None);

        assert!(PosConfig::default().session().cashier().is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PosConfig::load_from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.is_config_error());
    }
}
