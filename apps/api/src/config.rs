//! # API Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RENTLINE_PORT=8080                                                 │
//! │     RENTLINE_DB_PATH=/var/lib/rentline/rentline.db                     │
//! │     STRIPE_SECRET_KEY=sk_live_...                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $RENTLINE_CONFIG, else                                             │
//! │     ~/.config/rentline/rentline.toml (Linux)                           │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 3000
//!
//! [database]
//! path = "./rentline.db"
//! max_connections = 5
//! auto_seed = true
//!
//! [booking]
//! enforce_agencies = false
//! reconcile_interval_secs = 300
//!
//! [payments]
//! stripe_api_base = "https://api.stripe.com"
//!
//! [[pricing.fallback]]
//! car_id = "car1"
//! label = "Clio 5"
//! daily_rate = 35
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use rentline_booking::BookingConfig;
use rentline_core::pricing::RateCard;
use rentline_core::validation::{validate_daily_rate, MAX_DAILY_RATE};
use rentline_core::{FallbackRates, DEFAULT_AGENCIES};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Sections
// =============================================================================

/// `[server]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

/// `[database]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Load the demo fleet on startup when the vehicles table is empty.
    #[serde(default = "default_true")]
    pub auto_seed: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./rentline.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
            auto_seed: true,
        }
    }
}

/// `[booking]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSettings {
    #[serde(default = "default_agencies")]
    pub agencies: Vec<String>,

    #[serde(default)]
    pub enforce_agencies: bool,

    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,
}

fn default_agencies() -> Vec<String> {
    DEFAULT_AGENCIES.iter().map(|a| a.to_string()).collect()
}

fn default_reconcile_interval() -> u64 {
    300
}

impl Default for BookingSettings {
    fn default() -> Self {
        BookingSettings {
            agencies: default_agencies(),
            enforce_agencies: false,
            reconcile_interval_secs: default_reconcile_interval(),
        }
    }
}

/// `[payments]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsSettings {
    /// Without a key, payment intent creation fails with 502.
    #[serde(default)]
    pub stripe_secret_key: Option<String>,

    #[serde(default = "default_stripe_api_base")]
    pub stripe_api_base: String,
}

fn default_stripe_api_base() -> String {
    "https://api.stripe.com".to_string()
}

impl Default for PaymentsSettings {
    fn default() -> Self {
        PaymentsSettings {
            stripe_secret_key: None,
            stripe_api_base: default_stripe_api_base(),
        }
    }
}

/// One `[[pricing.fallback]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackRate {
    pub car_id: String,
    pub label: String,
    pub daily_rate: i64,
}

/// `[pricing]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default = "default_fallback")]
    pub fallback: Vec<FallbackRate>,
}

fn default_fallback() -> Vec<FallbackRate> {
    [
        ("car1", "Clio 5", 35),
        ("car2", "Audi A4", 85),
        ("car3", "Mercedes CLA 220", 120),
        ("car4", "Dacia Logan", 45),
        ("car5", "Peugeot 308", 65),
    ]
    .into_iter()
    .map(|(car_id, label, daily_rate)| FallbackRate {
        car_id: car_id.to_string(),
        label: label.to_string(),
        daily_rate,
    })
    .collect()
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            fallback: default_fallback(),
        }
    }
}

// =============================================================================
// ApiConfig
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub booking: BookingSettings,

    #[serde(default)]
    pub payments: PaymentsSettings,

    #[serde(default)]
    pub pricing: PricingSettings,
}

impl ApiConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (rentline.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var("RENTLINE_CONFIG").ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document. Missing sections take their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be greater than 0".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.booking.reconcile_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "booking.reconcile_interval_secs must be greater than 0".into(),
            ));
        }

        if self.booking.enforce_agencies && self.booking.agencies.is_empty() {
            return Err(ConfigError::Invalid(
                "booking.agencies cannot be empty when enforce_agencies is on".into(),
            ));
        }

        if let Some(rate) = self
            .pricing
            .fallback
            .iter()
            .find(|r| validate_daily_rate(r.daily_rate).is_err())
        {
            return Err(ConfigError::Invalid(format!(
                "pricing.fallback rate for {} must be between 1 and {MAX_DAILY_RATE}",
                rate.car_id
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides, reading through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("RENTLINE_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(value = %port, "Ignoring invalid RENTLINE_PORT"),
            }
        }

        if let Some(addr) = lookup("RENTLINE_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(path) = lookup("RENTLINE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(secs) = lookup("RENTLINE_RECONCILE_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.booking.reconcile_interval_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid RENTLINE_RECONCILE_SECS"),
            }
        }

        if let Some(key) = lookup("STRIPE_SECRET_KEY").filter(|k| !k.is_empty()) {
            self.payments.stripe_secret_key = Some(key);
        }

        if let Some(flag) = lookup("RENTLINE_ENFORCE_AGENCIES") {
            self.booking.enforce_agencies = parse_flag(&flag);
        }

        if let Some(flag) = lookup("RENTLINE_AUTO_SEED") {
            self.database.auto_seed = parse_flag(&flag);
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "rentline", "rentline")
            .map(|dirs| dirs.config_dir().join("rentline.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Address the HTTP server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.bind_addr, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigError::Invalid(format!(
                    "invalid bind address {}:{}",
                    self.server.bind_addr, self.server.port
                ))
            })
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.booking.reconcile_interval_secs)
    }

    /// Booking rules for [`BookingService`](rentline_booking::BookingService).
    pub fn booking_config(&self) -> BookingConfig {
        BookingConfig {
            agencies: self.booking.agencies.clone(),
            enforce_agencies: self.booking.enforce_agencies,
            fallback_rates: FallbackRates::from_cards(
                self.pricing
                    .fallback
                    .iter()
                    .map(|r| RateCard::new(r.car_id.clone(), r.label.clone(), r.daily_rate)),
            ),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
