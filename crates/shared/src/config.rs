//! Application configuration management.
//!
//! Settings are grouped into typed sections. Every recognised key has an
//! explicit default, so an empty configuration is valid.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Store backend selection.
    #[serde(default)]
    pub store: StoreConfig,
    /// Dues defaults.
    #[serde(default)]
    pub dues: DuesSettings,
    /// Member registry behaviour.
    #[serde(default)]
    pub members: MemberSettings,
    /// Year-end closing thresholds.
    #[serde(default)]
    pub closing: ClosingSettings,
}

/// Which store the application talks to. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// Local SQLite file on the desktop.
    #[default]
    Local,
    /// Shared Postgres server.
    Remote,
}

/// Store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Backend variant.
    #[serde(default)]
    pub mode: StoreMode,
    /// Connection URL for the selected backend.
    #[serde(default = "default_store_url")]
    pub url: String,
    /// Queue committed mutations for later replication.
    #[serde(default)]
    pub replicate: bool,
}

fn default_store_url() -> String {
    "sqlite://dernek.db?mode=rwc".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mode: StoreMode::default(),
            url: default_store_url(),
            replicate: false,
        }
    }
}

/// Dues defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct DuesSettings {
    /// Annual dues for members without a custom amount.
    #[serde(default = "default_annual_dues")]
    pub default_annual_dues: Decimal,
    /// Name of the cash account that receives promoted dues income.
    #[serde(default = "default_dues_account_name")]
    pub default_account_name: String,
}

fn default_annual_dues() -> Decimal {
    Decimal::ONE_HUNDRED
}

fn default_dues_account_name() -> String {
    "DERNEK KASA TL".to_string()
}

impl Default for DuesSettings {
    fn default() -> Self {
        Self {
            default_annual_dues: default_annual_dues(),
            default_account_name: default_dues_account_name(),
        }
    }
}

/// What happens to a member's history when the member is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberDeletionMode {
    /// Delete the member together with dues records and payments.
    Cascade,
    /// Keep the history and mark the member as departed.
    #[default]
    SoftDelete,
}

/// Member registry settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MemberSettings {
    /// Deletion behaviour.
    #[serde(default)]
    pub deletion_mode: MemberDeletionMode,
}

/// Year-end closing thresholds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ClosingSettings {
    /// Accrued/physical ratio above which a closure carries a warning.
    #[serde(default = "default_high_accrual_ratio")]
    pub high_accrual_ratio: Decimal,
}

fn default_high_accrual_ratio() -> Decimal {
    Decimal::new(8, 1)
}

impl Default for ClosingSettings {
    fn default() -> Self {
        Self {
            high_accrual_ratio: default_high_accrual_ratio(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("DERNEK").separator("__"))
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Checks cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` describing the first invalid value.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.dues.default_annual_dues <= Decimal::ZERO {
            return Err(config::ConfigError::Message(
                "dues.default_annual_dues must be positive".to_string(),
            ));
        }
        if self.dues.default_account_name.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "dues.default_account_name must not be empty".to_string(),
            ));
        }
        let ratio = self.closing.high_accrual_ratio;
        if ratio <= Decimal::ZERO || ratio > Decimal::ONE {
            return Err(config::ConfigError::Message(
                "closing.high_accrual_ratio must be in (0, 1]".to_string(),
            ));
        }
        if self.store.mode == StoreMode::Remote && self.store.url.starts_with("sqlite:") {
            return Err(config::ConfigError::Message(
                "store.url must point to a server when store.mode is remote".to_string(),
            ));
        }
        Ok(())
    }
}
