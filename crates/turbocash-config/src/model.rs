use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ConfigError;

/// Directory under the home folder used when nothing else is configured.
pub const DEFAULT_DATA_DIR: &str = ".turbocash";

/// Periods accepted for `default_budget_period`.
pub const BUDGET_PERIODS: [&str; 3] = ["weekly", "monthly", "yearly"];

const MAX_RENEWAL_WARNING_DAYS: u32 = 365;

/// Stores user-configurable preferences. Missing or unknown fields fall back
/// to their defaults when read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency: String,
    pub ui_color_enabled: bool,
    pub default_budget_period: String,
    /// Subscriptions renewing within this many days are flagged in reports.
    pub renewal_warning_days: u32,
    /// Number of document backups kept per user.
    pub backup_retention: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom root for user documents and backups. Defaults to `~/.turbocash`.
    pub data_root: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_user: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "INR".into(),
            ui_color_enabled: true,
            default_budget_period: "monthly".into(),
            renewal_warning_days: 7,
            backup_retention: 5,
            data_root: None,
            last_user: None,
        }
    }
}

impl Config {
    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DATA_DIR)
    }

    /// Rejects values the rest of the application cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(invalid("currency", "expected a three letter ISO code"));
        }
        if !BUDGET_PERIODS.contains(&self.default_budget_period.as_str()) {
            return Err(invalid(
                "default_budget_period",
                format!("expected one of {}", BUDGET_PERIODS.join(", ")),
            ));
        }
        if self.renewal_warning_days > MAX_RENEWAL_WARNING_DAYS {
            return Err(invalid(
                "renewal_warning_days",
                format!("at most {MAX_RENEWAL_WARNING_DAYS}"),
            ));
        }
        if self.backup_retention == 0 {
            return Err(invalid("backup_retention", "keep at least one backup"));
        }
        Ok(())
    }

    /// Sets one field from its textual form, e.g. `("renewal_warning_days", "14")`.
    ///
    /// An empty value clears the optional fields. A rejected value leaves the
    /// configuration unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut next = self.clone();
        next.apply(key, value.trim())?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "currency" => self.currency = value.to_ascii_uppercase(),
            "ui_color_enabled" => self.ui_color_enabled = parse_flag(value)?,
            "default_budget_period" => self.default_budget_period = value.to_ascii_lowercase(),
            "renewal_warning_days" => {
                self.renewal_warning_days = value
                    .parse()
                    .map_err(|_| invalid("renewal_warning_days", "expected a whole number of days"))?
            }
            "backup_retention" => {
                self.backup_retention = value
                    .parse()
                    .map_err(|_| invalid("backup_retention", "expected a whole number"))?
            }
            "data_root" => self.data_root = (!value.is_empty()).then(|| PathBuf::from(value)),
            "last_user" => self.last_user = (!value.is_empty()).then(|| value.to_string()),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(invalid("ui_color_enabled", "expected true or false")),
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        reason: reason.into(),
    }
}
