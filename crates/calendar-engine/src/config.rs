//! Configuration records and the process-wide configuration.
//!
//! [`DatetimeConfig`] is the fully populated record consumed at startup.
//! [`ConfigOverrides`] holds optional values carried by a single
//! [`Datetime`](crate::Datetime) or passed to a single call.
//!
//! Effective values resolve as: per-call > per-instance > process-wide > default.
//!
//! # Concurrency
//!
//! The process-wide record is read-mostly. [`install`] swaps it under a write
//! lock; readers take an `Arc` snapshot, so a value observed by one operation
//! never changes underneath it.

use std::str::FromStr;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{DatetimeError, Result};

pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_FORMAT: &str = "YYYY-MM-DDTHH:mm:ssZ";

// ── Process-wide record ─────────────────────────────────────────────────────

/// Process-wide configuration.
///
/// Deserializes from camelCase JSON (`firstDayOfWeek`, `defaultFormat`,
/// `parseLocale`); missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatetimeConfig {
    /// Emit debug events for degraded parsing paths.
    pub verbose: bool,
    /// Locale key used for humanized output.
    pub locale: String,
    /// IANA timezone name. Stored and echoed only.
    pub timezone: String,
    /// Fail on malformed textual input instead of degrading.
    pub strict: bool,
    /// First day of week, 0 = Sunday .. 6 = Saturday.
    pub first_day_of_week: u8,
    /// Template used by `format()` when no template is given.
    pub default_format: String,
    /// Locale key for parsing relative strings.
    pub parse_locale: String,
}

impl Default for DatetimeConfig {
    fn default() -> Self {
        Self {
            verbose: true,
            locale: DEFAULT_LOCALE.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            strict: false,
            first_day_of_week: 0,
            default_format: DEFAULT_FORMAT.to_string(),
            parse_locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl DatetimeConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`DatetimeError::InvalidConfig`] for malformed JSON or values
    /// rejected by [`validate`](Self::validate).
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| DatetimeError::InvalidConfig(format!("malformed JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DATETIME_*` environment variables on top of this record.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Values that fail to parse are skipped with a warning.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DATETIME_LOCALE") {
            self.locale = v;
        }
        if let Some(v) = lookup("DATETIME_TIMEZONE") {
            self.timezone = v;
        }
        if let Some(v) = env_flag("DATETIME_STRICT", lookup("DATETIME_STRICT")) {
            self.strict = v;
        }
        if let Some(v) = env_parsed("DATETIME_FIRST_DAY_OF_WEEK", lookup("DATETIME_FIRST_DAY_OF_WEEK"))
        {
            self.first_day_of_week = v;
        }
        if let Some(v) = lookup("DATETIME_DEFAULT_FORMAT") {
            self.default_format = v;
        }
        if let Some(v) = lookup("DATETIME_PARSE_LOCALE") {
            self.parse_locale = v;
        }
        if let Some(v) = env_flag("DATETIME_VERBOSE", lookup("DATETIME_VERBOSE")) {
            self.verbose = v;
        }
        self
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`DatetimeError::InvalidConfig`] if `first_day_of_week` is
    /// outside 0..=6 or `timezone` is not a known IANA name.
    pub fn validate(&self) -> Result<()> {
        if self.first_day_of_week > 6 {
            return Err(DatetimeError::InvalidConfig(format!(
                "firstDayOfWeek must be 0-6, got {}",
                self.first_day_of_week
            )));
        }
        if self.timezone.parse::<Tz>().is_err() {
            return Err(DatetimeError::InvalidConfig(format!(
                "unknown timezone '{}'",
                self.timezone
            )));
        }
        Ok(())
    }
}

fn env_parsed<T: FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

fn env_flag(name: &str, raw: Option<String>) -> Option<bool> {
    let raw = raw?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

static GLOBAL: LazyLock<RwLock<Arc<DatetimeConfig>>> =
    LazyLock::new(|| RwLock::new(Arc::new(DatetimeConfig::default())));

/// Snapshot of the process-wide configuration.
pub fn global() -> Arc<DatetimeConfig> {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Validate and install a new process-wide configuration.
///
/// # Errors
///
/// Returns [`DatetimeError::InvalidConfig`] and leaves the current
/// configuration untouched if validation fails.
pub fn install(config: DatetimeConfig) -> Result<()> {
    config.validate()?;
    if config.verbose {
        tracing::debug!(?config, "Installing process-wide datetime configuration");
    }
    *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
    Ok(())
}

/// Restore the default process-wide configuration.
pub fn reset() {
    *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(DatetimeConfig::default());
}

// ── Overrides ───────────────────────────────────────────────────────────────

/// Optional per-instance or per-call configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub verbose: Option<bool>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub strict: Option<bool>,
    pub first_day_of_week: Option<u8>,
    pub default_format: Option<String>,
    pub parse_locale: Option<String>,
}

impl ConfigOverrides {
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    pub fn with_first_day_of_week(mut self, day: u8) -> Self {
        self.first_day_of_week = Some(day);
        self
    }

    pub fn with_default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = Some(format.into());
        self
    }

    pub fn with_parse_locale(mut self, locale: impl Into<String>) -> Self {
        self.parse_locale = Some(locale.into());
        self
    }
}

/// First value set across the override layers, most specific first.
pub(crate) fn layered<T>(
    layers: &[Option<&ConfigOverrides>],
    pick: impl Fn(&ConfigOverrides) -> Option<T>,
) -> Option<T> {
    layers.iter().flatten().find_map(|o| pick(*o))
}

pub(crate) fn effective_strict(layers: &[Option<&ConfigOverrides>]) -> bool {
    layered(layers, |o| o.strict).unwrap_or_else(|| global().strict)
}

pub(crate) fn effective_verbose(layers: &[Option<&ConfigOverrides>]) -> bool {
    layered(layers, |o| o.verbose).unwrap_or_else(|| global().verbose)
}

// ── Tests ───────────────────────────────────────────────────────────────────
