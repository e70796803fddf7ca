//! Pluggable phrase tables for humanized output.
//!
//! A locale is anything implementing [`Phrases`]. Locales live in a
//! process-wide registry keyed by a short string (`"en"`); lookups of an
//! unknown key fall back to English rather than failing. Only an explicit
//! switch via [`set_locale`] or [`Datetime::with_locale`](crate::Datetime::with_locale)
//! rejects an unregistered key.
//!
//! Rendering calls also accept a `&dyn Phrases` directly, so callers that
//! carry their own locale never touch the registry.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::{self, DEFAULT_LOCALE};
use crate::error::{DatetimeError, Result};

// ── Units ───────────────────────────────────────────────────────────────────

/// Calendar units, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    #[serde(rename = "ms")]
    Millisecond,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Year => "year",
            Unit::Month => "month",
            Unit::Day => "day",
            Unit::Hour => "hour",
            Unit::Minute => "minute",
            Unit::Second => "second",
            Unit::Millisecond => "ms",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = DatetimeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" | "years" => Ok(Unit::Year),
            "month" | "months" => Ok(Unit::Month),
            "day" | "days" => Ok(Unit::Day),
            "hour" | "hours" => Ok(Unit::Hour),
            "minute" | "minutes" | "min" => Ok(Unit::Minute),
            "second" | "seconds" | "sec" => Ok(Unit::Second),
            "ms" | "millisecond" | "milliseconds" => Ok(Unit::Millisecond),
            _ => Err(DatetimeError::InvalidInput(format!("unknown unit '{s}'"))),
        }
    }
}

// ── Phrase rules ────────────────────────────────────────────────────────────

/// Phrase-rendering rules for one locale.
pub trait Phrases: Send + Sync {
    /// Rendered when a difference truncates to zero in every unit.
    fn just_now(&self) -> String;

    /// Unit name, pluralized for `count`.
    fn unit_name(&self, unit: Unit, count: i64) -> String;

    /// A past difference, e.g. "2 days ago".
    fn ago(&self, count: i64, unit: Unit) -> String;

    /// A future difference, e.g. "in 2 days".
    fn from_now(&self, count: i64, unit: Unit) -> String;

    /// Join rendered interval parts; `parts` is empty for a zero interval.
    fn join_interval(&self, parts: Vec<String>) -> String;
}

/// Built-in English rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct English;

impl Phrases for English {
    fn just_now(&self) -> String {
        "just now".to_string()
    }

    fn unit_name(&self, unit: Unit, count: i64) -> String {
        match unit {
            Unit::Millisecond => "ms".to_string(),
            _ if count.abs() == 1 => unit.as_str().to_string(),
            _ => format!("{}s", unit.as_str()),
        }
    }

    fn ago(&self, count: i64, unit: Unit) -> String {
        format!("{count} {} ago", self.unit_name(unit, count))
    }

    fn from_now(&self, count: i64, unit: Unit) -> String {
        format!("in {count} {}", self.unit_name(unit, count))
    }

    fn join_interval(&self, parts: Vec<String>) -> String {
        if parts.is_empty() {
            "0 seconds".to_string()
        } else {
            parts.join(" ")
        }
    }
}

// ── Registry ────────────────────────────────────────────────────────────────

/// Mapping from locale key to phrase rules.
#[derive(Clone)]
pub struct LocaleRegistry {
    locales: HashMap<String, Arc<dyn Phrases>>,
}

impl Default for LocaleRegistry {
    fn default() -> Self {
        let mut locales: HashMap<String, Arc<dyn Phrases>> = HashMap::new();
        locales.insert(DEFAULT_LOCALE.to_string(), Arc::new(English));
        Self { locales }
    }
}

impl fmt::Debug for LocaleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.locales.keys().collect();
        keys.sort();
        f.debug_struct("LocaleRegistry").field("locales", &keys).finish()
    }
}

impl LocaleRegistry {
    pub fn register(&mut self, key: impl Into<String>, phrases: Arc<dyn Phrases>) {
        self.locales.insert(key.into(), phrases);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.locales.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Phrases>> {
        self.locales.get(key).cloned()
    }

    /// Rules for `key`, or English when `key` is not registered. The
    /// fallback is logged when `verbose` is set.
    pub fn resolve(&self, key: &str, verbose: bool) -> Arc<dyn Phrases> {
        self.get(key).unwrap_or_else(|| {
            if verbose {
                tracing::debug!(locale = key, "Unknown locale, falling back to en");
            }
            self.get(DEFAULT_LOCALE)
                .unwrap_or_else(|| Arc::new(English) as Arc<dyn Phrases>)
        })
    }
}

static REGISTRY: LazyLock<RwLock<LocaleRegistry>> =
    LazyLock::new(|| RwLock::new(LocaleRegistry::default()));

static CURRENT: RwLock<Option<String>> = RwLock::new(None);

/// Add or replace a locale in the process-wide registry.
pub fn register_locale(key: impl Into<String>, phrases: Arc<dyn Phrases>) {
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(key, phrases);
}

pub fn has_locale(key: &str) -> bool {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains(key)
}

/// Rules for `key`, falling back to English.
pub fn phrases_for(key: &str) -> Arc<dyn Phrases> {
    resolve_phrases(key, config::effective_verbose(&[]))
}

/// [`phrases_for`] with the caller's effective verbose flag.
pub(crate) fn resolve_phrases(key: &str, verbose: bool) -> Arc<dyn Phrases> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .resolve(key, verbose)
}

/// Switch the process-wide current locale.
///
/// Writers are serialized by a lock, but the key is process-global: a switch
/// made by one thread is observed by every other thread's next read.
///
/// # Errors
///
/// Returns [`DatetimeError::LocaleNotFound`] if `key` is not registered.
pub fn set_locale(key: &str) -> Result<()> {
    if !has_locale(key) {
        return Err(DatetimeError::LocaleNotFound(key.to_string()));
    }
    *CURRENT.write().unwrap_or_else(PoisonError::into_inner) = Some(key.to_string());
    Ok(())
}

/// The process-wide current locale key.
///
/// An explicitly set key wins, then the process configuration's `locale`.
pub fn current_locale() -> String {
    CURRENT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(|| config::global().locale.clone())
}

/// Forget any key set with [`set_locale`].
pub fn clear_locale() {
    *CURRENT.write().unwrap_or_else(PoisonError::into_inner) = None;
}

// ── Tests ───────────────────────────────────────────────────────────────────
