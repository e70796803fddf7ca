//! # calendar-engine
//!
//! Immutable calendar instants with fluent arithmetic.
//!
//! Every operation on a [`Datetime`] returns a new value: month-aware
//! addition and subtraction, field setters, unit boundaries, token
//! formatting, comparisons, signed differences and human-readable phrases.
//! [`Interval`] carries multi-field durations and [`Period`] walks lazily
//! between two instants. Relative expressions such as `"+3 days"` or
//! `"next month"` resolve against a base instant.
//!
//! Behavior is tuned by a process-wide [`DatetimeConfig`] that individual
//! instants can shadow with a [`ConfigOverrides`] record.
//!
//! ## Modules
//!
//! - [`datetime`]: the instant type, its arithmetic, formatting and comparisons
//! - [`interval`]: signed multi-field durations
//! - [`period`]: lazy, restartable ranges of instants
//! - [`relative`]: `"+N unit"` / `"next unit"` expressions
//! - [`locale`]: humanization phrase rules and the locale registry
//! - [`config`]: process-wide configuration and per-instance overrides
//! - [`error`]: error types

pub mod config;
pub mod datetime;
pub mod error;
mod format;
pub mod interval;
pub mod locale;
pub mod period;
pub mod relative;

pub use config::{ConfigOverrides, DatetimeConfig};
pub use datetime::{Datetime, DatetimeInput};
pub use error::{DatetimeError, Result};
pub use interval::Interval;
pub use locale::{
    current_locale, has_locale, register_locale, set_locale, English, LocaleRegistry, Phrases,
    Unit,
};
pub use period::{Period, PeriodIter};
pub use relative::{from_string, parse_relative, RelativeShift, RelativeUnit};
