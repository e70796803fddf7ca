//! Relative date expressions.
//!
//! Two forms are understood, case-insensitively and after trimming:
//!
//! - a signed count and a unit: `"+3 days"`, `"-2 months"`, `"10ms"`,
//!   `"5 mins"`
//! - a direction and a unit: `"next month"`, `"last week"`
//!
//! Units are `year`, `month`, `week`, `day`, `hour`, `minute`/`min`,
//! `second`/`sec` and `ms`. The signed form accepts a trailing plural `s`;
//! the directional form accepts neither plurals nor `ms`. A week is seven
//! days.

use crate::config::{self, ConfigOverrides};
use crate::datetime::Datetime;
use crate::error::{DatetimeError, Result};

// ── Grammar ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl RelativeUnit {
    /// Singular keyword lookup. `ms` is only accepted when `allow_ms` is set.
    fn from_keyword(word: &str, allow_ms: bool) -> Option<Self> {
        match word {
            "year" => Some(Self::Year),
            "month" => Some(Self::Month),
            "week" => Some(Self::Week),
            "day" => Some(Self::Day),
            "hour" => Some(Self::Hour),
            "minute" | "min" => Some(Self::Minute),
            "second" | "sec" => Some(Self::Second),
            "ms" if allow_ms => Some(Self::Millisecond),
            _ => None,
        }
    }
}

/// A parsed relative expression: move `amount` units from a base instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelativeShift {
    pub amount: i64,
    pub unit: RelativeUnit,
}

impl RelativeShift {
    /// Parse `expr` against the relative grammar.
    ///
    /// Returns `None` for anything outside it, including counts that do not
    /// fit in an `i64`.
    pub fn parse(expr: &str) -> Option<Self> {
        let normalized = expr.trim().to_lowercase();
        parse_signed(&normalized).or_else(|| parse_directional(&normalized))
    }

    /// Move `base` by this shift. Negative amounts subtract.
    pub fn apply(&self, base: &Datetime) -> Datetime {
        let abs = self.amount.saturating_abs();
        match (self.unit, self.amount < 0) {
            (RelativeUnit::Year, false) => base.add_years(abs),
            (RelativeUnit::Year, true) => base.sub_years(abs),
            (RelativeUnit::Month, false) => base.add_months(abs),
            (RelativeUnit::Month, true) => base.sub_months(abs),
            (RelativeUnit::Week, false) => base.add_days(abs.saturating_mul(7)),
            (RelativeUnit::Week, true) => base.sub_days(abs.saturating_mul(7)),
            (RelativeUnit::Day, false) => base.add_days(abs),
            (RelativeUnit::Day, true) => base.sub_days(abs),
            (RelativeUnit::Hour, false) => base.add_hours(abs),
            (RelativeUnit::Hour, true) => base.sub_hours(abs),
            (RelativeUnit::Minute, false) => base.add_minutes(abs),
            (RelativeUnit::Minute, true) => base.sub_minutes(abs),
            (RelativeUnit::Second, false) => base.add_seconds(abs),
            (RelativeUnit::Second, true) => base.sub_seconds(abs),
            (RelativeUnit::Millisecond, false) => base.add_milliseconds(abs),
            (RelativeUnit::Millisecond, true) => base.sub_milliseconds(abs),
        }
    }
}

/// `[+-]digits [whitespace] unit[s]`
fn parse_signed(s: &str) -> Option<RelativeShift> {
    let (negative, body) = match s.as_bytes().first()? {
        b'+' => (false, &s[1..]),
        b'-' => (true, &s[1..]),
        _ => (false, s),
    };

    let digits_end = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    if digits_end == 0 {
        return None;
    }
    let (digits, rest) = body.split_at(digits_end);
    let word = rest.trim_start();
    if word.is_empty() || word.contains(char::is_whitespace) {
        return None;
    }

    let unit = RelativeUnit::from_keyword(word, true).or_else(|| {
        word.strip_suffix('s')
            .and_then(|singular| RelativeUnit::from_keyword(singular, true))
    })?;

    let magnitude: i64 = if negative {
        format!("-{digits}").parse().ok()?
    } else {
        digits.parse().ok()?
    };
    Some(RelativeShift {
        amount: magnitude,
        unit,
    })
}

/// `next|last <whitespace> unit`
fn parse_directional(s: &str) -> Option<RelativeShift> {
    let mut words = s.split_whitespace();
    let direction = words.next()?;
    let word = words.next()?;
    if words.next().is_some() {
        return None;
    }
    let amount = match direction {
        "next" => 1,
        "last" => -1,
        _ => return None,
    };
    let unit = RelativeUnit::from_keyword(word, false)?;
    Some(RelativeShift { amount, unit })
}

// ── Resolution ──────────────────────────────────────────────────────────────

impl Datetime {
    /// Resolve a relative expression against `base` (now when `None`).
    ///
    /// Call overrides replace the base's own record on the anchor. When the
    /// expression is outside the grammar, the effective strict flag (call
    /// overrides, then the base's overrides, then the process-wide
    /// configuration) decides between failing and a lenient direct parse of
    /// the same text.
    ///
    /// # Errors
    ///
    /// Returns [`DatetimeError::AmbiguousRelativeString`] with the original
    /// text when strict and the grammar does not match.
    pub fn parse_relative(
        expr: &str,
        base: Option<&Datetime>,
        overrides: Option<ConfigOverrides>,
    ) -> Result<Datetime> {
        let layers = [overrides.as_ref(), base.and_then(Datetime::overrides)];
        let strict = config::effective_strict(&layers);
        let verbose = config::effective_verbose(&layers);

        if let Some(shift) = RelativeShift::parse(expr) {
            let anchor = anchor(base, overrides);
            if verbose {
                tracing::debug!(input = %expr, ?shift, "Resolved relative expression");
            }
            return Ok(shift.apply(&anchor));
        }

        if strict {
            return Err(DatetimeError::AmbiguousRelativeString(expr.to_string()));
        }
        if verbose {
            tracing::debug!(input = %expr, "Not a relative expression, parsing directly");
        }
        Ok(Datetime::lenient(expr, overrides))
    }

    /// Parse either a relative expression or an absolute date string.
    ///
    /// The relative grammar is tried first, against now. Under strict
    /// configuration an absolute string is still accepted if it parses.
    ///
    /// # Errors
    ///
    /// Returns [`DatetimeError::InvalidDateString`] with the original text
    /// when strict and `expr` is neither relative nor a parseable date.
    pub fn from_string(expr: &str, overrides: Option<ConfigOverrides>) -> Result<Datetime> {
        if !config::effective_strict(&[overrides.as_ref()]) {
            return Self::parse_relative(expr, None, overrides);
        }
        if let Some(shift) = RelativeShift::parse(expr) {
            return Ok(shift.apply(&anchor(None, overrides)));
        }
        Datetime::new(expr, overrides)
            .map_err(|_| DatetimeError::InvalidDateString(expr.to_string()))
    }
}

fn anchor(base: Option<&Datetime>, overrides: Option<ConfigOverrides>) -> Datetime {
    let start = base.cloned().unwrap_or_else(Datetime::now);
    match overrides {
        Some(o) => start.with_overrides(o),
        None => start,
    }
}

/// [`Datetime::parse_relative`] against now.
pub fn parse_relative(expr: &str, overrides: Option<ConfigOverrides>) -> Result<Datetime> {
    Datetime::parse_relative(expr, None, overrides)
}

/// [`Datetime::from_string`] with optional overrides, accepting anything
/// convertible to text.
pub fn from_string(expr: impl AsRef<str>, overrides: Option<ConfigOverrides>) -> Result<Datetime> {
    Datetime::from_string(expr.as_ref(), overrides)
}

// ── Tests ───────────────────────────────────────────────────────────────────
