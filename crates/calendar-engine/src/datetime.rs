//! Immutable calendar instants.
//!
//! A [`Datetime`] is a wall-clock value at millisecond resolution plus an
//! optional per-instance [`ConfigOverrides`] record. No timezone conversion
//! is ever applied: the wall clock is read as UTC, and the configured
//! timezone is only stored and echoed.
//!
//! # Invalid instants
//!
//! Non-strict construction from unparseable text succeeds with an *invalid*
//! instant instead of failing. Every projection of an invalid instant
//! returns `None`, arithmetic on it yields another invalid instant,
//! comparisons involving it are `false`, and [`Datetime::format`] renders
//! `"Invalid Date"`. Arithmetic that leaves chrono's supported range also
//! produces an invalid instant.
//!
//! # Month and year arithmetic
//!
//! Shifting by months or years clamps the day of month to the last valid day
//! of the target month, so Jan 31 + 1 month is Feb 29 in a leap year and
//! Feb 28 otherwise, never a March rollover. Smaller units carry normally.

use std::fmt;
use std::sync::Arc;

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, SubsecRound, TimeDelta, Timelike, Utc,
};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::config::{self, ConfigOverrides};
use crate::error::{DatetimeError, Result};
use crate::format;
use crate::interval::{
    Interval, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_MONTH_APPROX, MS_PER_SECOND,
    MS_PER_YEAR_APPROX,
};
use crate::locale::{self, Phrases, Unit};
use crate::period::Period;

const INVALID_DATE: &str = "Invalid Date";

/// Thresholds for [`Datetime::diff_for_humans`], largest first.
const HUMAN_STEPS: [(Unit, i64); 6] = [
    (Unit::Year, MS_PER_YEAR_APPROX),
    (Unit::Month, MS_PER_MONTH_APPROX),
    (Unit::Day, MS_PER_DAY),
    (Unit::Hour, MS_PER_HOUR),
    (Unit::Minute, MS_PER_MINUTE),
    (Unit::Second, MS_PER_SECOND),
];

// ── Construction input ──────────────────────────────────────────────────────

/// Everything a [`Datetime`] can be built from.
#[derive(Debug, Clone)]
pub enum DatetimeInput {
    /// The current wall-clock time.
    Now,
    /// Copy of another instant's timestamp.
    Datetime(Datetime),
    /// A native chrono value, taken as UTC wall-clock.
    Naive(NaiveDateTime),
    Utc(DateTime<Utc>),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    /// Text to parse as a calendar string.
    Text(String),
}

impl From<Datetime> for DatetimeInput {
    fn from(d: Datetime) -> Self {
        DatetimeInput::Datetime(d)
    }
}

impl From<&Datetime> for DatetimeInput {
    fn from(d: &Datetime) -> Self {
        DatetimeInput::Datetime(d.clone())
    }
}

impl From<NaiveDateTime> for DatetimeInput {
    fn from(n: NaiveDateTime) -> Self {
        DatetimeInput::Naive(n)
    }
}

impl From<DateTime<Utc>> for DatetimeInput {
    fn from(d: DateTime<Utc>) -> Self {
        DatetimeInput::Utc(d)
    }
}

impl From<i64> for DatetimeInput {
    fn from(ms: i64) -> Self {
        DatetimeInput::Timestamp(ms)
    }
}

impl From<&str> for DatetimeInput {
    fn from(s: &str) -> Self {
        DatetimeInput::Text(s.to_string())
    }
}

impl From<String> for DatetimeInput {
    fn from(s: String) -> Self {
        DatetimeInput::Text(s)
    }
}

impl<T: Into<DatetimeInput>> From<Option<T>> for DatetimeInput {
    fn from(input: Option<T>) -> Self {
        input.map_or(DatetimeInput::Now, Into::into)
    }
}

impl DatetimeInput {
    /// The wall-clock value, with text parsed leniently.
    fn resolve(self) -> Option<NaiveDateTime> {
        match self {
            DatetimeInput::Now => Some(Utc::now().naive_utc()),
            DatetimeInput::Datetime(d) => d.moment,
            DatetimeInput::Naive(n) => Some(n),
            DatetimeInput::Utc(d) => Some(d.naive_utc()),
            DatetimeInput::Timestamp(ms) => from_epoch_millis(ms),
            DatetimeInput::Text(text) => parse_text(&text),
        }
    }
}

// ── Datetime ────────────────────────────────────────────────────────────────

/// An immutable calendar instant at millisecond resolution.
///
/// Sub-millisecond precision in any input is truncated on construction, so
/// two instants with the same [`timestamp`](Self::timestamp) always compare
/// as the same.
///
/// Every manipulation returns a new value. Day, hour, minute and second
/// arithmetic and month/year arithmetic carry the override record forward;
/// millisecond arithmetic, the `set_*` family and `start_of`/`end_of` do not.
#[derive(Debug, Clone)]
pub struct Datetime {
    moment: Option<NaiveDateTime>,
    overrides: Option<Arc<ConfigOverrides>>,
}

impl Datetime {
    /// Build an instant from any supported input.
    ///
    /// # Errors
    ///
    /// Returns [`DatetimeError::InvalidDateString`] when text fails to parse
    /// and the effective strict flag (`overrides`, then the process-wide
    /// configuration) is set.
    pub fn new(input: impl Into<DatetimeInput>, overrides: Option<ConfigOverrides>) -> Result<Self> {
        match input.into() {
            DatetimeInput::Text(text) if config::effective_strict(&[overrides.as_ref()]) => {
                let moment = parse_text(&text).ok_or(DatetimeError::InvalidDateString(text))?;
                Ok(Self::from_parts(Some(moment), overrides))
            }
            DatetimeInput::Text(text) => Ok(Self::lenient(&text, overrides)),
            other => Ok(Self::from_parts(other.resolve(), overrides)),
        }
    }

    /// Parse `text`, degrading to an invalid instant instead of failing.
    pub(crate) fn lenient(text: &str, overrides: Option<ConfigOverrides>) -> Self {
        let moment = parse_text(text);
        if moment.is_none() && config::effective_verbose(&[overrides.as_ref()]) {
            tracing::debug!(input = %text, "Unparseable date string, constructing invalid instant");
        }
        Self::from_parts(moment, overrides)
    }

    pub(crate) fn from_parts(moment: Option<NaiveDateTime>, overrides: Option<ConfigOverrides>) -> Self {
        Self {
            moment: moment.map(whole_millis),
            overrides: overrides.map(Arc::new),
        }
    }

    /// Build an instant from a dynamically typed value.
    ///
    /// `null` is now, numbers are epoch milliseconds (fractions truncated),
    /// strings are parsed.
    ///
    /// # Errors
    ///
    /// Returns [`DatetimeError::InvalidInput`] for booleans, arrays and
    /// objects, and the errors of [`Datetime::new`] for strings.
    pub fn from_value(value: &Value, overrides: Option<ConfigOverrides>) -> Result<Self> {
        let input = match value {
            Value::Null => DatetimeInput::Now,
            Value::Number(n) => match n.as_i64() {
                Some(ms) => DatetimeInput::Timestamp(ms),
                None => {
                    let ms = n.as_f64().unwrap_or(f64::NAN).trunc();
                    if ms.is_finite() && ms.abs() < i64::MAX as f64 {
                        DatetimeInput::Timestamp(ms as i64)
                    } else {
                        return Ok(Self::from_parts(None, overrides));
                    }
                }
            },
            Value::String(s) => DatetimeInput::Text(s.clone()),
            other => {
                return Err(DatetimeError::InvalidInput(format!(
                    "unsupported {} value",
                    json_kind(other)
                )))
            }
        };
        Self::new(input, overrides)
    }

    /// Parse text with no overrides.
    ///
    /// # Errors
    ///
    /// Fails only when the process-wide configuration is strict and `text`
    /// does not parse.
    pub fn parse(text: &str) -> Result<Self> {
        Self::new(text, None)
    }

    pub fn now() -> Self {
        Self::bare(Some(Utc::now().naive_utc()))
    }

    /// Midnight of the current day.
    pub fn today() -> Self {
        Self::bare(Utc::now().date_naive().and_hms_opt(0, 0, 0))
    }

    pub fn tomorrow() -> Self {
        Self::today().add_days(1)
    }

    pub fn yesterday() -> Self {
        Self::today().sub_days(1)
    }

    pub fn from_timestamp(ms: i64) -> Self {
        Self::bare(from_epoch_millis(ms))
    }

    /// Attach an override record, replacing any existing one.
    pub fn with_overrides(&self, overrides: ConfigOverrides) -> Self {
        Self {
            moment: self.moment,
            overrides: Some(Arc::new(overrides)),
        }
    }

    /// Copy with the per-instance locale set to `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DatetimeError::LocaleNotFound`] if `key` is not registered.
    pub fn with_locale(&self, key: &str) -> Result<Self> {
        if !locale::has_locale(key) {
            return Err(DatetimeError::LocaleNotFound(key.to_string()));
        }
        let overrides = self.overrides().cloned().unwrap_or_default().with_locale(key);
        Ok(self.with_overrides(overrides))
    }

    fn bare(moment: Option<NaiveDateTime>) -> Self {
        Self {
            moment: moment.map(whole_millis),
            overrides: None,
        }
    }

    fn carry(&self, moment: Option<NaiveDateTime>) -> Self {
        Self {
            moment: moment.map(whole_millis),
            overrides: self.overrides.clone(),
        }
    }

    pub(crate) fn is_verbose(&self) -> bool {
        config::effective_verbose(&[self.overrides()])
    }

    // ── Getters ─────────────────────────────────────────────────────────

    pub fn is_valid(&self) -> bool {
        self.moment.is_some()
    }

    /// The underlying wall-clock value.
    pub fn naive(&self) -> Option<NaiveDateTime> {
        self.moment
    }

    pub fn overrides(&self) -> Option<&ConfigOverrides> {
        self.overrides.as_deref()
    }

    pub fn year(&self) -> Option<i32> {
        Some(self.moment?.year())
    }

    /// Month, 1-based.
    pub fn month(&self) -> Option<u32> {
        Some(self.moment?.month())
    }

    pub fn day(&self) -> Option<u32> {
        Some(self.moment?.day())
    }

    pub fn hour(&self) -> Option<u32> {
        Some(self.moment?.hour())
    }

    pub fn minute(&self) -> Option<u32> {
        Some(self.moment?.minute())
    }

    pub fn second(&self) -> Option<u32> {
        Some(self.moment?.second())
    }

    pub fn millisecond(&self) -> Option<u32> {
        Some(self.moment?.nanosecond() / 1_000_000)
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> Option<i64> {
        Some(self.moment?.and_utc().timestamp_millis())
    }

    /// ISO 8601 at millisecond precision with a `Z` suffix.
    pub fn to_iso_string(&self) -> Option<String> {
        self.moment.as_ref().map(format::iso)
    }

    /// 0 = Sunday .. 6 = Saturday.
    pub fn day_of_week(&self) -> Option<u32> {
        Some(self.moment?.weekday().num_days_from_sunday())
    }

    /// 1-based day of the year.
    pub fn day_of_year(&self) -> Option<u32> {
        Some(self.moment?.ordinal())
    }

    /// Week number under the nearest-Thursday rule, generalized to the
    /// effective first day of week.
    ///
    /// With a first day of 0 this is the ISO 8601 week number. Other first
    /// days remap the weekday index before the shift, so the result departs
    /// from ISO numbering near year boundaries.
    pub fn week_of_year(&self) -> Option<u32> {
        let date = self.moment?.date();
        let first_day = u32::from(self.first_day_of_week()) % 7;
        let mut day_num = date.weekday().num_days_from_sunday();
        if first_day != 0 {
            day_num = (day_num + 7 - first_day) % 7;
        }
        let shift = 4 - i64::from(if day_num == 0 { 7 } else { day_num });
        let shifted = date.checked_add_signed(TimeDelta::try_days(shift)?)?;
        let year_start = NaiveDate::from_ymd_opt(shifted.year(), 1, 1)?;
        let elapsed = (shifted - year_start).num_days();
        // ceil((elapsed + 1) / 7)
        u32::try_from((elapsed + 7) / 7).ok()
    }

    pub fn is_leap_year(&self) -> Option<bool> {
        Some(is_leap_year(self.moment?.year()))
    }

    pub fn days_in_month(&self) -> Option<u32> {
        let m = self.moment?;
        last_day_of_month(m.year(), m.month())
    }

    // ── Effective configuration ─────────────────────────────────────────

    /// Per-instance locale, else the process-wide current locale.
    pub fn locale(&self) -> String {
        self.overrides()
            .and_then(|o| o.locale.clone())
            .unwrap_or_else(locale::current_locale)
    }

    pub fn parse_locale(&self) -> String {
        self.overrides()
            .and_then(|o| o.parse_locale.clone())
            .or_else(|| Some(config::global().parse_locale.clone()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| self.locale())
    }

    /// Stored timezone name. Never applied to arithmetic or getters.
    pub fn timezone(&self) -> String {
        self.overrides()
            .and_then(|o| o.timezone.clone())
            .unwrap_or_else(|| config::global().timezone.clone())
    }

    pub fn first_day_of_week(&self) -> u8 {
        self.overrides()
            .and_then(|o| o.first_day_of_week)
            .unwrap_or_else(|| config::global().first_day_of_week)
    }

    pub fn is_strict(&self) -> bool {
        config::effective_strict(&[self.overrides()])
    }

    pub fn default_format(&self) -> String {
        self.overrides()
            .and_then(|o| o.default_format.clone())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| config::global().default_format.clone())
    }

    // ── Arithmetic ──────────────────────────────────────────────────────

    pub fn add_years(&self, years: i64) -> Self {
        self.carry(
            self.moment
                .and_then(|m| shift_months(m, years.checked_mul(12)?)),
        )
    }

    pub fn sub_years(&self, years: i64) -> Self {
        self.add_years(years.saturating_neg())
    }

    pub fn add_months(&self, months: i64) -> Self {
        self.carry(self.moment.and_then(|m| shift_months(m, months)))
    }

    pub fn sub_months(&self, months: i64) -> Self {
        self.add_months(months.saturating_neg())
    }

    pub fn add_days(&self, days: i64) -> Self {
        self.carry(self.shifted(TimeDelta::try_days(days)))
    }

    pub fn sub_days(&self, days: i64) -> Self {
        self.add_days(days.saturating_neg())
    }

    pub fn add_hours(&self, hours: i64) -> Self {
        self.carry(self.shifted(TimeDelta::try_hours(hours)))
    }

    pub fn sub_hours(&self, hours: i64) -> Self {
        self.add_hours(hours.saturating_neg())
    }

    pub fn add_minutes(&self, minutes: i64) -> Self {
        self.carry(self.shifted(TimeDelta::try_minutes(minutes)))
    }

    pub fn sub_minutes(&self, minutes: i64) -> Self {
        self.add_minutes(minutes.saturating_neg())
    }

    pub fn add_seconds(&self, seconds: i64) -> Self {
        self.carry(self.shifted(TimeDelta::try_seconds(seconds)))
    }

    pub fn sub_seconds(&self, seconds: i64) -> Self {
        self.add_seconds(seconds.saturating_neg())
    }

    /// Unlike the larger units, drops the override record.
    pub fn add_milliseconds(&self, ms: i64) -> Self {
        Self::bare(self.shifted(TimeDelta::try_milliseconds(ms)))
    }

    pub fn sub_milliseconds(&self, ms: i64) -> Self {
        self.add_milliseconds(ms.saturating_neg())
    }

    /// Apply every field of `interval`, years first and milliseconds last.
    pub fn add_interval(&self, interval: &Interval) -> Self {
        self.add_years(interval.years)
            .add_months(interval.months)
            .add_days(interval.days)
            .add_hours(interval.hours)
            .add_minutes(interval.minutes)
            .add_seconds(interval.seconds)
            .add_milliseconds(interval.milliseconds)
    }

    fn shifted(&self, delta: Option<TimeDelta>) -> Option<NaiveDateTime> {
        self.moment?.checked_add_signed(delta?)
    }

    // ── Setters ─────────────────────────────────────────────────────────
    //
    // Out-of-range values roll over into the neighbouring field, e.g.
    // `set_day(32)` in January lands on February 1. No override record is
    // carried.

    pub fn set_year(&self, year: i64) -> Self {
        self.with_field(0, year)
    }

    /// `month` is 1-based.
    pub fn set_month(&self, month: i64) -> Self {
        self.with_field(1, month - 1)
    }

    pub fn set_day(&self, day: i64) -> Self {
        self.with_field(2, day)
    }

    pub fn set_hour(&self, hour: i64) -> Self {
        self.with_field(3, hour)
    }

    pub fn set_minute(&self, minute: i64) -> Self {
        self.with_field(4, minute)
    }

    pub fn set_second(&self, second: i64) -> Self {
        self.with_field(5, second)
    }

    pub fn set_millisecond(&self, ms: i64) -> Self {
        self.with_field(6, ms)
    }

    fn with_field(&self, index: usize, value: i64) -> Self {
        Self::bare(self.moment.and_then(|m| {
            let mut fields = split(&m);
            fields[index] = value;
            compose(fields)
        }))
    }

    // ── Start / end of unit ─────────────────────────────────────────────

    /// Zero every field below `unit`.
    pub fn start_of(&self, unit: Unit) -> Self {
        Self::bare(self.moment.and_then(|m| boundary(&m, unit, 0)))
    }

    /// One millisecond before the start of the next `unit`.
    pub fn end_of(&self, unit: Unit) -> Self {
        Self::bare(self.moment.and_then(|m| {
            boundary(&m, unit, 1)?.checked_sub_signed(TimeDelta::try_milliseconds(1)?)
        }))
    }

    // ── Formatting ──────────────────────────────────────────────────────

    /// Substitute `YYYY MM DD HH mm ss SSS` in a template.
    ///
    /// Template precedence: `template` (if non-empty) > per-instance default
    /// format > process-wide default format > the ISO string.
    pub fn format(&self, template: Option<&str>) -> String {
        let Some(moment) = self.moment else {
            return INVALID_DATE.to_string();
        };
        let template = template
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.default_format());
        if template.is_empty() {
            return format::iso(&moment);
        }
        format::render(&template, &moment)
    }

    // ── Comparison ──────────────────────────────────────────────────────
    //
    // The other operand goes through the construction rules, with text
    // parsed leniently: `d.is_before("2024-01-01")` and
    // `d.is_same(1_704_067_200_000_i64)` both work. An operand that does not
    // resolve compares as `false`.

    pub fn is_before(&self, other: impl Into<DatetimeInput>) -> bool {
        matches!((self.moment, operand(other)), (Some(a), Some(b)) if a < b)
    }

    pub fn is_after(&self, other: impl Into<DatetimeInput>) -> bool {
        matches!((self.moment, operand(other)), (Some(a), Some(b)) if a > b)
    }

    pub fn is_same(&self, other: impl Into<DatetimeInput>) -> bool {
        matches!((self.moment, operand(other)), (Some(a), Some(b)) if a == b)
    }

    /// Whether this instant lies between `a` and `b` in either order.
    pub fn is_between(
        &self,
        a: impl Into<DatetimeInput>,
        b: impl Into<DatetimeInput>,
        inclusive: bool,
    ) -> bool {
        let (Some(t), Some(t1), Some(t2)) = (self.moment, operand(a), operand(b)) else {
            return false;
        };
        let (lo, hi) = (t1.min(t2), t1.max(t2));
        if inclusive {
            lo <= t && t <= hi
        } else {
            lo < t && t < hi
        }
    }

    pub fn is_same_day(&self, other: impl Into<DatetimeInput>) -> bool {
        self.same_fields(other, |m| (m.year(), m.month(), m.day()))
    }

    pub fn is_same_month(&self, other: impl Into<DatetimeInput>) -> bool {
        self.same_fields(other, |m| (m.year(), m.month(), 0))
    }

    pub fn is_same_year(&self, other: impl Into<DatetimeInput>) -> bool {
        self.same_fields(other, |m| (m.year(), 0, 0))
    }

    fn same_fields(
        &self,
        other: impl Into<DatetimeInput>,
        key: impl Fn(&NaiveDateTime) -> (i32, u32, u32),
    ) -> bool {
        matches!((self.moment, operand(other)), (Some(a), Some(b)) if key(&a) == key(&b))
    }

    // ── Differences ─────────────────────────────────────────────────────

    /// Signed difference `self - other` in `unit`.
    ///
    /// Years and months compare calendar fields; smaller units floor the
    /// millisecond difference.
    pub fn diff(&self, other: impl Into<DatetimeInput>, unit: Unit) -> Option<i64> {
        let (a, b) = (self.moment?, operand(other)?);
        let ms = a.and_utc().timestamp_millis() - b.and_utc().timestamp_millis();
        let years = i64::from(a.year()) - i64::from(b.year());
        Some(match unit {
            Unit::Year => years,
            Unit::Month => years * 12 + i64::from(a.month()) - i64::from(b.month()),
            Unit::Day => ms.div_euclid(MS_PER_DAY),
            Unit::Hour => ms.div_euclid(MS_PER_HOUR),
            Unit::Minute => ms.div_euclid(MS_PER_MINUTE),
            Unit::Second => ms.div_euclid(MS_PER_SECOND),
            Unit::Millisecond => ms,
        })
    }

    /// Human phrase relative to `reference` (default: now), rendered with
    /// this instant's locale.
    pub fn diff_for_humans(&self, reference: Option<&Datetime>) -> Option<String> {
        let phrases = locale::resolve_phrases(&self.locale(), self.is_verbose());
        match reference {
            Some(r) => self.diff_for_humans_with(r, phrases.as_ref()),
            None => self.diff_for_humans_with(&Datetime::now(), phrases.as_ref()),
        }
    }

    /// Human phrase relative to `reference` with explicit phrase rules.
    pub fn diff_for_humans_with(&self, reference: &Datetime, phrases: &dyn Phrases) -> Option<String> {
        let diff = self.timestamp()? - reference.timestamp()?;
        let abs = diff.abs();
        let phrase = HUMAN_STEPS
            .iter()
            .map(|&(unit, unit_ms)| (unit, abs / unit_ms))
            .find(|&(_, count)| count > 0)
            .map(|(unit, count)| {
                if diff > 0 {
                    phrases.from_now(count, unit)
                } else {
                    phrases.ago(count, unit)
                }
            })
            .unwrap_or_else(|| phrases.just_now());
        Some(phrase)
    }

    /// Absolute distance to `other`, decomposed with the approximate
    /// year and month lengths.
    pub fn interval_until(&self, other: impl Into<DatetimeInput>) -> Option<Interval> {
        Some(Interval::from_span(self.diff(other, Unit::Millisecond)?))
    }

    /// Lazy range from this instant to `other`.
    pub fn period_until(&self, other: &Datetime, interval: Interval) -> Period {
        Period::new(self.clone(), other.clone(), interval)
    }
}

impl From<NaiveDateTime> for Datetime {
    fn from(n: NaiveDateTime) -> Self {
        Self::bare(Some(n))
    }
}

impl From<DateTime<Utc>> for Datetime {
    fn from(d: DateTime<Utc>) -> Self {
        Self::bare(Some(d.naive_utc()))
    }
}

impl From<i64> for Datetime {
    fn from(ms: i64) -> Self {
        Self::from_timestamp(ms)
    }
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(None))
    }
}

impl Serialize for Datetime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.to_iso_string() {
            Some(iso) => serializer.serialize_some(&iso),
            None => serializer.serialize_none(),
        }
    }
}

// ── Calendar helpers ────────────────────────────────────────────────────────

pub(crate) fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Last valid day of `month` (1-based) in `year`.
pub(crate) fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(ny, nm, 1)?;
    Some(first_next.pred_opt()?.day())
}

/// Shift by whole months, clamping the day to the target month's length.
fn shift_months(m: NaiveDateTime, delta: i64) -> Option<NaiveDateTime> {
    let original_day = m.day();
    let total = i64::from(m.year())
        .checked_mul(12)?
        .checked_add(i64::from(m.month0()))?
        .checked_add(delta)?;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    let day = original_day.min(last_day_of_month(year, month)?);
    Some(NaiveDate::from_ymd_opt(year, month, day)?.and_time(m.time()))
}

/// Drop precision below one millisecond.
fn whole_millis(m: NaiveDateTime) -> NaiveDateTime {
    m.trunc_subsecs(3)
}

fn operand(other: impl Into<DatetimeInput>) -> Option<NaiveDateTime> {
    other.into().resolve().map(whole_millis)
}

fn from_epoch_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|d| d.naive_utc())
}

/// `[year, month0, day, hour, minute, second, millisecond]`.
fn split(m: &NaiveDateTime) -> [i64; 7] {
    [
        i64::from(m.year()),
        i64::from(m.month0()),
        i64::from(m.day()),
        i64::from(m.hour()),
        i64::from(m.minute()),
        i64::from(m.second()),
        i64::from(m.nanosecond() / 1_000_000),
    ]
}

/// Inverse of [`split`] that rolls out-of-range fields into larger ones.
fn compose([year, month0, day, hour, minute, second, ms]: [i64; 7]) -> Option<NaiveDateTime> {
    let total_months = year.checked_mul(12)?.checked_add(month0)?;
    let y = i32::try_from(total_months.div_euclid(12)).ok()?;
    let mo = u32::try_from(total_months.rem_euclid(12)).ok()? + 1;
    let first = NaiveDate::from_ymd_opt(y, mo, 1)?.and_hms_opt(0, 0, 0)?;
    let offset = TimeDelta::try_days(day.checked_sub(1)?)?
        .checked_add(&TimeDelta::try_hours(hour)?)?
        .checked_add(&TimeDelta::try_minutes(minute)?)?
        .checked_add(&TimeDelta::try_seconds(second)?)?
        .checked_add(&TimeDelta::try_milliseconds(ms)?)?;
    first.checked_add_signed(offset)
}

/// Start of the `unit` containing `m`, advanced by `bump` units.
fn boundary(m: &NaiveDateTime, unit: Unit, bump: i64) -> Option<NaiveDateTime> {
    let keep = match unit {
        Unit::Year => 1,
        Unit::Month => 2,
        Unit::Day => 3,
        Unit::Hour => 4,
        Unit::Minute => 5,
        Unit::Second => 6,
        Unit::Millisecond => 7,
    };
    let mut fields = split(m);
    for (i, field) in fields.iter_mut().enumerate().skip(keep) {
        // day of month starts at 1, everything else at 0
        *field = i64::from(i == 2);
    }
    fields[keep - 1] = fields[keep - 1].checked_add(bump)?;
    compose(fields)
}

/// Accepted forms, tried in order: RFC 3339 with offset, naive
/// `T`- or space-separated date-time, minute-precision `T` form, bare date.
pub(crate) fn parse_text(text: &str) -> Option<NaiveDateTime> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(n) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(n);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::English;
    use serde_json::json;

    const ISO: &str = "2024-05-01T12:34:56.789Z";

    fn dt(s: &str) -> Datetime {
        Datetime::parse(s).unwrap()
    }

    fn ymd(d: &Datetime) -> (i32, u32, u32) {
        (d.year().unwrap(), d.month().unwrap(), d.day().unwrap())
    }

    fn strict() -> Option<ConfigOverrides> {
        Some(ConfigOverrides::default().with_strict(true))
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn test_construct_from_every_input_kind() {
        let from_text = dt(ISO);
        let ts = from_text.timestamp().unwrap();
        let from_ts = Datetime::new(ts, None).unwrap();
        let from_copy = Datetime::new(&from_text, None).unwrap();
        let from_naive = Datetime::new(from_text.naive().unwrap(), None).unwrap();
        let from_utc = Datetime::new(from_text.naive().unwrap().and_utc(), None).unwrap();
        for d in [&from_text, &from_ts, &from_copy, &from_naive, &from_utc] {
            assert_eq!(d.to_iso_string().as_deref(), Some(ISO));
        }
    }

    #[test]
    fn test_construct_none_is_now() {
        let before = Utc::now().timestamp_millis();
        let d = Datetime::new(None::<i64>, None).unwrap();
        let after = Utc::now().timestamp_millis();
        let ts = d.timestamp().unwrap();
        assert!(before <= ts && ts <= after);
    }

    #[test]
    fn test_strict_invalid_string_fails() {
        let err = Datetime::new("not-a-date", strict()).unwrap_err();
        assert_eq!(err, DatetimeError::InvalidDateString("not-a-date".to_string()));
    }

    #[test]
    fn test_non_strict_invalid_string_is_invalid_instant() {
        let d = Datetime::new("not-a-date", Some(ConfigOverrides::default().with_strict(false)))
            .unwrap();
        assert!(!d.is_valid());
        assert_eq!(d.year(), None);
        assert_eq!(d.timestamp(), None);
        assert_eq!(d.week_of_year(), None);
        assert_eq!(d.format(None), "Invalid Date");
        assert!(!d.add_days(1).is_valid());
    }

    #[test]
    fn test_empty_and_whitespace_strings_do_not_fail() {
        let lenient = Some(ConfigOverrides::default().with_strict(false));
        assert!(Datetime::new("", lenient.clone()).is_ok());
        assert!(Datetime::new("   ", lenient).is_ok());
    }

    #[test]
    fn test_parse_accepted_forms() {
        assert_eq!(ymd(&dt("2024-01-03")), (2024, 1, 3));
        assert_eq!(dt("2024-01-03").hour(), Some(0));
        assert_eq!(dt("2024-01-03T10:20").minute(), Some(20));
        assert_eq!(dt("2024-01-03 10:20:30.5").millisecond(), Some(500));
        assert_eq!(dt("2024-01-03T10:20:30").second(), Some(30));
    }

    #[test]
    fn test_parse_offset_normalized_to_utc() {
        let d = dt("2024-01-03T10:00:00+02:00");
        assert_eq!(d.hour(), Some(8));
    }

    #[test]
    fn test_from_value_rules() {
        let d = Datetime::from_value(&json!(0), None).unwrap();
        assert_eq!(d.to_iso_string().as_deref(), Some("1970-01-01T00:00:00.000Z"));
        let d = Datetime::from_value(&json!(1500.9), None).unwrap();
        assert_eq!(d.millisecond(), Some(500));
        let d = Datetime::from_value(&json!("2024-02-29"), None).unwrap();
        assert_eq!(ymd(&d), (2024, 2, 29));
        assert!(Datetime::from_value(&Value::Null, None).unwrap().is_valid());
    }

    #[test]
    fn test_from_value_rejects_unsupported_kinds() {
        for v in [json!(true), json!([1, 2]), json!({"year": 2024})] {
            let err = Datetime::from_value(&v, None).unwrap_err();
            assert!(matches!(err, DatetimeError::InvalidInput(_)), "got: {err}");
        }
    }

    #[test]
    fn test_out_of_range_timestamp_is_invalid() {
        assert!(!Datetime::from_timestamp(i64::MAX).is_valid());
    }

    // ── Getters ─────────────────────────────────────────────────────────

    #[test]
    fn test_getters_project_fields() {
        let d = dt(ISO);
        assert_eq!(d.year(), Some(2024));
        assert_eq!(d.month(), Some(5));
        assert_eq!(d.day(), Some(1));
        assert_eq!(d.hour(), Some(12));
        assert_eq!(d.minute(), Some(34));
        assert_eq!(d.second(), Some(56));
        assert_eq!(d.millisecond(), Some(789));
        assert_eq!(d.timestamp(), Some(1_714_566_896_789));
        assert_eq!(d.day_of_week(), Some(3)); // Wednesday
        assert_eq!(d.day_of_year(), Some(122));
        assert_eq!(d.is_leap_year(), Some(true));
        assert_eq!(d.days_in_month(), Some(31));
    }

    #[test]
    fn test_leap_year_rules() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
    }

    #[test]
    fn test_days_in_february() {
        assert_eq!(dt("2024-02-10").days_in_month(), Some(29));
        assert_eq!(dt("2023-02-10").days_in_month(), Some(28));
        assert_eq!(dt("2023-12-10").days_in_month(), Some(31));
    }

    #[test]
    fn test_week_of_year_iso_when_first_day_zero() {
        let sunday_start = Some(ConfigOverrides::default().with_first_day_of_week(0));
        let d = Datetime::new("2024-01-01T00:00:00Z", sunday_start.clone()).unwrap();
        assert_eq!(d.week_of_year(), Some(1));
        let d = Datetime::new("2023-12-31T00:00:00Z", sunday_start.clone()).unwrap();
        assert_eq!(d.week_of_year(), Some(52));
        let d = Datetime::new("2020-12-31T00:00:00Z", sunday_start).unwrap();
        assert_eq!(d.week_of_year(), Some(53));
    }

    #[test]
    fn test_week_of_year_remapped_first_day() {
        let monday_start = Some(ConfigOverrides::default().with_first_day_of_week(1));
        // Monday becomes index 0, treated as the week's seventh day.
        let d = Datetime::new("2024-01-01T00:00:00Z", monday_start.clone()).unwrap();
        assert_eq!(d.week_of_year(), Some(52));
        let d = Datetime::new("2024-01-10T00:00:00Z", monday_start).unwrap();
        assert_eq!(d.week_of_year(), Some(2));
    }

    // ── Arithmetic ──────────────────────────────────────────────────────

    #[test]
    fn test_leap_day_plus_year_clamps() {
        let d = dt("2020-02-29T00:00:00Z");
        assert_eq!((d.month(), d.day()), (Some(2), Some(29)));
        assert_eq!(ymd(&d.add_years(1)), (2021, 2, 28));
        assert_eq!(ymd(&d.add_years(4)), (2024, 2, 29));
    }

    #[test]
    fn test_month_end_clamps() {
        let d = dt("2024-01-31T00:00:00Z");
        assert_eq!(ymd(&d.add_months(1)), (2024, 2, 29));
        assert_eq!(ymd(&d.sub_months(1)), (2023, 12, 31));
        assert_eq!(ymd(&dt("2023-01-31").add_months(1)), (2023, 2, 28));
        assert_eq!(ymd(&dt("2024-03-31").add_months(-13)), (2023, 2, 28));
        assert_eq!(ymd(&dt("2024-08-31").add_months(1)), (2024, 9, 30));
    }

    #[test]
    fn test_month_arithmetic_keeps_time_of_day() {
        let d = dt("2024-01-31T13:14:15.016Z").add_months(1);
        assert_eq!(d.to_iso_string().as_deref(), Some("2024-02-29T13:14:15.016Z"));
    }

    #[test]
    fn test_day_arithmetic_carries() {
        let d = dt("2024-01-01T00:00:00Z");
        assert_eq!(d.add_days(0).day(), Some(1));
        assert_eq!(ymd(&d.add_days(-1)), (2023, 12, 31));
        assert_eq!(d.sub_days(0).day(), Some(1));
        assert_eq!(d.sub_days(-1).day(), Some(2));
        assert_eq!(ymd(&d.add_days(31)), (2024, 2, 1));
    }

    #[test]
    fn test_time_arithmetic_carries() {
        let d = dt("2024-12-31T23:59:59.999Z");
        assert_eq!(
            d.add_milliseconds(1).to_iso_string().as_deref(),
            Some("2025-01-01T00:00:00.000Z")
        );
        assert_eq!(d.add_seconds(1).second(), Some(0));
        assert_eq!(d.add_minutes(1).year(), Some(2025));
        assert_eq!(d.sub_hours(24).day(), Some(30));
    }

    #[test]
    fn test_arithmetic_is_immutable() {
        let d = dt("2024-01-01T00:00:00Z");
        let d2 = d.add_days(1);
        assert_eq!(d.day(), Some(1));
        assert_eq!(d2.day(), Some(2));
    }

    #[test]
    fn test_overrides_carried_except_milliseconds() {
        let o = ConfigOverrides::default().with_default_format("YYYY");
        let d = Datetime::new("2024-01-01T00:00:00Z", Some(o.clone())).unwrap();
        assert_eq!(d.add_days(1).overrides(), Some(&o));
        assert_eq!(d.add_months(1).overrides(), Some(&o));
        assert_eq!(d.sub_years(1).overrides(), Some(&o));
        assert_eq!(d.add_milliseconds(1).overrides(), None);
        assert_eq!(d.set_day(2).overrides(), None);
        assert_eq!(d.start_of(Unit::Day).overrides(), None);
    }

    #[test]
    fn test_add_interval_applies_in_field_order() {
        let d = dt("2024-01-31T00:00:00Z");
        let shifted = d.add_interval(&Interval::new(0, 1, 1, 1, 0, 0, 0));
        // month first (clamp to Feb 29), then the day
        assert_eq!(
            shifted.to_iso_string().as_deref(),
            Some("2024-03-01T01:00:00.000Z")
        );
    }

    #[test]
    fn test_overflow_becomes_invalid() {
        let d = dt("2024-01-01");
        assert!(!d.add_years(i64::MAX).is_valid());
        assert!(!d.add_days(i64::MAX).is_valid());
        assert!(!d.sub_days(i64::MIN).is_valid());
    }

    // ── Setters ─────────────────────────────────────────────────────────

    #[test]
    fn test_setters_replace_single_field() {
        let d = dt(ISO);
        assert_eq!(d.set_year(2020).year(), Some(2020));
        assert_eq!(d.set_month(12).month(), Some(12));
        assert_eq!(d.set_day(15).day(), Some(15));
        assert_eq!(d.set_hour(0).hour(), Some(0));
        assert_eq!(d.set_minute(1).minute(), Some(1));
        assert_eq!(d.set_second(2).second(), Some(2));
        assert_eq!(d.set_millisecond(3).millisecond(), Some(3));
        assert_eq!(d.set_month(12).day(), Some(1));
    }

    #[test]
    fn test_setters_roll_over_instead_of_clamping() {
        assert_eq!(ymd(&dt("2024-01-31").set_month(2)), (2024, 3, 2));
        assert_eq!(ymd(&dt("2020-02-29").set_year(2021)), (2021, 3, 1));
        assert_eq!(ymd(&dt("2024-01-15").set_day(32)), (2024, 2, 1));
        assert_eq!(ymd(&dt("2024-01-15").set_hour(24)), (2024, 1, 16));
    }

    // ── Start / end of unit ─────────────────────────────────────────────

    #[test]
    fn test_start_of_units() {
        let d = dt(ISO);
        let iso = |u| d.start_of(u).to_iso_string().unwrap();
        assert_eq!(iso(Unit::Year), "2024-01-01T00:00:00.000Z");
        assert_eq!(iso(Unit::Month), "2024-05-01T00:00:00.000Z");
        assert_eq!(iso(Unit::Day), "2024-05-01T00:00:00.000Z");
        assert_eq!(iso(Unit::Hour), "2024-05-01T12:00:00.000Z");
        assert_eq!(iso(Unit::Minute), "2024-05-01T12:34:00.000Z");
        assert_eq!(iso(Unit::Second), "2024-05-01T12:34:56.000Z");
    }

    #[test]
    fn test_end_of_units() {
        let d = dt("2024-02-10T12:34:56.789Z");
        let iso = |u| d.end_of(u).to_iso_string().unwrap();
        assert_eq!(iso(Unit::Year), "2024-12-31T23:59:59.999Z");
        assert_eq!(iso(Unit::Month), "2024-02-29T23:59:59.999Z");
        assert_eq!(iso(Unit::Day), "2024-02-10T23:59:59.999Z");
        assert_eq!(iso(Unit::Hour), "2024-02-10T12:59:59.999Z");
        assert_eq!(iso(Unit::Minute), "2024-02-10T12:34:59.999Z");
        assert_eq!(iso(Unit::Second), "2024-02-10T12:34:56.999Z");
    }

    #[test]
    fn test_end_of_is_one_ms_before_next_start() {
        let d = dt("2023-12-31T23:10:00Z");
        let end = d.end_of(Unit::Month);
        let next = end.add_milliseconds(1);
        assert!(next.is_same(&next.start_of(Unit::Month)));
        assert_eq!(ymd(&next), (2024, 1, 1));
    }

    // ── Formatting ──────────────────────────────────────────────────────

    #[test]
    fn test_format_tokens() {
        let d = dt("2024-01-02T03:04:05.123Z");
        assert_eq!(d.format(Some("YYYY-MM-DD HH:mm:ss.SSS")), "2024-01-02 03:04:05.123");
        assert_eq!(d.format(Some("FOO-BAR")), "FOO-BAR");
        assert_eq!(d.format(Some("YYYY-FOO-DD")), "2024-FOO-02");
    }

    #[test]
    fn test_format_precedence() {
        let o = ConfigOverrides::default().with_default_format("YYYY-MM-DD");
        let d = Datetime::new("2024-01-02T03:04:05.123Z", Some(o)).unwrap();
        assert_eq!(d.to_iso_string().as_deref(), Some("2024-01-02T03:04:05.123Z"));
        assert_eq!(d.to_string(), "2024-01-02");
        assert_eq!(d.format(None), "2024-01-02");
        assert_eq!(d.format(Some("")), "2024-01-02");
        assert_eq!(d.format(Some("HH")), "03");
    }

    #[test]
    fn test_serialize_as_iso_string() {
        let d = dt("2024-01-02T03:04:05.123Z");
        assert_eq!(serde_json::to_string(&d).unwrap(), r#""2024-01-02T03:04:05.123Z""#);
        let invalid = Datetime::new("nope", Some(ConfigOverrides::default().with_strict(false)))
            .unwrap();
        assert_eq!(serde_json::to_string(&invalid).unwrap(), "null");
    }

    // ── Comparison ──────────────────────────────────────────────────────

    #[test]
    fn test_ordering_predicates() {
        let a = dt("2024-01-01");
        let b = dt("2024-01-02");
        assert!(a.is_before(&b));
        assert!(b.is_after(&a));
        assert!(a.is_same(&dt("2024-01-01T00:00:00.000Z")));
        assert!(!a.is_same(&b));
    }

    #[test]
    fn test_is_between_ignores_argument_order() {
        let a = dt("2024-01-01");
        let b = dt("2024-01-10");
        let mid = dt("2024-01-05");
        assert!(mid.is_between(&a, &b, true));
        assert!(mid.is_between(&b, &a, true));
        assert!(a.is_between(&a, &b, true));
        assert!(!a.is_between(&a, &b, false));
        assert!(!dt("2024-02-01").is_between(&a, &b, true));
    }

    #[test]
    fn test_same_calendar_fields() {
        let a = dt("2024-03-05T01:00:00Z");
        let b = dt("2024-03-05T23:00:00Z");
        assert!(a.is_same_day(&b));
        assert!(a.is_same_month(&dt("2024-03-28")));
        assert!(!a.is_same_month(&dt("2023-03-05")));
        assert!(a.is_same_year(&dt("2024-12-31")));
    }

    #[test]
    fn test_invalid_operands_compare_false() {
        let invalid =
            Datetime::new("nope", Some(ConfigOverrides::default().with_strict(false))).unwrap();
        let d = dt("2024-01-01");
        assert!(!d.is_before(&invalid));
        assert!(!d.is_after(&invalid));
        assert!(!invalid.is_same(&invalid));
        assert!(!d.is_same_day(&invalid));
    }

    #[test]
    fn test_sub_millisecond_input_truncated() {
        let a = dt("2024-01-01T00:00:00.0005Z");
        let b = dt("2024-01-01T00:00:00.000Z");
        assert_eq!(a.timestamp(), b.timestamp());
        assert!(a.is_same(&b));
        assert!(!a.is_after(&b));
        assert!(!b.is_before(&a));
        assert_eq!(a.diff(&b, Unit::Millisecond), Some(0));
        assert_eq!(a.naive().unwrap().nanosecond(), 0);

        let n = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_nano_opt(0, 0, 0, 1_999_999)
            .unwrap();
        let from_naive = Datetime::from(n);
        assert_eq!(from_naive.millisecond(), Some(1));
        assert!(from_naive.is_same(&Datetime::from_timestamp(1_704_067_200_001)));
        assert!(Datetime::new(n, None).unwrap().is_same(&from_naive));
    }

    #[test]
    fn test_operands_coerced_like_construction() {
        let d = dt("2024-01-05");
        assert!(d.is_after("2024-01-01"));
        assert!(d.is_before("2024-02-01T00:00:00Z"));
        assert!(d.is_same(1_704_412_800_000_i64));
        assert!(d.is_between("2024-01-01", 1_704_499_200_000_i64, true));
        assert!(d.is_same_day("2024-01-05T23:59:59Z"));
        assert!(d.is_same_month("2024-01-31"));
        assert_eq!(d.diff("2024-01-01", Unit::Day), Some(4));
        assert_eq!(d.diff(1_704_067_200_000_i64, Unit::Hour), Some(96));
        assert!(d.is_before(None::<&str>));
    }

    #[test]
    fn test_unparseable_text_operand_compares_false() {
        let d = dt("2024-01-05");
        assert!(!d.is_before("garbage"));
        assert!(!d.is_after("garbage"));
        assert!(!d.is_same(""));
        assert_eq!(d.diff("garbage", Unit::Day), None);
    }

    // ── Differences ─────────────────────────────────────────────────────

    #[test]
    fn test_diff_units() {
        let a = dt("2024-03-01T00:00:00Z");
        let b = dt("2023-12-31T12:00:00Z");
        assert_eq!(a.diff(&b, Unit::Year), Some(1));
        assert_eq!(a.diff(&b, Unit::Month), Some(3));
        assert_eq!(a.diff(&b, Unit::Day), Some(60));
        assert_eq!(a.diff(&b, Unit::Hour), Some(60 * 24 + 12));
        assert_eq!(b.diff(&a, Unit::Day), Some(-61));
        assert_eq!(a.diff(&a.add_seconds(1), Unit::Millisecond), Some(-1000));
    }

    #[test]
    fn test_diff_for_humans_phrases() {
        let now = Datetime::now();
        assert_eq!(now.diff_for_humans(Some(&now)).as_deref(), Some("just now"));
        assert_eq!(
            now.add_days(2).diff_for_humans(Some(&now)).as_deref(),
            Some("in 2 days")
        );
        assert_eq!(
            now.sub_days(2).diff_for_humans(Some(&now)).as_deref(),
            Some("2 days ago")
        );
    }

    #[test]
    fn test_diff_for_humans_largest_unit_wins() {
        let base = dt("2024-01-01");
        let p = |d: &Datetime| d.diff_for_humans_with(&base, &English).unwrap();
        assert_eq!(p(&base.add_years(2)), "in 2 years");
        assert_eq!(p(&base.sub_months(3)), "3 months ago");
        assert_eq!(p(&base.add_hours(1)), "in 1 hour");
        assert_eq!(p(&base.add_milliseconds(999)), "just now");
        assert_eq!(p(&base.sub_seconds(45)), "45 seconds ago");
    }

    #[test]
    fn test_diff_for_humans_unknown_instance_locale_falls_back() {
        let o = ConfigOverrides::default().with_locale("not-a-locale");
        let d = Datetime::new("2024-01-01T00:00:00Z", Some(o)).unwrap();
        assert_eq!(d.locale(), "not-a-locale");
        let reference = dt("2024-01-04T00:00:00Z");
        assert_eq!(d.diff_for_humans(Some(&reference)).as_deref(), Some("3 days ago"));
    }

    #[test]
    fn test_unknown_instance_locale_falls_back_under_own_verbose_flag() {
        let reference = dt("2024-01-10T00:00:00Z");
        for verbose in [true, false] {
            let d = dt("2024-01-08T00:00:00Z").with_overrides(
                ConfigOverrides::default()
                    .with_locale("zz-unregistered")
                    .with_verbose(verbose),
            );
            assert_eq!(d.is_verbose(), verbose);
            assert_eq!(d.diff_for_humans(Some(&reference)).unwrap(), "2 days ago");
        }
    }

    #[test]
    fn test_interval_until_decomposes() {
        let a = dt("2024-01-01T00:00:00Z");
        let b = a.add_days(2).add_hours(3).add_milliseconds(4);
        assert_eq!(a.interval_until(&b), Some(Interval::new(0, 0, 2, 3, 0, 0, 4)));
        assert_eq!(b.interval_until(&a), a.interval_until(&b));
    }

    #[test]
    fn test_with_locale_requires_registered_key() {
        let d = dt("2024-01-01");
        assert_eq!(d.with_locale("en").unwrap().locale(), "en");
        assert!(matches!(
            d.with_locale("xx-missing"),
            Err(DatetimeError::LocaleNotFound(_))
        ));
    }

    #[test]
    fn test_timezone_is_echoed() {
        let o = ConfigOverrides::default().with_timezone("America/New_York");
        let d = Datetime::new("2024-01-01T00:00:00Z", Some(o)).unwrap();
        assert_eq!(d.timezone(), "America/New_York");
        assert_eq!(d.hour(), Some(0));
    }

    #[test]
    fn test_clone_is_equal_value() {
        let d = dt("2024-01-01T00:00:00Z");
        let c = d.clone();
        assert!(c.is_same(&d));
        assert_eq!(c.to_iso_string(), d.to_iso_string());
    }
}
