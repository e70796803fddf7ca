//! Signed calendar durations.
//!
//! An [`Interval`] keeps each field exactly as given: 90 minutes stays 90
//! minutes. Arithmetic is field-wise and never carries. Only
//! [`Interval::to_milliseconds`] collapses the fields, using fixed
//! approximations (year = 365.25 days, month = 30.44 days, day = 24 hours),
//! which is fine for display and estimation but not for calendar math.
//!
//! Field arithmetic and [`Interval::to_milliseconds`] saturate at the `i64`
//! bounds instead of overflowing.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::locale::{self, Phrases, Unit};

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
/// 365.25 days.
pub const MS_PER_YEAR_APPROX: i64 = 31_557_600_000;
/// 30.44 days.
pub const MS_PER_MONTH_APPROX: i64 = 2_630_016_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Interval {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
}

impl Interval {
    pub const ZERO: Interval = Interval {
        years: 0,
        months: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        milliseconds: 0,
    };

    pub fn new(
        years: i64,
        months: i64,
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
    ) -> Self {
        Self {
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
            milliseconds,
        }
    }

    pub fn years(n: i64) -> Self {
        Self { years: n, ..Self::ZERO }
    }

    pub fn months(n: i64) -> Self {
        Self { months: n, ..Self::ZERO }
    }

    pub fn days(n: i64) -> Self {
        Self { days: n, ..Self::ZERO }
    }

    pub fn hours(n: i64) -> Self {
        Self { hours: n, ..Self::ZERO }
    }

    pub fn minutes(n: i64) -> Self {
        Self { minutes: n, ..Self::ZERO }
    }

    pub fn seconds(n: i64) -> Self {
        Self { seconds: n, ..Self::ZERO }
    }

    pub fn milliseconds(n: i64) -> Self {
        Self {
            milliseconds: n,
            ..Self::ZERO
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Approximate total length in milliseconds, saturating.
    pub fn to_milliseconds(&self) -> i64 {
        [
            (self.years, MS_PER_YEAR_APPROX),
            (self.months, MS_PER_MONTH_APPROX),
            (self.days, MS_PER_DAY),
            (self.hours, MS_PER_HOUR),
            (self.minutes, MS_PER_MINUTE),
            (self.seconds, MS_PER_SECOND),
            (self.milliseconds, 1),
        ]
        .into_iter()
        .fold(0i64, |total, (n, unit_ms)| {
            total.saturating_add(n.saturating_mul(unit_ms))
        })
    }

    /// Decompose an absolute millisecond span largest unit first, using the
    /// same approximations as [`to_milliseconds`](Self::to_milliseconds).
    pub fn from_span(ms: i64) -> Self {
        let mut remaining = ms.unsigned_abs();
        let mut take = |unit_ms: i64| {
            let unit_ms = unit_ms.unsigned_abs();
            let n = remaining / unit_ms;
            remaining %= unit_ms;
            i64::try_from(n).unwrap_or(i64::MAX)
        };
        let years = take(MS_PER_YEAR_APPROX);
        let months = take(MS_PER_MONTH_APPROX);
        let days = take(MS_PER_DAY);
        let hours = take(MS_PER_HOUR);
        let minutes = take(MS_PER_MINUTE);
        let seconds = take(MS_PER_SECOND);
        let milliseconds = take(1);
        Self::new(years, months, days, hours, minutes, seconds, milliseconds)
    }

    /// Field values paired with their unit, in display order.
    pub fn fields(&self) -> [(Unit, i64); 7] {
        [
            (Unit::Year, self.years),
            (Unit::Month, self.months),
            (Unit::Day, self.days),
            (Unit::Hour, self.hours),
            (Unit::Minute, self.minutes),
            (Unit::Second, self.seconds),
            (Unit::Millisecond, self.milliseconds),
        ]
    }

    /// Render the non-zero fields with the registered locale `locale_key`
    /// (English if unknown).
    pub fn for_humans(&self, locale_key: &str) -> String {
        self.for_humans_with(locale::phrases_for(locale_key).as_ref())
    }

    /// Render the non-zero fields with explicit phrase rules.
    pub fn for_humans_with(&self, phrases: &dyn Phrases) -> String {
        let parts = self
            .fields()
            .into_iter()
            .filter(|(_, n)| *n != 0)
            .map(|(unit, n)| format!("{n} {}", phrases.unit_name(unit, n)))
            .collect();
        phrases.join_interval(parts)
    }
}

impl Add for Interval {
    type Output = Interval;

    fn add(self, rhs: Interval) -> Interval {
        Interval {
            years: self.years.saturating_add(rhs.years),
            months: self.months.saturating_add(rhs.months),
            days: self.days.saturating_add(rhs.days),
            hours: self.hours.saturating_add(rhs.hours),
            minutes: self.minutes.saturating_add(rhs.minutes),
            seconds: self.seconds.saturating_add(rhs.seconds),
            milliseconds: self.milliseconds.saturating_add(rhs.milliseconds),
        }
    }
}

impl Sub for Interval {
    type Output = Interval;

    fn sub(self, rhs: Interval) -> Interval {
        Interval {
            years: self.years.saturating_sub(rhs.years),
            months: self.months.saturating_sub(rhs.months),
            days: self.days.saturating_sub(rhs.days),
            hours: self.hours.saturating_sub(rhs.hours),
            minutes: self.minutes.saturating_sub(rhs.minutes),
            seconds: self.seconds.saturating_sub(rhs.seconds),
            milliseconds: self.milliseconds.saturating_sub(rhs.milliseconds),
        }
    }
}

impl Neg for Interval {
    type Output = Interval;

    fn neg(self) -> Interval {
        Interval {
            years: self.years.saturating_neg(),
            months: self.months.saturating_neg(),
            days: self.days.saturating_neg(),
            hours: self.hours.saturating_neg(),
            minutes: self.minutes.saturating_neg(),
            seconds: self.seconds.saturating_neg(),
            milliseconds: self.milliseconds.saturating_neg(),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.for_humans(&locale::current_locale()))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::English;

    #[test]
    fn test_named_constructors_set_one_field() {
        let i = Interval::days(-3);
        assert_eq!(i.days, -3);
        assert_eq!(Interval { days: 0, ..i }, Interval::ZERO);
        assert_eq!(Interval::minutes(90).minutes, 90);
        assert_eq!(Interval::minutes(90).hours, 0);
    }

    #[test]
    fn test_add_and_subtract_are_field_wise() {
        let sum = Interval::days(2) + Interval::hours(3);
        assert_eq!(sum.days, 2);
        assert_eq!(sum.hours, 3);
        let diff = sum - Interval::hours(3);
        assert_eq!(diff.days, 2);
        assert_eq!(diff.hours, 0);
    }

    #[test]
    fn test_no_carry_between_fields() {
        let sum = Interval::minutes(45) + Interval::minutes(45);
        assert_eq!(sum.minutes, 90);
        assert_eq!(sum.hours, 0);
    }

    #[test]
    fn test_to_milliseconds_approximations() {
        assert_eq!(Interval::days(1).to_milliseconds(), 86_400_000);
        assert_eq!(Interval::years(1).to_milliseconds(), 31_557_600_000);
        assert_eq!(Interval::months(1).to_milliseconds(), 2_630_016_000);
        assert_eq!(
            Interval::new(0, 0, 0, 1, 1, 1, 1).to_milliseconds(),
            3_600_000 + 60_000 + 1_000 + 1
        );
    }

    #[test]
    fn test_from_span_decomposes_largest_first() {
        let i = Interval::from_span(MS_PER_DAY * 2 + MS_PER_HOUR * 3 + 5);
        assert_eq!(i, Interval::new(0, 0, 2, 3, 0, 0, 5));
        assert_eq!(Interval::from_span(-MS_PER_MINUTE), Interval::minutes(1));
    }

    #[test]
    fn test_for_humans_zero_interval() {
        assert_eq!(Interval::days(0).for_humans_with(&English), "0 seconds");
        assert_eq!(Interval::default().for_humans_with(&English), "0 seconds");
    }

    #[test]
    fn test_for_humans_negative_fields() {
        assert!(Interval::days(-3).for_humans_with(&English).contains("-3 day"));
        let i = Interval { hours: -2, ..Interval::ZERO };
        assert!(i.for_humans_with(&English).contains("-2 hour"));
    }

    #[test]
    fn test_for_humans_fixed_order_and_pluralization() {
        let i = Interval::new(1, 2, 1, 0, 0, 30, 500);
        assert_eq!(
            i.for_humans_with(&English),
            "1 year 2 months 1 day 30 seconds 500 ms"
        );
    }

    #[test]
    fn test_for_humans_unknown_locale_falls_back() {
        assert_eq!(Interval::days(2).for_humans("zz-unknown"), "2 days");
    }

    #[test]
    fn test_arithmetic_saturates_at_bounds() {
        let sum = Interval::days(i64::MAX) + Interval::days(1);
        assert_eq!(sum.days, i64::MAX);
        let diff = Interval::hours(i64::MIN) - Interval::hours(1);
        assert_eq!(diff.hours, i64::MIN);
        assert_eq!((-Interval::seconds(i64::MIN)).seconds, i64::MAX);
        assert_eq!(Interval::days(5) - Interval::days(i64::MIN), Interval::days(i64::MAX));
    }

    #[test]
    fn test_to_milliseconds_saturates() {
        assert_eq!(Interval::years(1_000_000_000).to_milliseconds(), i64::MAX);
        assert_eq!(Interval::days(i64::MIN).to_milliseconds(), i64::MIN);
        let mixed = Interval::new(0, 0, i64::MAX, 0, 0, 0, -5);
        assert_eq!(mixed.to_milliseconds(), i64::MAX - 5);
    }

    #[test]
    fn test_from_span_extremes() {
        let max = Interval::from_span(i64::MAX);
        let min = Interval::from_span(i64::MIN);
        assert_eq!(max.milliseconds, 807);
        assert_eq!(min, Interval { milliseconds: 808, ..max });
        assert_eq!(min.to_milliseconds(), i64::MAX);
        assert_eq!(Interval::from_span(0), Interval::ZERO);
    }

    #[test]
    fn test_serde_partial_fields_default_to_zero() {
        let i: Interval = serde_json::from_str(r#"{"days": 3}"#).unwrap();
        assert_eq!(i, Interval::days(3));
    }
}
