//! Lazy ranges of instants.
//!
//! A [`Period`] walks from `start` to `end` (inclusive) in steps of an
//! [`Interval`]. Nothing is materialized: each call to [`Period::iter`]
//! starts a fresh traversal, and since the bounds and step are immutable
//! every traversal yields the same sequence.
//!
//! When `start` is after `end` the period yields `start` exactly once.
//!
//! A step that never moves past `end` (the zero interval, fields that cancel
//! out, or a negative step) over a non-empty range produces an unbounded
//! sequence. The iterator does
//! not guard against it; bound consumption with [`Iterator::take`].

use std::iter::FusedIterator;

use crate::datetime::Datetime;
use crate::interval::Interval;

#[derive(Debug, Clone)]
pub struct Period {
    start: Datetime,
    end: Datetime,
    interval: Interval,
}

impl Period {
    pub fn new(start: Datetime, end: Datetime, interval: Interval) -> Self {
        if interval.is_zero() && !start.is_after(&end) {
            tracing::warn!(
                start = %start,
                end = %end,
                "Period with a zero interval never advances; bound its consumption"
            );
        }
        Self {
            start,
            end,
            interval,
        }
    }

    /// One-day steps.
    pub fn daily(start: Datetime, end: Datetime) -> Self {
        Self::new(start, end, Interval::days(1))
    }

    pub fn start(&self) -> &Datetime {
        &self.start
    }

    pub fn end(&self) -> &Datetime {
        &self.end
    }

    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    pub fn iter(&self) -> PeriodIter<'_> {
        PeriodIter {
            period: self,
            current: Some(self.start.clone()),
            yielded: false,
        }
    }
}

impl<'a> IntoIterator for &'a Period {
    type Item = Datetime;
    type IntoIter = PeriodIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Traversal state for one pass over a [`Period`].
#[derive(Debug, Clone)]
pub struct PeriodIter<'a> {
    period: &'a Period,
    /// `None` once the traversal is finished.
    current: Option<Datetime>,
    yielded: bool,
}

impl Iterator for PeriodIter<'_> {
    type Item = Datetime;

    fn next(&mut self) -> Option<Datetime> {
        let current = self.current.take()?;
        let end = &self.period.end;

        if current.is_before(end) || current.is_same(end) {
            let next = current.add_interval(&self.period.interval);
            if !next.is_after(end) {
                self.current = Some(next);
            }
            self.yielded = true;
            return Some(current);
        }

        if !self.yielded && self.period.start.is_after(end) {
            self.yielded = true;
            return Some(self.period.start.clone());
        }
        None
    }
}

impl FusedIterator for PeriodIter<'_> {}

// ── Tests ───────────────────────────────────────────────────────────────────
