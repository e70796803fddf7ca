//! Token substitution for `Datetime::format`.
//!
//! Recognized tokens: `YYYY`, `MM`, `DD`, `HH`, `mm`, `ss`, `SSS`. The
//! template is scanned once, left to right, so substituted digits are never
//! rescanned and every token is replaced exactly once. Anything else passes
//! through unchanged.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Tried in order at each position.
const TOKENS: [&str; 7] = ["YYYY", "SSS", "MM", "DD", "HH", "mm", "ss"];

pub(crate) fn render(template: &str, moment: &NaiveDateTime) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut rest = template;

    'scan: while let Some(ch) = rest.chars().next() {
        for token in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(&expand(token, moment));
                rest = tail;
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

fn expand(token: &str, m: &NaiveDateTime) -> String {
    match token {
        "YYYY" => format!("{:04}", m.year()),
        "MM" => format!("{:02}", m.month()),
        "DD" => format!("{:02}", m.day()),
        "HH" => format!("{:02}", m.hour()),
        "mm" => format!("{:02}", m.minute()),
        "ss" => format!("{:02}", m.second()),
        "SSS" => format!("{:03}", m.nanosecond() / 1_000_000),
        _ => token.to_string(),
    }
}

/// ISO 8601 with millisecond precision and a `Z` suffix.
pub(crate) fn iso(moment: &NaiveDateTime) -> String {
    moment.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
