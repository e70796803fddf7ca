//! Error types for calendar-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatetimeError {
    #[error("Invalid input for Datetime: {0}")]
    InvalidInput(String),

    #[error("Invalid date string: {0}")]
    InvalidDateString(String),

    #[error("Invalid or ambiguous relative date string: {0}")]
    AmbiguousRelativeString(String),

    #[error("Locale not found: {0}")]
    LocaleNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DatetimeError>;
