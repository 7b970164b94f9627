//! Core type definitions with validation.

use std::fmt;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Format of a calendar date as stored and compared.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of a log timestamp as stored and compared.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A date was not in `YYYY-MM-DD` form.
    #[error("invalid date {value:?}, expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// A timestamp was not in `YYYY-MM-DD HH:MM:SS` form.
    #[error("invalid timestamp {value:?}, expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp { value: String },

    /// An enum tag string did not match any known variant.
    #[error("invalid {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },
}

/// Generates an integer row ID newtype with common trait implementations.
macro_rules! define_row_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw row ID.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw row ID.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_row_id!(
    /// Row identifier of a registered tool.
    ToolId
);

define_row_id!(
    /// Row identifier of an employee.
    EmployeeId
);

define_row_id!(
    /// Row identifier of a borrow or return log entry.
    LogId
);

/// A calendar date in zero-padded `YYYY-MM-DD` form.
///
/// The text form is fixed-width, so ordering the strings orders the dates.
/// Comparisons go through the string directly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(String);

impl CalendarDate {
    /// Parses and validates a `YYYY-MM-DD` string.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "date" });
        }
        // Round-trip through chrono so "2024-1-5" is rejected rather than misordered.
        match NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            Ok(date) if date.format(DATE_FORMAT).to_string() == trimmed => {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(ValidationError::InvalidDate { value }),
        }
    }

    /// Builds a date from a parsed chrono date.
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date.format(DATE_FORMAT).to_string())
    }

    /// Today's date on the local clock.
    pub fn today() -> Self {
        Self::from_naive(Local::now().date_naive())
    }

    /// Returns the date as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        date.0
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CalendarDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A log timestamp in `YYYY-MM-DD HH:MM:SS` form.
///
/// Like [`CalendarDate`], ordering is lexicographic on the fixed-width text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(String);

impl Timestamp {
    /// Parses and validates a `YYYY-MM-DD HH:MM:SS` string.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        match NaiveDateTime::parse_from_str(&value, TIMESTAMP_FORMAT) {
            Ok(parsed) if parsed.format(TIMESTAMP_FORMAT).to_string() == value => Ok(Self(value)),
            _ => Err(ValidationError::InvalidTimestamp { value }),
        }
    }

    /// Builds a timestamp from a parsed chrono datetime, truncating sub-seconds.
    pub fn from_naive(datetime: NaiveDateTime) -> Self {
        Self(datetime.format(TIMESTAMP_FORMAT).to_string())
    }

    /// The current local time.
    pub fn now() -> Self {
        Self::from_naive(Local::now().naive_local())
    }

    /// The calendar date part of this timestamp.
    pub fn date(&self) -> CalendarDate {
        CalendarDate(self.0[..10].to_string())
    }

    /// Returns the timestamp as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Timestamp {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a tool or employee record is still live.
///
/// Records are never hard-deleted so that log entries referencing them
/// always resolve.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Lifecycle {
    #[default]
    Active,
    Deleted {
        at: Timestamp,
    },
}

impl Lifecycle {
    /// Returns true if the record has not been soft-deleted.
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// The deletion time, if any.
    pub const fn deleted_at(&self) -> Option<&Timestamp> {
        match self {
            Self::Active => None,
            Self::Deleted { at } => Some(at),
        }
    }

    /// Builds a lifecycle from a nullable `deleted_at` value.
    pub fn from_deleted_at(deleted_at: Option<Timestamp>) -> Self {
        deleted_at.map_or(Self::Active, |at| Self::Deleted { at })
    }
}

/// Returns `None` for missing or whitespace-only text, otherwise the trimmed text.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
