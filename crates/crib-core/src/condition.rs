//! Tag enums shared by storage and presentation: condition, status, action.
//!
//! Each enum's `as_str` is the single source of truth for the stored string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Condition of a tool as recorded on a borrow or return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Good,
    ForCalibration,
    CalibrationDone,
    Damaged,
}

impl Condition {
    pub const ALL: [Self; 4] = [
        Self::Good,
        Self::ForCalibration,
        Self::CalibrationDone,
        Self::Damaged,
    ];

    /// String representation for database storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::ForCalibration => "for_calibration",
            Self::CalibrationDone => "calibration_done",
            Self::Damaged => "damaged",
        }
    }

    /// Human-facing label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::ForCalibration => "For Calibration",
            Self::CalibrationDone => "Calibration Done",
            Self::Damaged => "Damaged",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(Self::Good),
            "for_calibration" => Ok(Self::ForCalibration),
            "calibration_done" => Ok(Self::CalibrationDone),
            "damaged" => Ok(Self::Damaged),
            _ => Err(ValidationError::UnknownVariant {
                field: "condition",
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Serviceability of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    #[default]
    Good,
    Damage,
}

impl ToolStatus {
    /// String representation for database storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Damage => "damage",
        }
    }

    /// Status a tool takes on after being returned in `condition`.
    pub const fn after_return(condition: Condition) -> Self {
        match condition {
            Condition::Damaged => Self::Damage,
            Condition::Good | Condition::ForCalibration | Condition::CalibrationDone => Self::Good,
        }
    }

    /// The status flipped by the damage toggle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Good => Self::Damage,
            Self::Damage => Self::Good,
        }
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(Self::Good),
            "damage" => Ok(Self::Damage),
            _ => Err(ValidationError::UnknownVariant {
                field: "tool status",
                value: s.to_string(),
            }),
        }
    }
}

/// Direction of a custody transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Borrow,
    Return,
}

impl LogAction {
    /// String representation for database storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Borrow => "borrow",
            Self::Return => "return",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrow" => Ok(Self::Borrow),
            "return" => Ok(Self::Return),
            _ => Err(ValidationError::UnknownVariant {
                field: "log action",
                value: s.to_string(),
            }),
        }
    }
}
