//! Records supplied by the store: tools, employees, and the append-only log.

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, LogAction, ToolStatus};
use crate::types::{CalendarDate, EmployeeId, Lifecycle, LogId, Timestamp, ToolId};

/// Registration metadata carried over from the equipment register.
///
/// None of these fields take part in custody or calibration logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_id_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_process: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_of_calibration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_registration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// A registered piece of calibrated equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub id: ToolId,
    /// Unique human-facing code, also the barcode scan key.
    pub tool_number: String,
    pub equipment_name: String,
    /// Date on or after which the tool may not be lent. `None` means not tracked.
    pub calibrate_due: Option<CalendarDate>,
    pub status: ToolStatus,
    pub lifecycle: Lifecycle,
    #[serde(flatten)]
    pub details: ToolDetails,
}

impl Tool {
    pub const fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }
}

/// A person who can borrow tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    /// Unique badge number, also the barcode scan key.
    pub id_number: String,
    pub lifecycle: Lifecycle,
}

impl Employee {
    pub const fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }
}

/// An immutable custody event.
///
/// Employee and tool identity are denormalized onto the entry so it stays
/// readable after either record is soft-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogId,
    pub action: LogAction,
    pub employee_id: EmployeeId,
    pub employee_id_number: String,
    pub tool_id: ToolId,
    pub tool_name: String,
    pub tool_number: String,
    pub timestamp: Timestamp,
    pub condition: Condition,
    pub verified_by: String,
    /// Borrow remarks on a borrow entry, return remarks on a return entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl LogEntry {
    pub fn is_borrow(&self) -> bool {
        self.action == LogAction::Borrow
    }

    pub fn is_return(&self) -> bool {
        self.action == LogAction::Return
    }
}

/// A log entry that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    pub action: LogAction,
    pub employee_id: EmployeeId,
    pub employee_id_number: String,
    pub tool_id: ToolId,
    pub tool_name: String,
    pub tool_number: String,
    pub timestamp: Timestamp,
    pub condition: Condition,
    pub verified_by: String,
    pub remarks: Option<String>,
}

impl NewLogEntry {
    /// Attaches the store-assigned ID.
    pub fn with_id(self, id: LogId) -> LogEntry {
        LogEntry {
            id,
            action: self.action,
            employee_id: self.employee_id,
            employee_id_number: self.employee_id_number,
            tool_id: self.tool_id,
            tool_name: self.tool_name,
            tool_number: self.tool_number,
            timestamp: self.timestamp,
            condition: self.condition,
            verified_by: self.verified_by,
            remarks: self.remarks,
        }
    }
}

/// A full read of the store, handed to every derived view.
///
/// Tools and employees include soft-deleted records; views decide whether
/// to look at them.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub tools: Vec<Tool>,
    pub employees: Vec<Employee>,
    pub logs: Vec<LogEntry>,
}

impl Ledger {
    /// Live tools only.
    pub fn active_tools(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter().filter(|t| t.is_active())
    }

    /// Live employees only.
    pub fn active_employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.iter().filter(|e| e.is_active())
    }

    /// Finds a live tool by ID.
    pub fn active_tool(&self, id: ToolId) -> Option<&Tool> {
        self.active_tools().find(|t| t.id == id)
    }

    /// Finds a live tool by its scanned number, ignoring ASCII case.
    pub fn tool_by_number(&self, number: &str) -> Option<&Tool> {
        let number = number.trim();
        self.active_tools()
            .find(|t| t.tool_number.eq_ignore_ascii_case(number))
    }

    /// Finds a live employee by scanned badge number, ignoring ASCII case.
    pub fn employee_by_id_number(&self, id_number: &str) -> Option<&Employee> {
        let id_number = id_number.trim();
        self.active_employees()
            .find(|e| e.id_number.eq_ignore_ascii_case(id_number))
    }
}
