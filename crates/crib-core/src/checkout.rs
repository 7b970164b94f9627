//! Pre-write validation for borrow and return submissions.
//!
//! Nothing here writes. A successful check yields the entry the store should
//! append; every failure carries a message suitable for showing the operator.

use thiserror::Error;

use crate::calibration::is_blocked;
use crate::condition::{Condition, LogAction, ToolStatus};
use crate::custody::is_held_by;
use crate::model::{Employee, Ledger, NewLogEntry, Tool};
use crate::types::{CalendarDate, Timestamp, ToolId, non_blank};

/// Verifier recorded when no operator name is known.
pub const DEFAULT_VERIFIER: &str = "User";

/// Why a borrow or return was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// A required field was missing.
    #[error("{0}")]
    Validation(&'static str),

    /// No live tool has the scanned number.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// No live employee has the scanned badge number.
    #[error("employee not found: {0}")]
    EmployeeNotFound(String),

    /// The employee does not currently hold the tool being returned.
    #[error("{tool_name} is not borrowed by {id_number}")]
    NotBorrowed { tool_name: String, id_number: String },

    /// The tool is due (or overdue) for calibration.
    #[error("Blocked: {tool_name} is due for calibration ({due}).")]
    CalibrationBlocked { tool_name: String, due: CalendarDate },
}

/// A borrow as submitted at the counter.
#[derive(Debug, Clone, Default)]
pub struct BorrowRequest {
    pub tool_number: String,
    pub employee_id_number: String,
    pub condition: Option<Condition>,
    pub remarks: Option<String>,
    pub verified_by: Option<String>,
}

/// A return as submitted at the counter.
#[derive(Debug, Clone, Default)]
pub struct ReturnRequest {
    pub employee_id_number: String,
    pub tool_number: String,
    pub condition: Option<Condition>,
    pub remarks: Option<String>,
    pub verified_by: Option<String>,
}

/// A validated return: the log entry plus the tool status it implies.
///
/// The store must apply both together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedReturn {
    pub entry: NewLogEntry,
    pub tool_id: ToolId,
    pub new_status: ToolStatus,
}

/// Validates a borrow against the ledger and the calibration gate.
///
/// Checks run in counter order: both scans present, condition chosen, tool
/// found, employee found, calibration not due.
pub fn prepare_borrow(
    ledger: &Ledger,
    request: &BorrowRequest,
    now: &Timestamp,
) -> Result<NewLogEntry, CheckoutError> {
    let (Some(tool_number), Some(id_number)) = (
        non_blank(Some(request.tool_number.as_str())),
        non_blank(Some(request.employee_id_number.as_str())),
    ) else {
        return Err(CheckoutError::Validation(
            "scan both tool and employee barcodes",
        ));
    };
    let condition = request.condition.ok_or(CheckoutError::Validation(
        "select tool condition before borrowing",
    ))?;

    let tool = ledger
        .tool_by_number(tool_number)
        .ok_or_else(|| CheckoutError::ToolNotFound(tool_number.to_string()))?;
    let employee = ledger
        .employee_by_id_number(id_number)
        .ok_or_else(|| CheckoutError::EmployeeNotFound(id_number.to_string()))?;

    let today = now.date();
    if is_blocked(tool, &today) {
        let due = tool.calibrate_due.clone().unwrap_or(today);
        tracing::info!(tool = %tool.tool_number, %due, "borrow blocked by calibration");
        return Err(CheckoutError::CalibrationBlocked {
            tool_name: tool.equipment_name.clone(),
            due,
        });
    }

    Ok(entry(
        LogAction::Borrow,
        employee,
        tool,
        now,
        condition,
        request.remarks.as_deref(),
        request.verified_by.as_deref(),
    ))
}

/// Validates a return: the employee must currently hold the tool.
pub fn prepare_return(
    ledger: &Ledger,
    request: &ReturnRequest,
    now: &Timestamp,
) -> Result<PreparedReturn, CheckoutError> {
    let id_number = non_blank(Some(request.employee_id_number.as_str()))
        .ok_or(CheckoutError::Validation("scan employee barcode first"))?;
    let employee = ledger
        .employee_by_id_number(id_number)
        .ok_or_else(|| CheckoutError::EmployeeNotFound(id_number.to_string()))?;

    let tool_number = non_blank(Some(request.tool_number.as_str()))
        .ok_or(CheckoutError::Validation("select a tool to return"))?;
    let condition = request.condition.ok_or(CheckoutError::Validation(
        "select tool condition upon return",
    ))?;

    let tool = ledger
        .tool_by_number(tool_number)
        .ok_or_else(|| CheckoutError::ToolNotFound(tool_number.to_string()))?;
    if !is_held_by(ledger, employee.id, tool.id) {
        return Err(CheckoutError::NotBorrowed {
            tool_name: tool.equipment_name.clone(),
            id_number: employee.id_number.clone(),
        });
    }

    Ok(PreparedReturn {
        entry: entry(
            LogAction::Return,
            employee,
            tool,
            now,
            condition,
            request.remarks.as_deref(),
            request.verified_by.as_deref(),
        ),
        tool_id: tool.id,
        new_status: ToolStatus::after_return(condition),
    })
}

fn entry(
    action: LogAction,
    employee: &Employee,
    tool: &Tool,
    now: &Timestamp,
    condition: Condition,
    remarks: Option<&str>,
    verified_by: Option<&str>,
) -> NewLogEntry {
    NewLogEntry {
        action,
        employee_id: employee.id,
        employee_id_number: employee.id_number.clone(),
        tool_id: tool.id,
        tool_name: tool.equipment_name.clone(),
        tool_number: tool.tool_number.clone(),
        timestamp: now.clone(),
        condition,
        verified_by: non_blank(verified_by)
            .unwrap_or(DEFAULT_VERIFIER)
            .to_string(),
        remarks: non_blank(remarks).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{borrow, deleted, employee, tool};
    use crate::types::{EmployeeId, LogId};

    fn now() -> Timestamp {
        Timestamp::new("2024-01-01 14:30:00").unwrap()
    }

    fn ledger() -> Ledger {
        Ledger {
            tools: vec![
                tool(1, "T-100", "Torque wrench", Some("2024-06-01")),
                tool(2, "T-200", "Caliper", Some("2024-01-01")),
                tool(3, "T-300", "Tape", None),
                deleted(tool(4, "T-400", "Scrapped gauge", None)),
            ],
            employees: vec![employee(1, "e1"), employee(2, "e2")],
            logs: vec![borrow(1, 1, 3, "2023-12-31 08:00:00")],
        }
    }

    fn borrow_request(tool_number: &str, id_number: &str) -> BorrowRequest {
        BorrowRequest {
            tool_number: tool_number.to_string(),
            employee_id_number: id_number.to_string(),
            condition: Some(Condition::Good),
            remarks: None,
            verified_by: Some("Dana".to_string()),
        }
    }

    fn return_request(id_number: &str, tool_number: &str) -> ReturnRequest {
        ReturnRequest {
            employee_id_number: id_number.to_string(),
            tool_number: tool_number.to_string(),
            condition: Some(Condition::Good),
            remarks: None,
            verified_by: None,
        }
    }

    #[test]
    fn borrow_builds_entry_from_live_records() {
        let mut request = borrow_request("t-100", "E1");
        request.remarks = Some("  line 4  ".to_string());
        let entry = prepare_borrow(&ledger(), &request, &now()).unwrap();

        assert_eq!(entry.action, LogAction::Borrow);
        assert_eq!(entry.tool_id, ToolId::new(1));
        assert_eq!(entry.tool_number, "T-100");
        assert_eq!(entry.tool_name, "Torque wrench");
        assert_eq!(entry.employee_id, EmployeeId::new(1));
        assert_eq!(entry.employee_id_number, "e1");
        assert_eq!(entry.timestamp, now());
        assert_eq!(entry.verified_by, "Dana");
        assert_eq!(entry.remarks.as_deref(), Some("line 4"));
    }

    #[test]
    fn borrow_requires_both_scans() {
        let err = prepare_borrow(&ledger(), &borrow_request(" ", "e1"), &now()).unwrap_err();
        assert_eq!(err.to_string(), "scan both tool and employee barcodes");
        let err = prepare_borrow(&ledger(), &borrow_request("T-100", ""), &now()).unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
    }

    #[test]
    fn borrow_requires_condition() {
        let mut request = borrow_request("T-100", "e1");
        request.condition = None;
        let err = prepare_borrow(&ledger(), &request, &now()).unwrap_err();
        assert_eq!(err.to_string(), "select tool condition before borrowing");
    }

    #[test]
    fn borrow_rejects_unknown_or_deleted_records() {
        let err = prepare_borrow(&ledger(), &borrow_request("T-400", "e1"), &now()).unwrap_err();
        assert_eq!(err, CheckoutError::ToolNotFound("T-400".to_string()));
        let err = prepare_borrow(&ledger(), &borrow_request("T-100", "e9"), &now()).unwrap_err();
        assert_eq!(err, CheckoutError::EmployeeNotFound("e9".to_string()));
    }

    #[test]
    fn borrow_blocked_on_due_date_names_tool_and_date() {
        let err = prepare_borrow(&ledger(), &borrow_request("T-200", "e2"), &now()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Blocked: Caliper is due for calibration (2024-01-01)."
        );
    }

    #[test]
    fn borrow_without_verifier_uses_default() {
        let mut request = borrow_request("T-300", "e2");
        request.verified_by = Some("   ".to_string());
        let entry = prepare_borrow(&ledger(), &request, &now()).unwrap();
        assert_eq!(entry.verified_by, DEFAULT_VERIFIER);
        assert_eq!(entry.remarks, None);
    }

    #[test]
    fn return_of_held_tool_sets_status_from_condition() {
        let mut request = return_request("e1", "T-300");
        request.condition = Some(Condition::Damaged);
        request.remarks = Some("cracked".to_string());
        let prepared = prepare_return(&ledger(), &request, &now()).unwrap();

        assert_eq!(prepared.entry.action, LogAction::Return);
        assert_eq!(prepared.tool_id, ToolId::new(3));
        assert_eq!(prepared.new_status, ToolStatus::Damage);
        assert_eq!(prepared.entry.remarks.as_deref(), Some("cracked"));
        assert_eq!(prepared.entry.verified_by, DEFAULT_VERIFIER);
    }

    #[test]
    fn return_requires_employee_first() {
        let err = prepare_return(&ledger(), &return_request("", "T-300"), &now()).unwrap_err();
        assert_eq!(err.to_string(), "scan employee barcode first");
    }

    #[test]
    fn return_requires_condition() {
        let mut request = return_request("e1", "T-300");
        request.condition = None;
        let err = prepare_return(&ledger(), &request, &now()).unwrap_err();
        assert_eq!(err.to_string(), "select tool condition upon return");
    }

    #[test]
    fn return_of_tool_not_held_is_rejected() {
        let err = prepare_return(&ledger(), &return_request("e2", "T-300"), &now()).unwrap_err();
        assert_eq!(err.to_string(), "Tape is not borrowed by e2");
    }

    #[test]
    fn return_allowed_even_when_calibration_due() {
        let mut ledger = ledger();
        ledger.logs.push(borrow(2, 2, 2, "2023-12-01 08:00:00"));
        let prepared = prepare_return(&ledger, &return_request("e2", "T-200"), &now()).unwrap();
        assert_eq!(prepared.entry.with_id(LogId::new(3)).tool_number, "T-200");
    }
}
