//! Flat report rows for export.

use serde::Serialize;

use crate::pairing::PairedTransaction;

/// Column names, in export order.
pub const REPORT_COLUMNS: [&str; 10] = [
    "employee_id",
    "tool",
    "tool_number",
    "borrow_time",
    "borrow_status",
    "borrow_remarks",
    "return_time",
    "return_status",
    "return_remarks",
    "verified_by",
];

/// One exported line: a paired transaction with labels resolved and blanks filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub employee_id: String,
    pub tool: String,
    pub tool_number: String,
    pub borrow_time: String,
    pub borrow_status: String,
    pub borrow_remarks: String,
    pub return_time: String,
    pub return_status: String,
    pub return_remarks: String,
    pub verified_by: String,
}

impl ReportRow {
    fn cells(&self) -> [&str; 10] {
        [
            &self.employee_id,
            &self.tool,
            &self.tool_number,
            &self.borrow_time,
            &self.borrow_status,
            &self.borrow_remarks,
            &self.return_time,
            &self.return_status,
            &self.return_remarks,
            &self.verified_by,
        ]
    }
}

impl From<&PairedTransaction> for ReportRow {
    fn from(pair: &PairedTransaction) -> Self {
        Self {
            employee_id: pair.employee_id_number.clone(),
            tool: pair.tool_name.clone(),
            tool_number: pair.tool_number.clone(),
            borrow_time: pair.borrow_time.to_string(),
            borrow_status: pair.borrow_condition.label().to_string(),
            borrow_remarks: pair.borrow_remarks.clone(),
            return_time: pair
                .return_time
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            return_status: pair
                .return_condition
                .map(|c| c.label().to_string())
                .unwrap_or_default(),
            return_remarks: pair.return_remarks.clone(),
            verified_by: pair.verified_by.clone(),
        }
    }
}

/// Renders rows as CSV with every cell quoted.
///
/// Returns an empty string when there are no rows.
pub fn to_csv(rows: &[ReportRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(REPORT_COLUMNS.join(","));
    for row in rows {
        let cells: Vec<String> = row.cells().iter().map(|c| quote(c)).collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}
