//! Custody reconciliation.
//!
//! Who holds what is never stored. It is derived from the full log stream
//! every time it is asked for.
//!
//! # Algorithm
//!
//! 1. Restrict the log to one employee and group entries by tool.
//! 2. Count borrows `B` and returns `R` per tool, remembering the latest borrow.
//! 3. A tool is held iff `B > R` and a borrow exists.
//!
//! Only the latest borrow is surfaced per tool. When an employee has more
//! than one outstanding borrow of the same tool, the older ones are folded
//! into [`Holding::outstanding`] rather than listed individually.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Ledger, LogEntry, Tool};
use crate::types::{EmployeeId, ToolId};

/// A tool currently in an employee's possession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holding<'a> {
    pub tool: &'a Tool,
    /// The most recent borrow entry for this tool by this employee.
    pub borrow_log: &'a LogEntry,
    /// `borrows - returns` for this employee and tool. Always at least 1.
    pub outstanding: usize,
}

#[derive(Debug, Default)]
struct Tally<'a> {
    borrows: usize,
    returns: usize,
    latest_borrow: Option<&'a LogEntry>,
}

impl<'a> Tally<'a> {
    fn record(&mut self, entry: &'a LogEntry) {
        if entry.is_return() {
            self.returns += 1;
            return;
        }
        self.borrows += 1;
        let newer = self.latest_borrow.is_none_or(|latest| {
            (&entry.timestamp, entry.id) > (&latest.timestamp, latest.id)
        });
        if newer {
            self.latest_borrow = Some(entry);
        }
    }
}

/// Returns the tools an employee currently holds, each with its latest borrow.
///
/// Tools are listed in the order they first appear in `ledger.logs`. Tools
/// that have been soft-deleted (or never existed) are dropped silently.
pub fn tools_held_by(ledger: &Ledger, employee_id: EmployeeId) -> Vec<Holding<'_>> {
    let mut order: Vec<ToolId> = Vec::new();
    let mut tallies: HashMap<ToolId, Tally<'_>> = HashMap::new();

    for entry in ledger.logs.iter().filter(|l| l.employee_id == employee_id) {
        tallies
            .entry(entry.tool_id)
            .or_insert_with(|| {
                order.push(entry.tool_id);
                Tally::default()
            })
            .record(entry);
    }

    let mut holdings = Vec::new();
    for tool_id in order {
        let Some(tally) = tallies.remove(&tool_id) else {
            continue;
        };
        if tally.returns > tally.borrows {
            tracing::warn!(
                %employee_id,
                %tool_id,
                borrows = tally.borrows,
                returns = tally.returns,
                "more returns than borrows in log"
            );
        }
        if tally.borrows <= tally.returns {
            continue;
        }
        let Some(borrow_log) = tally.latest_borrow else {
            continue;
        };
        let Some(tool) = ledger.active_tool(tool_id) else {
            tracing::debug!(%tool_id, "skipping held tool missing from live collection");
            continue;
        };
        holdings.push(Holding {
            tool,
            borrow_log,
            outstanding: tally.borrows - tally.returns,
        });
    }
    holdings
}

/// Returns true if the employee currently holds the tool.
pub fn is_held_by(ledger: &Ledger, employee_id: EmployeeId, tool_id: ToolId) -> bool {
    tools_held_by(ledger, employee_id)
        .iter()
        .any(|h| h.tool.id == tool_id)
}

/// Computes `borrows - returns` for every employee/tool pair in the log.
///
/// Negative balances indicate a return with no prior borrow, which the
/// store does not prevent.
pub fn outstanding_balances(logs: &[LogEntry]) -> HashMap<(EmployeeId, ToolId), i64> {
    let mut balances: HashMap<(EmployeeId, ToolId), i64> = HashMap::new();
    for entry in logs {
        let delta = if entry.is_borrow() { 1 } else { -1 };
        *balances.entry((entry.employee_id, entry.tool_id)).or_default() += delta;
    }
    balances
}

/// Number of live tools out on loan across all employees.
///
/// Balances against soft-deleted tools stay in the log but are not counted.
pub fn tools_out(ledger: &Ledger) -> usize {
    outstanding_balances(&ledger.logs)
        .into_iter()
        .filter(|((_, tool_id), balance)| *balance > 0 && ledger.active_tool(*tool_id).is_some())
        .count()
}
