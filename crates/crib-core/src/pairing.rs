//! Log pairing: one row per borrow, joined to the return that resolved it.
//!
//! For a borrow `b`, candidate returns share `b`'s tool and employee and have a
//! timestamp strictly after `b`. The earliest candidate is chosen.
//!
//! Each borrow is matched independently, so pairing is not exclusive: one
//! return can be the closest match for two borrows when an employee borrows
//! the same tool twice before returning it. Work is `O(borrows * returns)`.

use serde::Serialize;

use crate::condition::Condition;
use crate::model::LogEntry;
use crate::types::{EmployeeId, LogId, Timestamp, ToolId};

/// A borrow and its matching return, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairedTransaction {
    pub borrow_id: LogId,
    pub return_id: Option<LogId>,
    pub employee_id: EmployeeId,
    pub employee_id_number: String,
    pub tool_id: ToolId,
    pub tool_name: String,
    pub tool_number: String,
    pub borrow_time: Timestamp,
    pub borrow_condition: Condition,
    pub borrow_remarks: String,
    pub return_time: Option<Timestamp>,
    pub return_condition: Option<Condition>,
    pub return_remarks: String,
    /// Verifier of the borrow.
    pub verified_by: String,
}

impl PairedTransaction {
    fn new(borrow: &LogEntry, matched: Option<&LogEntry>) -> Self {
        Self {
            borrow_id: borrow.id,
            return_id: matched.map(|r| r.id),
            employee_id: borrow.employee_id,
            employee_id_number: borrow.employee_id_number.clone(),
            tool_id: borrow.tool_id,
            tool_name: borrow.tool_name.clone(),
            tool_number: borrow.tool_number.clone(),
            borrow_time: borrow.timestamp.clone(),
            borrow_condition: borrow.condition,
            borrow_remarks: borrow.remarks.clone().unwrap_or_default(),
            return_time: matched.map(|r| r.timestamp.clone()),
            return_condition: matched.map(|r| r.condition),
            return_remarks: matched
                .and_then(|r| r.remarks.clone())
                .unwrap_or_default(),
            verified_by: borrow.verified_by.clone(),
        }
    }

    /// Returns true if no return has been matched yet.
    pub const fn is_outstanding(&self) -> bool {
        self.return_id.is_none()
    }
}

/// Finds the earliest return strictly after `borrow` for the same tool and employee.
///
/// Ties on timestamp go to the return encountered first.
pub fn closest_return<'a>(borrow: &LogEntry, returns: &[&'a LogEntry]) -> Option<&'a LogEntry> {
    returns
        .iter()
        .copied()
        .filter(|r| {
            r.tool_id == borrow.tool_id
                && r.employee_id == borrow.employee_id
                && r.timestamp > borrow.timestamp
        })
        .reduce(|earliest, current| {
            if current.timestamp < earliest.timestamp {
                current
            } else {
                earliest
            }
        })
}

/// Pairs every borrow in `logs` with its closest following return.
///
/// Output is sorted by borrow time, newest first. Borrows with equal
/// timestamps keep their relative input order.
pub fn pair_logs(logs: &[LogEntry]) -> Vec<PairedTransaction> {
    let returns: Vec<&LogEntry> = logs.iter().filter(|l| l.is_return()).collect();

    let mut paired: Vec<PairedTransaction> = logs
        .iter()
        .filter(|l| l.is_borrow())
        .map(|borrow| PairedTransaction::new(borrow, closest_return(borrow, &returns)))
        .collect();

    // Stable sort keeps encounter order among equal timestamps.
    paired.sort_by(|a, b| b.borrow_time.cmp(&a.borrow_time));

    tracing::debug!(
        pairs = paired.len(),
        outstanding = paired.iter().filter(|p| p.is_outstanding()).count(),
        "paired log entries"
    );
    paired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{borrow, ret};

    #[test]
    fn earliest_following_return_is_selected() {
        let logs = vec![
            borrow(1, 1, 1, "2024-01-01 09:00:00"),
            ret(2, 1, 1, "2024-01-01 10:30:00"),
            ret(3, 1, 1, "2024-01-01 10:00:00"),
        ];
        let paired = pair_logs(&logs);
        assert_eq!(paired.len(), 1);
        assert_eq!(paired[0].return_id, Some(LogId::new(3)));
        assert_eq!(
            paired[0].return_time.as_ref().map(Timestamp::as_str),
            Some("2024-01-01 10:00:00")
        );
    }

    #[test]
    fn returns_at_or_before_borrow_are_ignored() {
        let logs = vec![
            ret(1, 1, 1, "2024-01-01 08:00:00"),
            ret(2, 1, 1, "2024-01-01 09:00:00"),
            borrow(3, 1, 1, "2024-01-01 09:00:00"),
        ];
        let paired = pair_logs(&logs);
        assert!(paired[0].is_outstanding());
        assert_eq!(paired[0].return_time, None);
        assert_eq!(paired[0].return_condition, None);
        assert_eq!(paired[0].return_remarks, "");
    }

    #[test]
    fn same_second_return_stays_unpaired() {
        let logs = vec![
            borrow(1, 1, 1, "2024-01-01 09:00:00"),
            ret(2, 1, 1, "2024-01-01 09:00:00"),
        ];
        let paired = pair_logs(&logs);
        assert_eq!(paired.len(), 1);
        assert!(paired[0].is_outstanding());
    }

    #[test]
    fn returns_must_match_tool_and_employee() {
        let logs = vec![
            borrow(1, 1, 1, "2024-01-01 09:00:00"),
            ret(2, 2, 1, "2024-01-01 09:30:00"),
            ret(3, 1, 2, "2024-01-01 09:40:00"),
            ret(4, 1, 1, "2024-01-01 09:50:00"),
        ];
        let paired = pair_logs(&logs);
        assert_eq!(paired[0].return_id, Some(LogId::new(4)));
    }

    #[test]
    fn one_return_may_close_two_borrows() {
        // Two borrows of the same tool before a single return: both pair with it.
        let logs = vec![
            borrow(1, 1, 1, "2024-01-01 09:00:00"),
            borrow(2, 1, 1, "2024-01-01 09:10:00"),
            ret(3, 1, 1, "2024-01-01 09:20:00"),
        ];
        let paired = pair_logs(&logs);
        assert_eq!(paired.len(), 2);
        assert!(paired.iter().all(|p| p.return_id == Some(LogId::new(3))));
    }

    #[test]
    fn sorted_newest_borrow_first_with_stable_ties() {
        let logs = vec![
            borrow(1, 1, 1, "2024-01-01 09:00:00"),
            borrow(2, 2, 2, "2024-01-02 09:00:00"),
            borrow(3, 3, 3, "2024-01-01 09:00:00"),
            borrow(4, 4, 4, "2024-01-03 09:00:00"),
        ];
        let ids: Vec<i64> = pair_logs(&logs).iter().map(|p| p.borrow_id.get()).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    #[test]
    fn carries_conditions_and_remarks() {
        let mut b = borrow(1, 1, 1, "2024-01-01 09:00:00");
        b.remarks = Some("for line 3".to_string());
        b.condition = Condition::CalibrationDone;
        let mut r = ret(2, 1, 1, "2024-01-01 12:00:00");
        r.remarks = Some("scratched".to_string());
        r.condition = Condition::Damaged;
        r.verified_by = "Someone else".to_string();

        let paired = pair_logs(&[b, r]);
        let p = &paired[0];
        assert_eq!(p.borrow_condition, Condition::CalibrationDone);
        assert_eq!(p.borrow_remarks, "for line 3");
        assert_eq!(p.return_condition, Some(Condition::Damaged));
        assert_eq!(p.return_remarks, "scratched");
        assert_eq!(p.verified_by, "Inspector");
        assert_eq!(p.employee_id_number, "E1");
        assert_eq!(p.tool_number, "T1");
    }

    #[test]
    fn pairing_is_idempotent() {
        let logs = vec![
            borrow(1, 1, 1, "2024-01-01 09:00:00"),
            ret(2, 1, 1, "2024-01-01 10:00:00"),
            borrow(3, 2, 1, "2024-01-01 11:00:00"),
            borrow(4, 1, 2, "2024-01-01 11:00:00"),
        ];
        assert_eq!(pair_logs(&logs), pair_logs(&logs));
    }

    #[test]
    fn empty_log_yields_no_pairs() {
        assert!(pair_logs(&[]).is_empty());
    }

    #[test]
    fn closest_return_first_wins_on_equal_times() {
        let b = borrow(1, 1, 1, "2024-01-01 09:00:00");
        let r1 = ret(2, 1, 1, "2024-01-01 10:00:00");
        let r2 = ret(3, 1, 1, "2024-01-01 10:00:00");
        let found = closest_return(&b, &[&r1, &r2]).map(|r| r.id.get());
        assert_eq!(found, Some(2));
    }
}
