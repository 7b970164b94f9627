//! Tool and employee listings for the dashboard and lookup screens.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::calibration::is_upcoming;
use crate::condition::ToolStatus;
use crate::custody::tools_out;
use crate::model::{Employee, Ledger, Tool};
use crate::search::text_matches;
use crate::types::{CalendarDate, ValidationError};

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_tools: usize,
    pub damaged_tools: usize,
    pub calibration_upcoming: usize,
    pub tools_out: usize,
}

pub fn dashboard_stats(ledger: &Ledger, today: &CalendarDate) -> DashboardStats {
    let mut stats = DashboardStats {
        total_tools: 0,
        damaged_tools: 0,
        calibration_upcoming: 0,
        tools_out: tools_out(ledger),
    };
    for tool in ledger.active_tools() {
        stats.total_tools += 1;
        if tool.status == ToolStatus::Damage {
            stats.damaged_tools += 1;
        }
        if is_upcoming(tool, today) {
            stats.calibration_upcoming += 1;
        }
    }
    stats
}

/// Which subset of tools a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolListMode {
    #[default]
    All,
    Damage,
    Calibrate,
}

impl ToolListMode {
    pub const fn title(self) -> &'static str {
        match self {
            Self::All => "All Tools",
            Self::Damage => "Damaged Tools",
            Self::Calibrate => "Calibration Due (Today Onwards)",
        }
    }

    fn includes(self, tool: &Tool, today: &CalendarDate) -> bool {
        match self {
            Self::All => true,
            Self::Damage => tool.status == ToolStatus::Damage,
            Self::Calibrate => is_upcoming(tool, today),
        }
    }
}

impl fmt::Display for ToolListMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::Damage => "damage",
            Self::Calibrate => "calibrate",
        };
        f.write_str(s)
    }
}

impl FromStr for ToolListMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "damage" => Ok(Self::Damage),
            "calibrate" => Ok(Self::Calibrate),
            _ => Err(ValidationError::UnknownVariant {
                field: "tool list mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Live tools in `mode` matching `query` on name, model, number, or due date.
pub fn list_tools<'a>(
    ledger: &'a Ledger,
    mode: ToolListMode,
    query: &str,
    today: &CalendarDate,
) -> Vec<&'a Tool> {
    ledger
        .active_tools()
        .filter(|tool| mode.includes(tool, today))
        .filter(|tool| {
            text_matches(
                query,
                [
                    Some(tool.equipment_name.as_str()),
                    tool.details.model.as_deref(),
                    Some(tool.tool_number.as_str()),
                    tool.calibrate_due.as_ref().map(CalendarDate::as_str),
                ],
            )
        })
        .collect()
}

/// Live employees matching `query` on name or badge number.
pub fn search_employees<'a>(ledger: &'a Ledger, query: &str) -> Vec<&'a Employee> {
    ledger
        .active_employees()
        .filter(|e| text_matches(query, [Some(e.name.as_str()), Some(e.id_number.as_str())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{borrow, deleted, employee, ret, tool};

    fn ledger() -> Ledger {
        let mut damaged = tool(2, "T-2", "Caliper", Some("2024-02-01"));
        damaged.status = ToolStatus::Damage;
        let mut modeled = tool(3, "T-3", "Micrometer", Some("2023-12-01"));
        modeled.details.model = Some("Mitutoyo 293".to_string());
        let mut scrapped = deleted(tool(4, "T-4", "Gauge", Some("2024-05-01")));
        scrapped.status = ToolStatus::Damage;

        Ledger {
            tools: vec![tool(1, "T-1", "Torque wrench", None), damaged, modeled, scrapped],
            employees: vec![employee(1, "A-1"), employee(2, "B-2")],
            logs: vec![
                borrow(1, 1, 1, "2024-01-01 09:00:00"),
                borrow(2, 2, 3, "2024-01-01 09:05:00"),
                ret(3, 2, 3, "2024-01-01 10:00:00"),
                borrow(4, 2, 4, "2024-01-01 11:00:00"),
            ],
        }
    }

    fn today() -> CalendarDate {
        CalendarDate::new("2024-01-15").unwrap()
    }

    #[test]
    fn stats_count_live_tools_only() {
        let stats = dashboard_stats(&ledger(), &today());
        assert_eq!(
            stats,
            DashboardStats {
                total_tools: 3,
                damaged_tools: 1,
                calibration_upcoming: 1,
                tools_out: 1,
            }
        );
    }

    #[test]
    fn mode_filters() {
        let ledger = ledger();
        let ids = |mode| -> Vec<i64> {
            list_tools(&ledger, mode, "", &today())
                .iter()
                .map(|t| t.id.get())
                .collect()
        };
        assert_eq!(ids(ToolListMode::All), vec![1, 2, 3]);
        assert_eq!(ids(ToolListMode::Damage), vec![2]);
        assert_eq!(ids(ToolListMode::Calibrate), vec![2]);
    }

    #[test]
    fn tool_search_covers_model_and_due_date() {
        let ledger = ledger();
        let found = list_tools(&ledger, ToolListMode::All, "mitutoyo", &today());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tool_number, "T-3");

        let found = list_tools(&ledger, ToolListMode::All, "2024-02", &today());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tool_number, "T-2");
    }

    #[test]
    fn employee_search_matches_name_or_badge() {
        let ledger = ledger();
        assert_eq!(search_employees(&ledger, "b-2").len(), 1);
        assert_eq!(search_employees(&ledger, "employee").len(), 2);
        assert_eq!(search_employees(&ledger, "").len(), 2);
    }

    #[test]
    fn list_mode_parse_and_titles() {
        assert_eq!("calibrate".parse::<ToolListMode>().unwrap(), ToolListMode::Calibrate);
        assert!("broken".parse::<ToolListMode>().is_err());
        assert_eq!(ToolListMode::Damage.title(), "Damaged Tools");
        assert_eq!(ToolListMode::All.to_string(), "all");
    }
}
