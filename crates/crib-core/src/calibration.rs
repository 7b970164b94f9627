//! Calibration gate and upcoming-calibration list.
//!
//! The two checks deliberately point in different directions:
//! - [`is_blocked`] refuses lending when the due date is **on or before** today.
//! - [`due_soon`] lists tools whose due date is **today or later**.
//!
//! A tool due today is therefore both blocked and listed as upcoming.

use crate::model::Tool;
use crate::types::CalendarDate;

/// Returns true if the tool may not be lent on `today`.
pub fn is_blocked(tool: &Tool, today: &CalendarDate) -> bool {
    tool.calibrate_due.as_ref().is_some_and(|due| due <= today)
}

/// Returns true if the tool has a due date that has not yet passed.
pub fn is_upcoming(tool: &Tool, today: &CalendarDate) -> bool {
    tool.calibrate_due.as_ref().is_some_and(|due| due >= today)
}

/// Tools with a due date of `today` or later, soonest first, at most `limit`.
///
/// Ties on due date keep their input order.
pub fn due_soon<'a, I>(tools: I, today: &CalendarDate, limit: usize) -> Vec<&'a Tool>
where
    I: IntoIterator<Item = &'a Tool>,
{
    let mut upcoming: Vec<&Tool> = tools
        .into_iter()
        .filter(|tool| is_upcoming(tool, today))
        .collect();
    upcoming.sort_by(|a, b| a.calibrate_due.cmp(&b.calibrate_due));
    upcoming.truncate(limit);
    upcoming
}
