//! Core domain logic for the tool crib.
//!
//! Every view here is a pure function of an explicit [`Ledger`] snapshot:
//! - Custody: which tools an employee currently holds
//! - Pairing: joining each borrow to the return that resolved it
//! - Calibration: the lending gate and the upcoming-calibration list
//! - Checkout: validation that runs before anything is written

pub mod calibration;
pub mod catalog;
pub mod checkout;
pub mod condition;
pub mod custody;
pub mod model;
pub mod pairing;
pub mod report;
pub mod search;
pub mod types;

pub use calibration::{due_soon, is_blocked};
pub use catalog::{DashboardStats, ToolListMode, dashboard_stats, list_tools, search_employees};
pub use checkout::{
    BorrowRequest, CheckoutError, PreparedReturn, ReturnRequest, prepare_borrow, prepare_return,
};
pub use condition::{Condition, LogAction, ToolStatus};
pub use custody::{Holding, tools_held_by};
pub use model::{Employee, Ledger, LogEntry, NewLogEntry, Tool, ToolDetails};
pub use pairing::{PairedTransaction, pair_logs};
pub use report::{ReportRow, to_csv};
pub use search::{filter_transactions, matches_transaction};
pub use types::{CalendarDate, EmployeeId, Lifecycle, LogId, Timestamp, ToolId, ValidationError};
