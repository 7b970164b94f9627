//! Logs command: borrows joined to their returns, newest first.
//!
//! The same paired view backs the dashboard feed, the borrower lookup, and
//! the CSV report, and every one of them filters through one search predicate.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use crib_core::{PairedTransaction, ReportRow, filter_transactions, pair_logs, to_csv};

use super::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Case-insensitive filter on badge, tool name or number, or times.
    #[arg(long, short)]
    pub search: Option<String>,
    /// Maximum rows. Defaults to the configured recent-logs limit, unlimited for CSV.
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
    /// Output as JSON.
    #[arg(long, conflicts_with = "csv")]
    pub json: bool,
    /// Output as CSV report.
    #[arg(long)]
    pub csv: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &LogsArgs, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let logs = db.list_logs()?;
    let pairs = pair_logs(&logs);
    let mut shown = filter_transactions(&pairs, args.search.as_deref().unwrap_or_default());

    let limit = args
        .limit
        .or_else(|| (!args.csv).then_some(config.recent_logs_limit));
    if let Some(limit) = limit {
        shown.truncate(limit);
    }

    if args.csv {
        let rows: Vec<ReportRow> = shown.into_iter().map(ReportRow::from).collect();
        let csv = to_csv(&rows);
        if !csv.is_empty() {
            writeln!(writer, "{csv}")?;
        }
        return Ok(());
    }

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&shown)?)?;
        return Ok(());
    }

    writeln!(writer, "Transactions ({})", shown.len())?;
    if shown.is_empty() {
        writeln!(writer, "No transactions found.")?;
    }
    for pair in shown {
        writeln!(writer, "{}", format_pair(pair))?;
    }
    Ok(())
}

fn format_pair(pair: &PairedTransaction) -> String {
    let returned = match (&pair.return_time, pair.return_condition) {
        (Some(time), Some(condition)) => format!("{time}  {}", condition.label()),
        _ => "OUT".to_string(),
    };
    format!(
        "{}  {:<10}  {:<10}  {:<20}  {:<16}  {}",
        pair.borrow_time,
        pair.employee_id_number,
        pair.tool_number,
        pair.tool_name,
        pair.borrow_condition.label(),
        returned
    )
}
