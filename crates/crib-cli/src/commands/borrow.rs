//! Borrow command: lend a tool to an employee.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use crib_core::{BorrowRequest, Condition, Timestamp, prepare_borrow};

use super::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct BorrowArgs {
    /// Scanned tool number.
    #[arg(long)]
    pub tool: String,
    /// Scanned employee badge number.
    #[arg(long)]
    pub employee: String,
    /// Condition at hand-out: good, for_calibration, calibration_done, damaged.
    #[arg(long)]
    pub condition: Option<Condition>,
    #[arg(long)]
    pub remarks: Option<String>,
    /// Defaults to the configured operator.
    #[arg(long)]
    pub verified_by: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &BorrowArgs, config: &Config) -> Result<()> {
    run_at(writer, args, config, &Timestamp::now())
}

pub fn run_at<W: Write>(
    writer: &mut W,
    args: &BorrowArgs,
    config: &Config,
    now: &Timestamp,
) -> Result<()> {
    let mut db = open_database(config)?;
    let ledger = db.ledger()?;
    let request = BorrowRequest {
        tool_number: args.tool.clone(),
        employee_id_number: args.employee.clone(),
        condition: args.condition,
        remarks: args.remarks.clone(),
        verified_by: args
            .verified_by
            .clone()
            .or_else(|| config.operator().map(str::to_string)),
    };
    let entry = prepare_borrow(&ledger, &request, now)?;
    let id = db.append_log(&entry)?;
    tracing::info!(%id, tool = %entry.tool_number, employee = %entry.employee_id_number, "borrow logged");

    writeln!(
        writer,
        "{} ({}) borrowed by {} at {} [{}]",
        entry.tool_number,
        entry.tool_name,
        entry.employee_id_number,
        entry.timestamp,
        entry.condition.label()
    )?;
    Ok(())
}
