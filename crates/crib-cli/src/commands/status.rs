//! Status command: dashboard counts.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use crib_core::{CalendarDate, dashboard_stats};

use super::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &StatusArgs, config: &Config) -> Result<()> {
    run_at(writer, args, config, &CalendarDate::today())
}

pub fn run_at<W: Write>(
    writer: &mut W,
    args: &StatusArgs,
    config: &Config,
    today: &CalendarDate,
) -> Result<()> {
    let db = open_database(config)?;
    let ledger = db.ledger()?;
    let stats = dashboard_stats(&ledger, today);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&stats)?)?;
        return Ok(());
    }

    writeln!(writer, "Tool crib status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;
    writeln!(writer, "Total tools: {}", stats.total_tools)?;
    writeln!(writer, "Damaged: {}", stats.damaged_tools)?;
    writeln!(writer, "Calibration upcoming: {}", stats.calibration_upcoming)?;
    writeln!(writer, "Tools out: {}", stats.tools_out)?;
    Ok(())
}
