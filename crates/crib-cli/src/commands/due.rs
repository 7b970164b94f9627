//! Due command: the next calibrations coming up.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use crib_core::{CalendarDate, due_soon};

use super::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct DueArgs {
    /// Maximum rows. Defaults to the configured due-soon limit.
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

pub fn run<W: Write>(writer: &mut W, args: &DueArgs, config: &Config) -> Result<()> {
    run_at(writer, args, config, &CalendarDate::today())
}

pub fn run_at<W: Write>(
    writer: &mut W,
    args: &DueArgs,
    config: &Config,
    today: &CalendarDate,
) -> Result<()> {
    let db = open_database(config)?;
    let tools = db.list_tools()?;
    let upcoming = due_soon(&tools, today, args.limit.unwrap_or(config.due_soon_limit));

    if upcoming.is_empty() {
        writeln!(writer, "No upcoming calibrations.")?;
        return Ok(());
    }
    writeln!(writer, "Upcoming calibrations")?;
    for tool in upcoming {
        let due = tool
            .calibrate_due
            .as_ref()
            .map_or("", CalendarDate::as_str);
        writeln!(
            writer,
            "{due}  {:<10}  {}",
            tool.tool_number, tool.equipment_name
        )?;
    }
    Ok(())
}
