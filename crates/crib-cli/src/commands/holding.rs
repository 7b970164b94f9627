//! Holding command: tools an employee currently has out.

use std::io::Write;

use anyhow::{Result, anyhow};
use clap::Args;

use crib_core::tools_held_by;

use super::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct HoldingArgs {
    /// Employee badge number.
    pub id_number: String,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &HoldingArgs, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let ledger = db.ledger()?;
    let employee = ledger
        .employee_by_id_number(&args.id_number)
        .ok_or_else(|| anyhow!("employee not found: {}", args.id_number))?;
    let holdings = tools_held_by(&ledger, employee.id);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&holdings)?)?;
        return Ok(());
    }

    if holdings.is_empty() {
        writeln!(writer, "{} ({}) holds no tools.", employee.name, employee.id_number)?;
        return Ok(());
    }

    writeln!(
        writer,
        "Tools held by {} ({}): {}",
        employee.name,
        employee.id_number,
        holdings.len()
    )?;
    for holding in &holdings {
        write!(
            writer,
            "{:<10}  {:<20}  borrowed {}  [{}]",
            holding.tool.tool_number,
            holding.tool.equipment_name,
            holding.borrow_log.timestamp,
            holding.borrow_log.condition.label()
        )?;
        if holding.outstanding > 1 {
            write!(writer, "  x{}", holding.outstanding)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
