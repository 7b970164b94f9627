//! Tool catalog commands: register, list, calibration date, damage flag, delete.

use std::io::Write;

use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};

use crib_core::types::non_blank;
use crib_core::{CalendarDate, Ledger, Timestamp, Tool, ToolDetails, ToolListMode, list_tools};
use crib_db::NewTool;

use super::{due_label, open_database};
use crate::Config;

#[derive(Debug, Subcommand)]
pub enum ToolAction {
    /// Register a tool.
    Add(AddArgs),
    /// List live tools.
    List(ListArgs),
    /// Set or clear a tool's calibration due date.
    SetDue(SetDueArgs),
    /// Flip a tool between good and damage.
    ToggleDamage(ToolNumberArgs),
    /// Remove a tool from the catalog. Its history stays in the logs.
    Delete(ToolNumberArgs),
    /// Register tools from JSON lines on stdin.
    Import,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Equipment name.
    #[arg(long)]
    pub name: String,
    /// Tool number (barcode). Generated when omitted.
    #[arg(long)]
    pub number: Option<String>,
    /// Calibration due date (YYYY-MM-DD).
    #[arg(long)]
    pub due: Option<CalendarDate>,
    #[command(flatten)]
    pub details: DetailArgs,
}

/// Register metadata with no effect on lending.
#[derive(Debug, Default, Args)]
pub struct DetailArgs {
    #[arg(long)]
    pub no: Option<String>,
    #[arg(long)]
    pub registration_id_number: Option<String>,
    #[arg(long)]
    pub area_process: Option<String>,
    #[arg(long)]
    pub manufacturer: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub serial_number: Option<String>,
    #[arg(long)]
    pub type_of_calibration: Option<String>,
    #[arg(long)]
    pub calibration_range: Option<String>,
    #[arg(long)]
    pub date_of_registration: Option<String>,
    #[arg(long)]
    pub resolution: Option<String>,
    #[arg(long)]
    pub accuracy: Option<String>,
    #[arg(long)]
    pub remarks: Option<String>,
}

impl DetailArgs {
    fn to_details(&self) -> ToolDetails {
        let clean = |value: &Option<String>| non_blank(value.as_deref()).map(str::to_string);
        ToolDetails {
            no: clean(&self.no),
            registration_id_number: clean(&self.registration_id_number),
            area_process: clean(&self.area_process),
            manufacturer: clean(&self.manufacturer),
            model: clean(&self.model),
            serial_number: clean(&self.serial_number),
            type_of_calibration: clean(&self.type_of_calibration),
            calibration_range: clean(&self.calibration_range),
            date_of_registration: clean(&self.date_of_registration),
            resolution: clean(&self.resolution),
            accuracy: clean(&self.accuracy),
            remarks: clean(&self.remarks),
        }
    }
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Which tools to show: all, damage, or calibrate.
    #[arg(long, default_value = "all")]
    pub mode: ToolListMode,
    /// Case-insensitive filter on name, model, number, or due date.
    #[arg(long, short)]
    pub search: Option<String>,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SetDueArgs {
    /// Tool number.
    pub tool_number: String,
    /// New due date (YYYY-MM-DD). Omit to stop tracking calibration.
    pub due: Option<CalendarDate>,
}

#[derive(Debug, Args)]
pub struct ToolNumberArgs {
    /// Tool number.
    pub tool_number: String,
}

pub fn run<W: Write>(writer: &mut W, action: &ToolAction, config: &Config) -> Result<()> {
    run_at(writer, action, config, &Timestamp::now())
}

pub fn run_at<W: Write>(
    writer: &mut W,
    action: &ToolAction,
    config: &Config,
    now: &Timestamp,
) -> Result<()> {
    match action {
        ToolAction::Add(args) => add(writer, args, config, now),
        ToolAction::List(args) => list(writer, args, config, now),
        ToolAction::SetDue(args) => set_due(writer, args, config, now),
        ToolAction::ToggleDamage(args) => toggle_damage(writer, args, config, now),
        ToolAction::Delete(args) => delete(writer, args, config, now),
        ToolAction::Import => super::import::run(writer, config),
    }
}

fn add<W: Write>(writer: &mut W, args: &AddArgs, config: &Config, now: &Timestamp) -> Result<()> {
    let mut db = open_database(config)?;
    let tool = NewTool {
        tool_number: args.number.clone(),
        equipment_name: args.name.clone(),
        calibrate_due: args.due.clone(),
        details: args.details.to_details(),
    };
    let id = db.insert_tool(&tool, now)?;
    let stored = db
        .list_tools()?
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| anyhow!("tool {id} missing after insert"))?;
    writeln!(
        writer,
        "Registered {} ({})",
        stored.tool_number, stored.equipment_name
    )?;
    Ok(())
}

fn list<W: Write>(writer: &mut W, args: &ListArgs, config: &Config, now: &Timestamp) -> Result<()> {
    let db = open_database(config)?;
    let ledger = db.ledger()?;
    let tools = list_tools(
        &ledger,
        args.mode,
        args.search.as_deref().unwrap_or_default(),
        &now.date(),
    );

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&tools)?)?;
        return Ok(());
    }

    writeln!(writer, "{} ({})", args.mode.title(), tools.len())?;
    if tools.is_empty() {
        writeln!(writer, "No tools found.")?;
    }
    for tool in tools {
        writeln!(
            writer,
            "{:<10}  {:<20}  {:<10}  {}",
            tool.tool_number,
            tool.equipment_name,
            due_label(tool.calibrate_due.as_ref()),
            tool.status
        )?;
    }
    Ok(())
}

fn set_due<W: Write>(
    writer: &mut W,
    args: &SetDueArgs,
    config: &Config,
    now: &Timestamp,
) -> Result<()> {
    let mut db = open_database(config)?;
    let tool = find_tool(&db.ledger()?, &args.tool_number)?;
    db.set_calibrate_due(tool.id, args.due.as_ref(), now)?;
    match &args.due {
        Some(due) => writeln!(writer, "{} calibration due {due}", tool.tool_number)?,
        None => writeln!(writer, "{} calibration due cleared", tool.tool_number)?,
    }
    Ok(())
}

fn toggle_damage<W: Write>(
    writer: &mut W,
    args: &ToolNumberArgs,
    config: &Config,
    now: &Timestamp,
) -> Result<()> {
    let mut db = open_database(config)?;
    let tool = find_tool(&db.ledger()?, &args.tool_number)?;
    let status = db.toggle_tool_damage(tool.id, now)?;
    writeln!(writer, "{} is now {status}", tool.tool_number)?;
    Ok(())
}

fn delete<W: Write>(
    writer: &mut W,
    args: &ToolNumberArgs,
    config: &Config,
    now: &Timestamp,
) -> Result<()> {
    let mut db = open_database(config)?;
    let tool = find_tool(&db.ledger()?, &args.tool_number)?;
    db.delete_tool(tool.id, now)?;
    tracing::info!(tool = %tool.tool_number, "tool deleted");
    writeln!(
        writer,
        "Deleted {} ({}). Its history is kept.",
        tool.tool_number, tool.equipment_name
    )?;
    Ok(())
}

fn find_tool(ledger: &Ledger, number: &str) -> Result<Tool> {
    ledger
        .tool_by_number(number)
        .cloned()
        .ok_or_else(|| anyhow!("tool not found: {number}"))
}
