//! Bulk tool registration from JSON lines.
//!
//! Each non-blank line is one tool object using the same field names as
//! `crib tool list --json`. Bad rows are reported and skipped; the rest are
//! still registered.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crib_core::types::non_blank;
use crib_core::{CalendarDate, Timestamp, ToolDetails};
use crib_db::{Database, NewTool};

use super::open_database;
use crate::Config;

/// Outcome of an import run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// One `Row N: ...` message per skipped row.
    pub errors: Vec<String>,
}

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let mut db = open_database(config)?;
    let summary = import_tools(
        stdin.lock(),
        &mut db,
        &Timestamp::now(),
        chrono::Utc::now().timestamp(),
    )?;
    report(writer, &summary)
}

fn report<W: Write>(writer: &mut W, summary: &ImportSummary) -> Result<()> {
    for error in &summary.errors {
        writeln!(writer, "{error}")?;
    }
    if summary.imported == 0 {
        bail!("No tools were imported");
    }
    writeln!(writer, "Imported {} tools", summary.imported)?;
    Ok(())
}

/// Registers every valid row read from `reader`.
///
/// Rows are numbered from 1 and blank lines still count, so messages line
/// up with the input. Tools without a number get `T-<epoch_secs>-<row>`.
pub fn import_tools<R: BufRead>(
    reader: R,
    db: &mut Database,
    now: &Timestamp,
    epoch_secs: i64,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    for (idx, line) in reader.lines().enumerate() {
        let row = idx + 1;
        let line = line.with_context(|| format!("failed to read line {row}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let tool = match parse_row(trimmed, row, epoch_secs) {
            Ok(tool) => tool,
            Err(message) => {
                summary.errors.push(format!("Row {row}: {message}"));
                continue;
            }
        };
        match db.insert_tool(&tool, now) {
            Ok(_) => summary.imported += 1,
            Err(err) => summary.errors.push(format!("Row {row}: {err}")),
        }
    }
    tracing::info!(
        imported = summary.imported,
        skipped = summary.errors.len(),
        "tool import finished"
    );
    Ok(summary)
}

fn parse_row(line: &str, row: usize, epoch_secs: i64) -> Result<NewTool, String> {
    let parsed: ImportTool =
        serde_json::from_str(line).map_err(|err| format!("invalid JSON: {err}"))?;
    let Some(equipment_name) = non_blank(parsed.equipment_name.as_deref()) else {
        return Err("Equipment Name is required".to_string());
    };
    let calibrate_due = non_blank(parsed.calibrate_due.as_deref())
        .map(CalendarDate::new)
        .transpose()
        .map_err(|err| err.to_string())?;
    let tool_number = non_blank(parsed.tool_number.as_deref())
        .map_or_else(|| format!("T-{epoch_secs}-{row}"), str::to_string);

    Ok(NewTool {
        tool_number: Some(tool_number),
        equipment_name: equipment_name.to_string(),
        calibrate_due,
        details: parsed.details,
    })
}

#[derive(Debug, Deserialize)]
struct ImportTool {
    #[serde(default)]
    tool_number: Option<String>,
    #[serde(default)]
    equipment_name: Option<String>,
    #[serde(default)]
    calibrate_due: Option<String>,
    #[serde(flatten)]
    details: ToolDetails,
}
