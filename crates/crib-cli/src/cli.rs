//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::borrow::BorrowArgs;
use crate::commands::due::DueArgs;
use crate::commands::employee::EmployeeAction;
use crate::commands::holding::HoldingArgs;
use crate::commands::logs::LogsArgs;
use crate::commands::returns::ReturnArgs;
use crate::commands::status::StatusArgs;
use crate::commands::tool::ToolAction;

/// Tool crib custody tracker.
///
/// Lends calibrated tools to employees by barcode, blocks tools that are due
/// for calibration, and keeps an append-only borrow/return log.
#[derive(Debug, Parser)]
#[command(name = "crib", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage the tool catalog.
    #[command(subcommand)]
    Tool(ToolAction),

    /// Manage employees.
    #[command(subcommand)]
    Employee(EmployeeAction),

    /// Lend a tool to an employee.
    Borrow(BorrowArgs),

    /// Take back a tool the employee currently holds.
    Return(ReturnArgs),

    /// Show the tools an employee currently holds.
    Holding(HoldingArgs),

    /// Show borrows paired with their returns.
    Logs(LogsArgs),

    /// Show upcoming calibrations.
    Due(DueArgs),

    /// Show dashboard counts.
    Status(StatusArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;
    use crib_core::{Condition, ToolListMode};

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_borrow_with_condition() {
        let cli = Cli::parse_from([
            "crib",
            "borrow",
            "--tool",
            "T-1",
            "--employee",
            "E-1",
            "--condition",
            "for_calibration",
        ]);
        let Some(Commands::Borrow(args)) = cli.command else {
            panic!("expected borrow");
        };
        assert_eq!(args.condition, Some(Condition::ForCalibration));
        assert_eq!(args.verified_by, None);
    }

    #[test]
    fn rejects_unknown_condition() {
        let result = Cli::try_parse_from([
            "crib", "return", "--employee", "E-1", "--tool", "T-1", "--condition", "broken",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_tool_list_mode_and_global_flags() {
        let cli = Cli::parse_from(["crib", "tool", "list", "--mode", "damage", "-v"]);
        assert!(cli.verbose);
        let Some(Commands::Tool(ToolAction::List(args))) = cli.command else {
            panic!("expected tool list");
        };
        assert_eq!(args.mode, ToolListMode::Damage);
    }

    #[test]
    fn logs_json_and_csv_conflict() {
        let result = Cli::try_parse_from(["crib", "logs", "--json", "--csv"]);
        assert!(result.is_err());
    }
}
