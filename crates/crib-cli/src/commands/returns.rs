//! Return command: take a tool back from the employee holding it.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use crib_core::{Condition, ReturnRequest, Timestamp, prepare_return};

use super::open_database;
use crate::Config;

#[derive(Debug, Args)]
pub struct ReturnArgs {
    /// Scanned employee badge number.
    #[arg(long)]
    pub employee: String,
    /// Tool number being returned.
    #[arg(long)]
    pub tool: String,
    /// Condition on return. `damaged` marks the tool damaged, anything else good.
    #[arg(long)]
    pub condition: Option<Condition>,
    #[arg(long)]
    pub remarks: Option<String>,
    /// Defaults to the configured operator.
    #[arg(long)]
    pub verified_by: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &ReturnArgs, config: &Config) -> Result<()> {
    run_at(writer, args, config, &Timestamp::now())
}

pub fn run_at<W: Write>(
    writer: &mut W,
    args: &ReturnArgs,
    config: &Config,
    now: &Timestamp,
) -> Result<()> {
    let mut db = open_database(config)?;
    let ledger = db.ledger()?;
    let request = ReturnRequest {
        employee_id_number: args.employee.clone(),
        tool_number: args.tool.clone(),
        condition: args.condition,
        remarks: args.remarks.clone(),
        verified_by: args
            .verified_by
            .clone()
            .or_else(|| config.operator().map(str::to_string)),
    };
    let prepared = prepare_return(&ledger, &request, now)?;
    let id = db.record_return(&prepared)?;
    tracing::info!(%id, tool = %prepared.entry.tool_number, status = %prepared.new_status, "return logged");

    let entry = &prepared.entry;
    writeln!(
        writer,
        "{} ({}) returned by {} at {} [{}], status {}",
        entry.tool_number,
        entry.tool_name,
        entry.employee_id_number,
        entry.timestamp,
        entry.condition.label(),
        prepared.new_status
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crib_core::{LogAction, ToolStatus};
    use crib_db::{NewEmployee, NewTool};

    use crate::commands::borrow::{self, BorrowArgs};
    use crate::commands::test_support::{output, temp_config, ts};

    fn seed_with_borrow(config: &Config) {
        let mut db = open_database(config).unwrap();
        let at = ts("2025-01-01 08:00:00");
        db.insert_tool(
            &NewTool {
                tool_number: Some("T-1".to_string()),
                equipment_name: "Caliper".to_string(),
                ..NewTool::default()
            },
            &at,
        )
        .unwrap();
        for (name, id_number) in [("Ana", "E-1"), ("Ben", "E-2")] {
            db.insert_employee(
                &NewEmployee {
                    name: name.to_string(),
                    id_number: id_number.to_string(),
                },
                &at,
            )
            .unwrap();
        }
        drop(db);

        let borrow = BorrowArgs {
            tool: "T-1".to_string(),
            employee: "E-1".to_string(),
            condition: Some(Condition::Good),
            remarks: None,
            verified_by: None,
        };
        borrow::run_at(&mut std::io::sink(), &borrow, config, &ts("2025-01-02 09:00:00")).unwrap();
    }

    fn args(employee: &str, condition: Condition) -> ReturnArgs {
        ReturnArgs {
            employee: employee.to_string(),
            tool: "T-1".to_string(),
            condition: Some(condition),
            remarks: Some("dented jaw".to_string()),
            verified_by: Some("Dana".to_string()),
        }
    }

    #[test]
    fn damaged_return_marks_tool_damaged() {
        let (_temp, config) = temp_config();
        seed_with_borrow(&config);

        let mut buf = Vec::new();
        run_at(&mut buf, &args("E-1", Condition::Damaged), &config, &ts("2025-01-02 17:00:00"))
            .unwrap();
        assert_eq!(
            output(buf),
            "T-1 (Caliper) returned by E-1 at 2025-01-02 17:00:00 [Damaged], status damage\n"
        );

        let db = open_database(&config).unwrap();
        assert_eq!(db.list_tools().unwrap()[0].status, ToolStatus::Damage);
        let logs = db.list_logs().unwrap();
        assert_eq!(logs[0].action, LogAction::Return);
        assert_eq!(logs[0].remarks.as_deref(), Some("dented jaw"));
        assert_eq!(logs[0].verified_by, "Dana");
    }

    #[test]
    fn return_by_someone_else_is_rejected() {
        let (_temp, config) = temp_config();
        seed_with_borrow(&config);

        let mut buf = Vec::new();
        let err = run_at(&mut buf, &args("E-2", Condition::Good), &config, &ts("2025-01-02 17:00:00"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Caliper is not borrowed by E-2");
        assert_eq!(open_database(&config).unwrap().list_logs().unwrap().len(), 1);
    }

    #[test]
    fn second_return_is_rejected() {
        let (_temp, config) = temp_config();
        seed_with_borrow(&config);
        run_at(&mut std::io::sink(), &args("E-1", Condition::Good), &config, &ts("2025-01-02 17:00:00"))
            .unwrap();

        let err = run_at(&mut std::io::sink(), &args("E-1", Condition::Good), &config, &ts("2025-01-02 18:00:00"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Caliper is not borrowed by E-1");
    }
}
