//! Employee directory commands.

use std::io::Write;

use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};

use crib_core::{Timestamp, search_employees};
use crib_db::NewEmployee;

use super::open_database;
use crate::Config;

#[derive(Debug, Subcommand)]
pub enum EmployeeAction {
    /// Add an employee.
    Add(AddArgs),
    /// List live employees.
    List(ListArgs),
    /// Remove an employee. Their borrow history stays in the logs.
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Full name.
    #[arg(long)]
    pub name: String,
    /// Badge number printed on the employee barcode.
    #[arg(long)]
    pub id_number: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive filter on name or badge number.
    #[arg(long, short)]
    pub search: Option<String>,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Badge number.
    pub id_number: String,
}

pub fn run<W: Write>(writer: &mut W, action: &EmployeeAction, config: &Config) -> Result<()> {
    run_at(writer, action, config, &Timestamp::now())
}

pub fn run_at<W: Write>(
    writer: &mut W,
    action: &EmployeeAction,
    config: &Config,
    now: &Timestamp,
) -> Result<()> {
    let mut db = open_database(config)?;
    match action {
        EmployeeAction::Add(args) => {
            let employee = NewEmployee {
                name: args.name.clone(),
                id_number: args.id_number.clone(),
            };
            db.insert_employee(&employee, now)?;
            writeln!(
                writer,
                "Added {} ({})",
                employee.name.trim(),
                employee.id_number.trim()
            )?;
        }
        EmployeeAction::List(args) => {
            let ledger = db.ledger()?;
            let employees =
                search_employees(&ledger, args.search.as_deref().unwrap_or_default());
            if args.json {
                writeln!(writer, "{}", serde_json::to_string_pretty(&employees)?)?;
                return Ok(());
            }
            writeln!(writer, "Employees ({})", employees.len())?;
            if employees.is_empty() {
                writeln!(writer, "No employees found.")?;
            }
            for employee in employees {
                writeln!(writer, "{:<12}  {}", employee.id_number, employee.name)?;
            }
        }
        EmployeeAction::Delete(args) => {
            let ledger = db.ledger()?;
            let employee = ledger
                .employee_by_id_number(&args.id_number)
                .ok_or_else(|| anyhow!("employee not found: {}", args.id_number))?;
            db.delete_employee(employee.id, now)?;
            tracing::info!(id_number = %employee.id_number, "employee deleted");
            writeln!(
                writer,
                "Deleted {} ({}). Their borrow history is kept.",
                employee.name, employee.id_number
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::commands::test_support::{output, temp_config, ts};

    fn add(name: &str, id_number: &str) -> EmployeeAction {
        EmployeeAction::Add(AddArgs {
            name: name.to_string(),
            id_number: id_number.to_string(),
        })
    }

    fn list(search: Option<&str>) -> EmployeeAction {
        EmployeeAction::List(ListArgs {
            search: search.map(str::to_string),
            json: false,
        })
    }

    fn exec(action: &EmployeeAction, config: &Config) -> Result<String> {
        let mut buf = Vec::new();
        run_at(&mut buf, action, config, &ts("2025-01-15 09:00:00"))?;
        Ok(output(buf))
    }

    #[test]
    fn add_list_and_search() {
        let (_temp, config) = temp_config();
        assert_eq!(
            exec(&add(" Ana Reyes ", "E-100"), &config).unwrap(),
            "Added Ana Reyes (E-100)\n"
        );
        exec(&add("Ben Ota", "E-200"), &config).unwrap();

        assert_snapshot!(exec(&list(None), &config).unwrap(), @r"
        Employees (2)
        E-100         Ana Reyes
        E-200         Ben Ota
        ");
        assert_snapshot!(exec(&list(Some("ota")), &config).unwrap(), @r"
        Employees (1)
        E-200         Ben Ota
        ");
    }

    #[test]
    fn duplicate_badge_rejected() {
        let (_temp, config) = temp_config();
        exec(&add("Ana", "E-100"), &config).unwrap();
        let err = exec(&add("Impostor", "E-100"), &config).unwrap_err();
        assert_eq!(err.to_string(), "employee ID already exists: E-100");
    }

    #[test]
    fn delete_hides_employee_and_frees_badge() {
        let (_temp, config) = temp_config();
        exec(&add("Ana", "E-100"), &config).unwrap();
        let deleted = exec(
            &EmployeeAction::Delete(DeleteArgs {
                id_number: "e-100".to_string(),
            }),
            &config,
        )
        .unwrap();
        assert_eq!(deleted, "Deleted Ana (E-100). Their borrow history is kept.\n");
        assert_eq!(
            exec(&list(None), &config).unwrap(),
            "Employees (0)\nNo employees found.\n"
        );
        exec(&add("New Ana", "E-100"), &config).unwrap();
    }

    #[test]
    fn list_json() {
        let (_temp, config) = temp_config();
        exec(&add("Ana", "E-100"), &config).unwrap();
        let json = exec(
            &EmployeeAction::List(ListArgs {
                search: None,
                json: true,
            }),
            &config,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["id_number"], "E-100");
        assert_eq!(value[0]["name"], "Ana");
    }
}
