//! Storage layer for the tool crib.
//!
//! Provides persistence for tools, employees, and the custody log using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Text dates
//!
//! Calibration due dates are stored as `YYYY-MM-DD` and log timestamps as
//! `YYYY-MM-DD HH:MM:SS`, both zero-padded. Lexicographic ordering of these
//! columns matches chronological ordering, so `ORDER BY timestamp` is correct.
//!
//! ## Soft deletes
//!
//! Tools and employees are never removed. `deleted_at` is set instead and
//! surfaces as [`Lifecycle::Deleted`]. Log rows keep pointing at the original
//! row forever.
//!
//! ## Append-only log
//!
//! Triggers abort any `UPDATE` or `DELETE` on `logs`. Custody is derived
//! from the full history, so rewriting history would silently change it.

use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

use crib_core::types::non_blank;
use crib_core::{
    CalendarDate, Condition, Employee, EmployeeId, Ledger, Lifecycle, LogAction, LogEntry, LogId,
    NewLogEntry, PreparedReturn, Timestamp, Tool, ToolDetails, ToolId, ToolStatus,
    ValidationError,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Input rejected before writing.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A live tool already uses this number.
    #[error("tool number already registered: {0}")]
    DuplicateToolNumber(String),
    /// A live employee already uses this badge number.
    #[error("employee ID already exists: {0}")]
    DuplicateEmployee(String),
    /// No live tool with this ID.
    #[error("tool not found: {0}")]
    ToolNotFound(ToolId),
    /// No live employee with this ID.
    #[error("employee not found: {0}")]
    EmployeeNotFound(EmployeeId),
    /// A stored row could not be mapped onto the domain model.
    #[error("invalid {table} row {id}: {message}")]
    InvalidRow {
        table: &'static str,
        id: i64,
        message: String,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A tool registration ready to be stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTool {
    /// Generated when absent.
    pub tool_number: Option<String>,
    pub equipment_name: String,
    pub calibrate_due: Option<CalendarDate>,
    pub details: ToolDetails,
}

/// An employee ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub id_number: String,
}

const TOOL_COLUMNS: &str = "
    id, tool_number, equipment_name, calibrate_due, status, deleted_at,
    no, registration_id_number, area_process, manufacturer, model, serial_number,
    type_of_calibration, calibration_range, date_of_registration, resolution, accuracy, remarks
";

const LOG_COLUMNS: &str = "
    id, action, employee_id, employee_id_number, tool_id, tool_name, tool_number,
    timestamp, condition, verified_by, borrow_remarks, return_remarks
";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &std::path::Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS tools (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tool_number TEXT NOT NULL,
                equipment_name TEXT NOT NULL,
                calibrate_due TEXT,
                status TEXT NOT NULL DEFAULT 'good',
                no TEXT,
                registration_id_number TEXT,
                area_process TEXT,
                manufacturer TEXT,
                model TEXT,
                serial_number TEXT,
                type_of_calibration TEXT,
                calibration_range TEXT,
                date_of_registration TEXT,
                resolution TEXT,
                accuracy TEXT,
                remarks TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_tools_number ON tools(tool_number);

            CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                id_number TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_employees_id_number ON employees(id_number);

            -- Logs table: immutable custody events
            -- timestamp: 'YYYY-MM-DD HH:MM:SS'
            -- remarks live in borrow_remarks or return_remarks according to action
            CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                action TEXT NOT NULL CHECK (action IN ('borrow', 'return')),
                employee_id INTEGER NOT NULL,
                employee_id_number TEXT NOT NULL,
                tool_id INTEGER NOT NULL,
                tool_name TEXT NOT NULL,
                tool_number TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                condition TEXT NOT NULL,
                verified_by TEXT NOT NULL,
                borrow_remarks TEXT,
                return_remarks TEXT,
                FOREIGN KEY (employee_id) REFERENCES employees(id),
                FOREIGN KEY (tool_id) REFERENCES tools(id)
            );

            CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs(timestamp);
            CREATE INDEX IF NOT EXISTS idx_logs_employee_tool ON logs(employee_id, tool_id);

            CREATE TRIGGER IF NOT EXISTS logs_no_update BEFORE UPDATE ON logs
            BEGIN
                SELECT RAISE(ABORT, 'logs are append-only');
            END;

            CREATE TRIGGER IF NOT EXISTS logs_no_delete BEFORE DELETE ON logs
            BEGIN
                SELECT RAISE(ABORT, 'logs are append-only');
            END;
            ",
        )?;
        Ok(())
    }

    // ========== Tools ==========

    /// Registers a tool, generating a tool number if none was given.
    pub fn insert_tool(&mut self, tool: &NewTool, now: &Timestamp) -> Result<ToolId, DbError> {
        let Some(equipment_name) = non_blank(Some(tool.equipment_name.as_str())) else {
            return Err(ValidationError::Empty {
                field: "equipment name",
            }
            .into());
        };

        let tx = self.conn.transaction()?;
        let tool_number = match non_blank(tool.tool_number.as_deref()) {
            Some(number) => {
                if tool_number_taken(&tx, number)? {
                    return Err(DbError::DuplicateToolNumber(number.to_string()));
                }
                number.to_string()
            }
            None => generate_tool_number(&tx)?,
        };

        let d = &tool.details;
        tx.execute(
            "
            INSERT INTO tools (
                tool_number, equipment_name, calibrate_due, status,
                no, registration_id_number, area_process, manufacturer, model, serial_number,
                type_of_calibration, calibration_range, date_of_registration, resolution,
                accuracy, remarks, created_at, updated_at
            )
            VALUES (?, ?, ?, 'good', ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                tool_number,
                equipment_name,
                tool.calibrate_due.as_ref().map(CalendarDate::as_str),
                d.no,
                d.registration_id_number,
                d.area_process,
                d.manufacturer,
                d.model,
                d.serial_number,
                d.type_of_calibration,
                d.calibration_range,
                d.date_of_registration,
                d.resolution,
                d.accuracy,
                d.remarks,
                now.as_str(),
                now.as_str(),
            ],
        )?;
        let id = ToolId::new(tx.last_insert_rowid());
        tx.commit()?;
        tracing::debug!(%id, %tool_number, "tool registered");
        Ok(id)
    }

    /// Lists live tools ordered by ID.
    pub fn list_tools(&self) -> Result<Vec<Tool>, DbError> {
        self.query_tools(true)
    }

    /// Lists every tool ever registered, including soft-deleted ones.
    pub fn list_all_tools(&self) -> Result<Vec<Tool>, DbError> {
        self.query_tools(false)
    }

    fn query_tools(&self, live_only: bool) -> Result<Vec<Tool>, DbError> {
        let filter = if live_only {
            "WHERE deleted_at IS NULL"
        } else {
            ""
        };
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TOOL_COLUMNS} FROM tools {filter} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], ToolRow::from_row)?;
        let mut tools = Vec::new();
        for row in rows {
            tools.push(row?.into_tool()?);
        }
        Ok(tools)
    }

    /// Sets or clears a live tool's calibration due date.
    pub fn set_calibrate_due(
        &mut self,
        id: ToolId,
        due: Option<&CalendarDate>,
        now: &Timestamp,
    ) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "UPDATE tools SET calibrate_due = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
            params![due.map(CalendarDate::as_str), now.as_str(), id.get()],
        )?;
        if updated == 0 {
            return Err(DbError::ToolNotFound(id));
        }
        Ok(())
    }

    /// Flips a live tool between `good` and `damage`, returning the new status.
    pub fn toggle_tool_damage(&mut self, id: ToolId, now: &Timestamp) -> Result<ToolStatus, DbError> {
        let tx = self.conn.transaction()?;
        let current: Option<String> = tx
            .query_row(
                "SELECT status FROM tools WHERE id = ? AND deleted_at IS NULL",
                [id.get()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            return Err(DbError::ToolNotFound(id));
        };
        let status = parse_column::<ToolStatus>(&current, "tools", id.get())?.toggled();
        tx.execute(
            "UPDATE tools SET status = ?, updated_at = ? WHERE id = ?",
            params![status.as_str(), now.as_str(), id.get()],
        )?;
        tx.commit()?;
        Ok(status)
    }

    /// Soft-deletes a live tool.
    pub fn delete_tool(&mut self, id: ToolId, now: &Timestamp) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "UPDATE tools SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
            params![now.as_str(), now.as_str(), id.get()],
        )?;
        if updated == 0 {
            return Err(DbError::ToolNotFound(id));
        }
        tracing::debug!(%id, "tool soft-deleted");
        Ok(())
    }

    // ========== Employees ==========

    /// Adds an employee. Badge numbers must be unique among live employees.
    pub fn insert_employee(
        &mut self,
        employee: &NewEmployee,
        now: &Timestamp,
    ) -> Result<EmployeeId, DbError> {
        let name = non_blank(Some(employee.name.as_str()))
            .ok_or(ValidationError::Empty { field: "name" })?;
        let id_number = non_blank(Some(employee.id_number.as_str()))
            .ok_or(ValidationError::Empty { field: "ID number" })?;

        let tx = self.conn.transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE id_number = ? COLLATE NOCASE AND deleted_at IS NULL)",
            [id_number],
            |row| row.get(0),
        )?;
        if exists {
            return Err(DbError::DuplicateEmployee(id_number.to_string()));
        }
        tx.execute(
            "INSERT INTO employees (name, id_number, created_at, updated_at) VALUES (?, ?, ?, ?)",
            params![name, id_number, now.as_str(), now.as_str()],
        )?;
        let id = EmployeeId::new(tx.last_insert_rowid());
        tx.commit()?;
        Ok(id)
    }

    /// Lists live employees ordered by ID.
    pub fn list_employees(&self) -> Result<Vec<Employee>, DbError> {
        self.query_employees(true)
    }

    /// Lists every employee, including soft-deleted ones.
    pub fn list_all_employees(&self) -> Result<Vec<Employee>, DbError> {
        self.query_employees(false)
    }

    fn query_employees(&self, live_only: bool) -> Result<Vec<Employee>, DbError> {
        let filter = if live_only {
            "WHERE deleted_at IS NULL"
        } else {
            ""
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name, id_number, deleted_at FROM employees {filter} ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(EmployeeRow {
                id: row.get(0)?,
                name: row.get(1)?,
                id_number: row.get(2)?,
                deleted_at: row.get(3)?,
            })
        })?;
        let mut employees = Vec::new();
        for row in rows {
            employees.push(row?.into_employee()?);
        }
        Ok(employees)
    }

    /// Soft-deletes a live employee.
    pub fn delete_employee(&mut self, id: EmployeeId, now: &Timestamp) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "UPDATE employees SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
            params![now.as_str(), now.as_str(), id.get()],
        )?;
        if updated == 0 {
            return Err(DbError::EmployeeNotFound(id));
        }
        Ok(())
    }

    // ========== Logs ==========

    /// Appends a log entry. There is no way to change it afterwards.
    pub fn append_log(&mut self, entry: &NewLogEntry) -> Result<LogId, DbError> {
        let id = insert_log(&self.conn, entry)?;
        tracing::debug!(%id, action = %entry.action, tool = %entry.tool_number, "log appended");
        Ok(id)
    }

    /// Appends a return entry and applies the resulting tool status atomically.
    ///
    /// If either write fails, neither is kept.
    pub fn record_return(&mut self, prepared: &PreparedReturn) -> Result<LogId, DbError> {
        let tx = self.conn.transaction()?;
        let id = insert_log(&tx, &prepared.entry)?;
        let updated = tx.execute(
            "UPDATE tools SET status = ?, updated_at = ? WHERE id = ?",
            params![
                prepared.new_status.as_str(),
                prepared.entry.timestamp.as_str(),
                prepared.tool_id.get()
            ],
        )?;
        if updated == 0 {
            return Err(DbError::ToolNotFound(prepared.tool_id));
        }
        tx.commit()?;
        tracing::debug!(%id, status = %prepared.new_status, "return recorded");
        Ok(id)
    }

    /// Lists all log entries, newest first.
    pub fn list_logs(&self) -> Result<Vec<LogEntry>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOG_COLUMNS} FROM logs ORDER BY timestamp DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], LogRow::from_row)?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?.into_entry()?);
        }
        Ok(logs)
    }

    /// Loads the full snapshot every derived view works from.
    pub fn ledger(&self) -> Result<Ledger, DbError> {
        Ok(Ledger {
            tools: self.list_all_tools()?,
            employees: self.list_all_employees()?,
            logs: self.list_logs()?,
        })
    }
}

fn insert_log(conn: &Connection, entry: &NewLogEntry) -> Result<LogId, DbError> {
    let (borrow_remarks, return_remarks) = match entry.action {
        LogAction::Borrow => (entry.remarks.as_deref(), None),
        LogAction::Return => (None, entry.remarks.as_deref()),
    };
    conn.execute(
        "
        INSERT INTO logs (
            action, employee_id, employee_id_number, tool_id, tool_name, tool_number,
            timestamp, condition, verified_by, borrow_remarks, return_remarks
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
        params![
            entry.action.as_str(),
            entry.employee_id.get(),
            entry.employee_id_number,
            entry.tool_id.get(),
            entry.tool_name,
            entry.tool_number,
            entry.timestamp.as_str(),
            entry.condition.as_str(),
            entry.verified_by,
            borrow_remarks,
            return_remarks,
        ],
    )?;
    Ok(LogId::new(conn.last_insert_rowid()))
}

fn tool_number_taken(conn: &Connection, number: &str) -> Result<bool, DbError> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tools WHERE tool_number = ? COLLATE NOCASE AND deleted_at IS NULL)",
        [number],
        |row| row.get(0),
    )?)
}

/// Builds `T-` plus the last eight digits of the epoch milliseconds,
/// suffixing `-2`, `-3`, ... if that number is already live.
fn generate_tool_number(conn: &Connection) -> Result<String, DbError> {
    let millis = chrono::Utc::now().timestamp_millis().rem_euclid(100_000_000);
    let base = format!("T-{millis:08}");
    let mut candidate = base.clone();
    let mut suffix = 2;
    while tool_number_taken(conn, &candidate)? {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    Ok(candidate)
}

fn parse_column<T>(value: &str, table: &'static str, id: i64) -> Result<T, DbError>
where
    T: std::str::FromStr<Err = ValidationError>,
{
    value.parse().map_err(|err: ValidationError| DbError::InvalidRow {
        table,
        id,
        message: err.to_string(),
    })
}

fn parse_timestamp(value: &str, table: &'static str, id: i64) -> Result<Timestamp, DbError> {
    Timestamp::new(value).map_err(|err| DbError::InvalidRow {
        table,
        id,
        message: err.to_string(),
    })
}

fn parse_lifecycle(
    deleted_at: Option<String>,
    table: &'static str,
    id: i64,
) -> Result<Lifecycle, DbError> {
    let deleted_at = deleted_at
        .map(|at| parse_timestamp(&at, table, id))
        .transpose()?;
    Ok(Lifecycle::from_deleted_at(deleted_at))
}

#[derive(Debug)]
struct ToolRow {
    id: i64,
    tool_number: String,
    equipment_name: String,
    calibrate_due: Option<String>,
    status: String,
    deleted_at: Option<String>,
    details: ToolDetails,
}

impl ToolRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            tool_number: row.get(1)?,
            equipment_name: row.get(2)?,
            calibrate_due: row.get(3)?,
            status: row.get(4)?,
            deleted_at: row.get(5)?,
            details: ToolDetails {
                no: row.get(6)?,
                registration_id_number: row.get(7)?,
                area_process: row.get(8)?,
                manufacturer: row.get(9)?,
                model: row.get(10)?,
                serial_number: row.get(11)?,
                type_of_calibration: row.get(12)?,
                calibration_range: row.get(13)?,
                date_of_registration: row.get(14)?,
                resolution: row.get(15)?,
                accuracy: row.get(16)?,
                remarks: row.get(17)?,
            },
        })
    }

    fn into_tool(self) -> Result<Tool, DbError> {
        let calibrate_due = self
            .calibrate_due
            .filter(|d| !d.trim().is_empty())
            .map(CalendarDate::new)
            .transpose()
            .map_err(|err| DbError::InvalidRow {
                table: "tools",
                id: self.id,
                message: err.to_string(),
            })?;
        Ok(Tool {
            id: ToolId::new(self.id),
            tool_number: self.tool_number,
            equipment_name: self.equipment_name,
            calibrate_due,
            status: parse_column(&self.status, "tools", self.id)?,
            lifecycle: parse_lifecycle(self.deleted_at, "tools", self.id)?,
            details: self.details,
        })
    }
}

#[derive(Debug)]
struct EmployeeRow {
    id: i64,
    name: String,
    id_number: String,
    deleted_at: Option<String>,
}

impl EmployeeRow {
    fn into_employee(self) -> Result<Employee, DbError> {
        Ok(Employee {
            id: EmployeeId::new(self.id),
            name: self.name,
            id_number: self.id_number,
            lifecycle: parse_lifecycle(self.deleted_at, "employees", self.id)?,
        })
    }
}

#[derive(Debug)]
struct LogRow {
    id: i64,
    action: String,
    employee_id: i64,
    employee_id_number: String,
    tool_id: i64,
    tool_name: String,
    tool_number: String,
    timestamp: String,
    condition: String,
    verified_by: String,
    borrow_remarks: Option<String>,
    return_remarks: Option<String>,
}

impl LogRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            action: row.get(1)?,
            employee_id: row.get(2)?,
            employee_id_number: row.get(3)?,
            tool_id: row.get(4)?,
            tool_name: row.get(5)?,
            tool_number: row.get(6)?,
            timestamp: row.get(7)?,
            condition: row.get(8)?,
            verified_by: row.get(9)?,
            borrow_remarks: row.get(10)?,
            return_remarks: row.get(11)?,
        })
    }

    fn into_entry(self) -> Result<LogEntry, DbError> {
        let action: LogAction = parse_column(&self.action, "logs", self.id)?;
        let remarks = match action {
            LogAction::Borrow => self.borrow_remarks,
            LogAction::Return => self.return_remarks,
        };
        Ok(LogEntry {
            id: LogId::new(self.id),
            action,
            employee_id: EmployeeId::new(self.employee_id),
            employee_id_number: self.employee_id_number,
            tool_id: ToolId::new(self.tool_id),
            tool_name: self.tool_name,
            tool_number: self.tool_number,
            timestamp: parse_timestamp(&self.timestamp, "logs", self.id)?,
            condition: parse_column::<Condition>(&self.condition, "logs", self.id)?,
            verified_by: self.verified_by,
            remarks,
        })
    }
}
