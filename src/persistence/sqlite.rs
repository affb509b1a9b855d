use super::{PersistenceResult, ScheduleStore};
use crate::{Expression, Schedule};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql, params};
use std::sync::Mutex;
use tracing::debug;

/// Expressions are stored as their canonical text.
impl ToSql for Expression {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Expression {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

/// Schedules are stored as newline-separated canonical text.
impl ToSql for Schedule {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Schedule {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

/// Keeps one schedule in a SQLite database, one row per expression.
pub struct SqliteScheduleStore {
    connection: Mutex<Connection>,
}

impl SqliteScheduleStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS schedule_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                saved_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS calendar_expressions (
                position INTEGER PRIMARY KEY,
                expression TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }
}

impl ScheduleStore for SqliteScheduleStore {
    fn save_schedule(&self, schedule: &Schedule) -> PersistenceResult<()> {
        let mut conn = self.connection.lock().unwrap_or_else(|p| p.into_inner());
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM calendar_expressions", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO calendar_expressions (position, expression) VALUES (?1, ?2)")?;
            for (position, expression) in schedule.iter().enumerate() {
                stmt.execute(params![position as i64, expression])?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO schedule_state (id, saved_at) VALUES (1, ?1)",
            params![chrono::Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        debug!(count = schedule.len(), "schedule saved to sqlite");
        Ok(())
    }

    fn load_schedule(&self) -> PersistenceResult<Option<Schedule>> {
        let conn = self.connection.lock().unwrap_or_else(|p| p.into_inner());

        let saved: i64 = conn.query_row("SELECT COUNT(*) FROM schedule_state", [], |row| row.get(0))?;
        if saved == 0 {
            return Ok(None);
        }

        let mut stmt =
            conn.prepare("SELECT expression FROM calendar_expressions ORDER BY position ASC")?;
        let schedule = stmt
            .query_map([], |row| row.get::<_, Expression>(0))?
            .collect::<rusqlite::Result<Schedule>>()?;
        debug!(count = schedule.len(), "schedule loaded from sqlite");
        Ok(Some(schedule))
    }
}
