// Communication with SQLite
// Every mutation hands the affected row back so callers never need to re-query
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::app::models::{ListFilter, NewTask, Task};
use crate::error::Result;

const TASK_COLUMNS: &str = "id, title, completed, isImportant, isPlanned, category";

pub struct Storage {
    db_con: Connection,
}

impl Storage {
    // The connection is owned by the gateway for its whole lifetime
    pub fn new(db_con: Connection) -> Storage {
        Storage { db_con }
    }

    pub fn open(path: &Path) -> Result<Storage> {
        Ok(Storage::new(Connection::open(path)?))
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Storage> {
        Ok(Storage::new(Connection::open_in_memory()?))
    }

    // Safe to call on every start. Returns the journal mode the store accepted.
    pub fn create_table_if_not_exists(&self) -> Result<String> {
        let journal_mode: String = self.db_con.pragma_update_and_check(
            None,
            "journal_mode",
            "WAL",
            |row| row.get(0),
        )?;

        self.db_con.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                completed BOOLEAN NOT NULL DEFAULT 0,
                isImportant BOOLEAN NOT NULL DEFAULT 0,
                isPlanned BOOLEAN NOT NULL DEFAULT 0,
                category TEXT NOT NULL DEFAULT 'Tasks'
            );",
        )?;

        info!(journal_mode = %journal_mode, "task table ready");
        Ok(journal_mode)
    }

    // CREATE
    pub fn insert_task(&self, new_task: &NewTask) -> Result<Task> {
        let task = self.db_con.query_row(
            &format!(
                "INSERT INTO tasks (title, isImportant, category) VALUES (?1, ?2, ?3) RETURNING {TASK_COLUMNS};"
            ),
            (&new_task.title, new_task.is_important, &new_task.category),
            task_from_row,
        )?;
        debug!(id = task.id, category = %task.category, "task inserted");
        Ok(task)
    }

    // READ
    pub fn get_tasks(&self, filter: ListFilter) -> Result<Vec<Task>> {
        let condition = match filter {
            ListFilter::All => "",
            ListFilter::Important => " WHERE isImportant = 1",
            ListFilter::MyDay => " WHERE category = 'MyDay'",
            ListFilter::Planned => " WHERE isPlanned = 1",
        };
        let mut stmt = self.db_con.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks{condition} ORDER BY id DESC;"
        ))?;

        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<rusqlite::Result<Vec<Task>>>()?;
        Ok(tasks)
    }

    // UPDATE
    // A missing id affects zero rows and yields None
    pub fn update_title(&self, id: i64, title: &str) -> Result<Option<Task>> {
        self.update_column("title", id, title)
    }

    pub fn update_completed(&self, id: i64, completed: bool) -> Result<Option<Task>> {
        self.update_column("completed", id, completed)
    }

    pub fn update_important(&self, id: i64, is_important: bool) -> Result<Option<Task>> {
        self.update_column("isImportant", id, is_important)
    }

    pub fn update_planned(&self, id: i64, is_planned: bool) -> Result<Option<Task>> {
        self.update_column("isPlanned", id, is_planned)
    }

    fn update_column(
        &self,
        column: &'static str,
        id: i64,
        value: impl rusqlite::ToSql,
    ) -> Result<Option<Task>> {
        let task = self
            .db_con
            .query_row(
                &format!("UPDATE tasks SET {column} = ?1 WHERE id = ?2 RETURNING {TASK_COLUMNS};"),
                (value, id),
                task_from_row,
            )
            .optional()?;
        debug!(id, column, found = task.is_some(), "task updated");
        Ok(task)
    }

    // DELETE
    pub fn delete_task(&self, id: i64) -> Result<bool> {
        let removed = self.db_con.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        debug!(id, removed, "task deleted");
        Ok(removed > 0)
    }

    pub fn delete_all(&self) -> Result<usize> {
        let removed = self.db_con.execute("DELETE FROM tasks;", [])?;
        info!(removed, "all tasks deleted");
        Ok(removed)
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        completed: row.get(2)?,
        is_important: row.get(3)?,
        is_planned: row.get(4)?,
        category: row.get(5)?,
    })
}
