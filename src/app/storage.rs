// Persistence of the task collection.
// The whole collection lives as one JSON array under a single key of a
// string-keyed slot. The SQLite slot is based on
// https://github.com/rusqlite/rusqlite/blob/master/examples/persons/main.rs
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, error, info, warn};
use rusqlite::{Connection, OptionalExtension};

use crate::app::models::Task;
use crate::errors::AppResult;

pub const DEFAULT_STORAGE_KEY: &str = "tasks";

// A durable string-keyed value store
pub trait Slot {
    fn read(&self, key: &str) -> AppResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> AppResult<()>;
}

pub struct SqliteSlot {
    pub db_con: Connection,
}

impl SqliteSlot {
    pub fn open(path: impl AsRef<Path>) -> AppResult<SqliteSlot> {
        let slot = SqliteSlot {
            db_con: Connection::open(path)?,
        };
        slot.create_table_if_not_exists()?;
        Ok(slot)
    }

    pub fn open_in_memory() -> AppResult<SqliteSlot> {
        let slot = SqliteSlot {
            db_con: Connection::open_in_memory()?,
        };
        slot.create_table_if_not_exists()?;
        Ok(slot)
    }

    fn create_table_if_not_exists(&self) -> AppResult<()> {
        self.db_con.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
            (),
        )?;
        Ok(())
    }
}

impl Slot for SqliteSlot {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        let value = self
            .db_con
            .query_row("SELECT value FROM kv WHERE key = ?1;", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> AppResult<()> {
        self.db_con.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            (key, value),
        )?;
        Ok(())
    }
}

// Slot kept in process memory; nothing survives the process
#[derive(Default)]
pub struct MemorySlot {
    values: RefCell<HashMap<String, String>>,
}

impl Slot for MemorySlot {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> AppResult<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// Why a stored collection was rejected on load
#[derive(Debug, PartialEq, Eq)]
enum Rejection {
    EmptyText(usize),
    DuplicateId(usize),
}

pub struct Storage {
    slot: Box<dyn Slot>,
    key: String,
}

impl Storage {
    pub fn new(slot: Box<dyn Slot>, key: impl Into<String>) -> Storage {
        Storage {
            slot,
            key: key.into(),
        }
    }

    pub fn in_memory() -> Storage {
        Storage::new(Box::new(MemorySlot::default()), DEFAULT_STORAGE_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    // Write the full collection. Errors go back to the caller, who decides
    // whether the session carries on without durable state.
    pub fn save(&self, tasks: &[Task]) -> AppResult<()> {
        let encoded = serde_json::to_string(tasks)?;
        self.slot.write(&self.key, &encoded)?;
        debug!(
            "event=tasks_save module=storage status=ok key={} count={}",
            self.key,
            tasks.len()
        );
        Ok(())
    }

    // Read the collection back. An absent slot, a failed read, malformed JSON
    // or a record that breaks the schema all yield an empty collection.
    pub fn load(&self) -> Vec<Task> {
        let raw = match self.slot.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=tasks_load module=storage status=absent key={}", self.key);
                return Vec::new();
            }
            Err(err) => {
                error!(
                    "event=tasks_load module=storage status=error key={} error={}",
                    self.key, err
                );
                return Vec::new();
            }
        };

        let tasks = match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(
                    "event=tasks_load module=storage status=corrupt key={} error={}",
                    self.key, err
                );
                return Vec::new();
            }
        };

        if let Err(rejection) = validate(&tasks) {
            warn!(
                "event=tasks_load module=storage status=invalid key={} reason={:?}",
                self.key, rejection
            );
            return Vec::new();
        }

        info!(
            "event=tasks_load module=storage status=ok key={} count={}",
            self.key,
            tasks.len()
        );
        tasks
    }
}

// Checks the invariants serde cannot express
fn validate(tasks: &[Task]) -> Result<(), Rejection> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for (index, task) in tasks.iter().enumerate() {
        if task.text.trim().is_empty() {
            return Err(Rejection::EmptyText(index));
        }
        if !seen.insert(task.id) {
            return Err(Rejection::DuplicateId(index));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn sample_tasks() -> Vec<Task> {
        let created = Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap();
        let mut starred = Task::new("Pay rent", NaiveDate::from_ymd_opt(2024, 5, 3), created);
        starred.starred = true;
        let mut done = Task::new("Buy groceries", None, created);
        done.completed = true;
        vec![starred, done]
    }

    struct FailingSlot;

    impl Slot for FailingSlot {
        fn read(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::Config("slot unavailable".into()))
        }

        fn write(&self, _key: &str, _value: &str) -> AppResult<()> {
            Err(AppError::Config("slot unavailable".into()))
        }
    }

    fn storage_with_raw(raw: &str) -> Storage {
        let slot = MemorySlot::default();
        slot.write(DEFAULT_STORAGE_KEY, raw).unwrap();
        Storage::new(Box::new(slot), DEFAULT_STORAGE_KEY)
    }

    #[test]
    fn load_returns_what_save_wrote() {
        let storage = Storage::in_memory();
        let tasks = sample_tasks();
        storage.save(&tasks).unwrap();
        assert_eq!(storage.load(), tasks);
    }

    #[test]
    fn absent_slot_loads_empty() {
        assert!(Storage::in_memory().load().is_empty());
    }

    #[test]
    fn malformed_json_loads_empty() {
        assert!(storage_with_raw("[{\"id\": ").load().is_empty());
        assert!(storage_with_raw("not json at all").load().is_empty());
    }

    #[test]
    fn wrong_shape_loads_empty() {
        // Legacy numeric ids and missing fields are both schema violations
        let legacy = r#"[{"id":1700000000000,"text":"a","completed":false,"starred":false,"date":null,"createdAt":"2024-05-02T08:30:00Z"}]"#;
        assert!(storage_with_raw(legacy).load().is_empty());

        let missing = r#"[{"id":"5b0f6f1e-4a3c-4b8e-9a43-0d8f6d2b9c11","text":"a"}]"#;
        assert!(storage_with_raw(missing).load().is_empty());

        assert!(storage_with_raw(r#"{"tasks":[]}"#).load().is_empty());
    }

    #[test]
    fn unknown_field_loads_empty() {
        let extra = r#"[{"id":"5b0f6f1e-4a3c-4b8e-9a43-0d8f6d2b9c11","text":"a","completed":false,"starred":false,"date":null,"createdAt":"2024-05-02T08:30:00Z","priority":2}]"#;
        assert!(storage_with_raw(extra).load().is_empty());
    }

    #[test]
    fn blank_text_loads_empty() {
        let blank = r#"[{"id":"5b0f6f1e-4a3c-4b8e-9a43-0d8f6d2b9c11","text":"  ","completed":false,"starred":false,"date":null,"createdAt":"2024-05-02T08:30:00Z"}]"#;
        assert!(storage_with_raw(blank).load().is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut tasks = sample_tasks();
        tasks[1].id = tasks[0].id;
        assert_eq!(validate(&tasks), Err(Rejection::DuplicateId(1)));
    }

    #[test]
    fn failing_slot_loads_empty_and_reports_save_error() {
        let storage = Storage::new(Box::new(FailingSlot), DEFAULT_STORAGE_KEY);
        assert!(storage.load().is_empty());
        assert!(storage.save(&sample_tasks()).is_err());
    }

    #[test]
    fn sqlite_slot_overwrites_value() {
        let slot = SqliteSlot::open_in_memory().unwrap();
        assert_eq!(slot.read("tasks").unwrap(), None);

        slot.write("tasks", "[]").unwrap();
        slot.write("tasks", "[1]").unwrap();
        assert_eq!(slot.read("tasks").unwrap().as_deref(), Some("[1]"));
        assert_eq!(slot.read("other").unwrap(), None);
    }
}
