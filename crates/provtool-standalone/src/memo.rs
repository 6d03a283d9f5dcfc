//! Input memoization (§6.3, Standalone Builder): a single-row SQLite table
//! that remembers the last answer given for each prompt, so a re-run can
//! offer it back as a default instead of asking from scratch.
//!
//! The table shape (and the "one row ever" design) mirrors the reference
//! tool's `provtool(entity_path, author_family_name, ...)` table exactly:
//! there is no per-entity history, just the most recent value per column.

use rusqlite::Connection;
use std::path::Path;

use provtool_core::ProvtoolError;

/// Columns the memoization table carries, in the order the original tool
/// declares them. `entity_id` remembers the last-used upstream container id
/// offered to the "used entities" loop.
pub const MEMO_COLUMNS: &[&str] = &[
    "entity_path",
    "author_family_name",
    "author_given_name",
    "activity_location",
    "activity_label",
    "activity_means",
    "activity_time",
    "entity_id",
];

pub struct MemoStore {
    conn: Connection,
}

fn map_sqlite(e: rusqlite::Error) -> ProvtoolError {
    ProvtoolError::Other(format!("sqlite error: {e}"))
}

impl MemoStore {
    /// Open (creating if needed) the memoization database at `path`,
    /// ensuring the single-row `provtool` table exists.
    pub fn open(path: &Path) -> Result<Self, ProvtoolError> {
        let conn = Connection::open(path).map_err(map_sqlite)?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    /// An in-memory store, for tests and non-persistent interactive runs.
    pub fn in_memory() -> Result<Self, ProvtoolError> {
        let conn = Connection::open_in_memory().map_err(map_sqlite)?;
        Self::init(&conn)?;
        Ok(Self { conn })
    }

    fn init(conn: &Connection) -> Result<(), ProvtoolError> {
        let col_defs: Vec<String> = MEMO_COLUMNS.iter().map(|c| format!("{c} varchar")).collect();
        conn.execute_batch(&format!("create table if not exists provtool({})", col_defs.join(", ")))
            .map_err(map_sqlite)?;

        let row_exists: bool = conn
            .query_row("select count(*) from provtool", [], |row| row.get::<_, i64>(0))
            .map_err(map_sqlite)?
            > 0;
        if !row_exists {
            let placeholders: Vec<&str> = MEMO_COLUMNS.iter().map(|_| "''").collect();
            conn.execute_batch(&format!(
                "insert into provtool ({}) values ({})",
                MEMO_COLUMNS.join(", "),
                placeholders.join(", ")
            ))
            .map_err(map_sqlite)?;
        }
        Ok(())
    }

    fn assert_known_column(key: &str) -> Result<(), ProvtoolError> {
        if MEMO_COLUMNS.contains(&key) {
            Ok(())
        } else {
            Err(ProvtoolError::Other(format!("unknown memoization column {key:?}")))
        }
    }

    /// The last remembered value for `key`, or `None` if it has never been
    /// set (an empty string, matching the fresh-row default).
    pub fn get(&self, key: &str) -> Result<Option<String>, ProvtoolError> {
        Self::assert_known_column(key)?;
        let value: String = self
            .conn
            .query_row(&format!("select {key} from provtool"), [], |row| row.get(0))
            .map_err(map_sqlite)?;
        Ok(if value.is_empty() { None } else { Some(value) })
    }

    /// Remember `value` for `key`, overwriting whatever was stored before.
    pub fn set(&self, key: &str, value: &str) -> Result<(), ProvtoolError> {
        Self::assert_known_column(key)?;
        self.conn
            .execute(&format!("update provtool set {key} = ?1"), [value])
            .map_err(map_sqlite)?;
        Ok(())
    }
}
