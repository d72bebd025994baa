//! Schema Creation and Migrations
//!
//! Images saved by older versions may lack ordering and description columns.
//! Missing columns are detected with `PRAGMA table_info` and added; rows still
//! holding the unassigned order `0` are then given sequential orders.

use std::collections::HashMap;

use log::debug;
use rusqlite::{params, Connection};

use crate::domain::DomainResult;

/// Recorded in `PRAGMA user_version` once an image is current
pub const SCHEMA_VERSION: i64 = 2;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS lists (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL,
        order_idx INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE IF NOT EXISTS tasks (
        id TEXT PRIMARY KEY,
        list_id TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        completed INTEGER NOT NULL DEFAULT 0,
        priority TEXT NOT NULL DEFAULT 'none',
        created_at TEXT NOT NULL,
        order_idx INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (list_id) REFERENCES lists(id) ON DELETE CASCADE
    );
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_tasks_list ON tasks(list_id);
    INSERT OR IGNORE INTO settings (key, value) VALUES ('themeColor', 'purple');
";

/// Columns added after the first release: (table, column, definition)
const ADDED_COLUMNS: &[(&str, &str, &str)] = &[
    ("lists", "order_idx", "INTEGER NOT NULL DEFAULT 0"),
    ("tasks", "description", "TEXT"),
    ("tasks", "order_idx", "INTEGER NOT NULL DEFAULT 0"),
];

/// What a migration run changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub added_columns: Vec<String>,
    pub backfilled_lists: usize,
    pub backfilled_tasks: usize,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.added_columns.is_empty() && self.backfilled_lists == 0 && self.backfilled_tasks == 0
    }
}

/// Create all tables for a new database
pub fn create_schema(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(SCHEMA)?;
    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}

/// Check if a column exists in a table
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn schema_version(conn: &Connection) -> DomainResult<i64> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

fn set_schema_version(conn: &Connection, version: i64) -> DomainResult<()> {
    conn.execute_batch(&format!("PRAGMA user_version = {};", version))?;
    Ok(())
}

/// Bring an opened image up to the current schema. Safe to run repeatedly.
pub fn migrate(conn: &Connection) -> DomainResult<MigrationReport> {
    let tx = conn.unchecked_transaction()?;
    let mut report = MigrationReport::default();

    // Tables missing entirely from very old images
    tx.execute_batch(SCHEMA)?;

    for (table, column, definition) in ADDED_COLUMNS {
        if !column_exists(&tx, table, column)? {
            tx.execute_batch(&format!(
                "ALTER TABLE {} ADD COLUMN {} {};",
                table, column, definition
            ))?;
            report.added_columns.push(format!("{}.{}", table, column));
        }
    }

    report.backfilled_lists = backfill_list_order(&tx)?;
    report.backfilled_tasks = backfill_task_order(&tx)?;
    set_schema_version(&tx, SCHEMA_VERSION)?;

    tx.commit()?;
    debug!("Migration finished: {:?}", report);
    Ok(report)
}

/// Give unordered lists sequential orders after the current maximum, in row order
fn backfill_list_order(conn: &Connection) -> DomainResult<usize> {
    let pending: Vec<String> = {
        let mut stmt = conn.prepare("SELECT id FROM lists WHERE order_idx = 0 ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<_, _>>()?
    };
    if pending.is_empty() {
        return Ok(0);
    }

    let max: i64 = conn.query_row("SELECT COALESCE(MAX(order_idx), 0) FROM lists", [], |row| {
        row.get(0)
    })?;
    for (offset, id) in pending.iter().enumerate() {
        conn.execute(
            "UPDATE lists SET order_idx = ?1 WHERE id = ?2",
            params![max + 1 + offset as i64, id],
        )?;
    }
    Ok(pending.len())
}

/// Same as lists, but numbered per owning list
fn backfill_task_order(conn: &Connection) -> DomainResult<usize> {
    let pending: Vec<(String, String)> = {
        let mut stmt =
            conn.prepare("SELECT id, list_id FROM tasks WHERE order_idx = 0 ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<_, _>>()?
    };

    let mut next_by_list: HashMap<String, i64> = HashMap::new();
    for (id, list_id) in &pending {
        let next = match next_by_list.get(list_id) {
            Some(next) => *next,
            None => {
                conn.query_row(
                    "SELECT COALESCE(MAX(order_idx), 0) + 1 FROM tasks WHERE list_id = ?1",
                    params![list_id],
                    |row| row.get::<_, i64>(0),
                )?
            }
        };
        conn.execute(
            "UPDATE tasks SET order_idx = ?1 WHERE id = ?2",
            params![next, id],
        )?;
        next_by_list.insert(list_id.clone(), next + 1);
    }
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Schema as written by the first release: no ordering, no task description
    const LEGACY_SCHEMA: &str = "
        CREATE TABLE lists (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL
        );
        CREATE TABLE tasks (
            id TEXT PRIMARY KEY,
            list_id TEXT NOT NULL,
            title TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            priority TEXT NOT NULL DEFAULT 'none',
            created_at TEXT NOT NULL,
            FOREIGN KEY (list_id) REFERENCES lists(id) ON DELETE CASCADE
        );
    ";

    fn legacy_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(LEGACY_SCHEMA).unwrap();
        conn.execute_batch(
            "INSERT INTO lists VALUES ('10', 'Home', '', '2024-01-01T00:00:00.000Z');
             INSERT INTO lists VALUES ('11', 'Work', '', '2024-01-02T00:00:00.000Z');
             INSERT INTO tasks VALUES ('20', '11', 'Report', 0, 'high', '2024-01-03T00:00:00.000Z');
             INSERT INTO tasks VALUES ('21', '10', 'Dishes', 0, 'none', '2024-01-03T00:00:01.000Z');
             INSERT INTO tasks VALUES ('22', '11', 'Email', 1, 'low', '2024-01-03T00:00:02.000Z');
             INSERT INTO tasks VALUES ('23', '11', 'Standup', 0, 'none', '2024-01-03T00:00:03.000Z');",
        )
        .unwrap();
        conn
    }

    fn orders(conn: &Connection, sql: &str) -> Vec<(String, i64)> {
        let mut stmt = conn.prepare(sql).unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap();
        rows.collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn test_create_schema_is_current() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();

        for (table, column, _) in ADDED_COLUMNS {
            assert!(column_exists(&conn, table, column).unwrap());
        }
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);

        let report = migrate(&conn).unwrap();
        assert!(report.is_noop());
    }

    #[test]
    fn test_column_exists() {
        let conn = legacy_conn();
        assert!(column_exists(&conn, "tasks", "title").unwrap());
        assert!(!column_exists(&conn, "tasks", "description").unwrap());
        assert!(!column_exists(&conn, "missing_table", "id").unwrap());
    }

    #[test]
    fn test_migrate_adds_columns_and_backfills() {
        let conn = legacy_conn();
        let report = migrate(&conn).unwrap();

        assert_eq!(
            report.added_columns,
            vec!["lists.order_idx", "tasks.description", "tasks.order_idx"]
        );
        assert_eq!(report.backfilled_lists, 2);
        assert_eq!(report.backfilled_tasks, 4);

        assert_eq!(
            orders(&conn, "SELECT id, order_idx FROM lists ORDER BY rowid"),
            vec![("10".to_string(), 1), ("11".to_string(), 2)]
        );
        // Numbered per list, in row order
        assert_eq!(
            orders(&conn, "SELECT id, order_idx FROM tasks ORDER BY rowid"),
            vec![
                ("20".to_string(), 1),
                ("21".to_string(), 1),
                ("22".to_string(), 2),
                ("23".to_string(), 3),
            ]
        );

        let settings: String = conn
            .query_row("SELECT value FROM settings WHERE key = 'themeColor'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(settings, "purple");
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = legacy_conn();
        migrate(&conn).unwrap();
        let lists = orders(&conn, "SELECT id, order_idx FROM lists ORDER BY rowid");
        let tasks = orders(&conn, "SELECT id, order_idx FROM tasks ORDER BY rowid");

        let second = migrate(&conn).unwrap();
        assert!(second.is_noop());
        assert_eq!(orders(&conn, "SELECT id, order_idx FROM lists ORDER BY rowid"), lists);
        assert_eq!(orders(&conn, "SELECT id, order_idx FROM tasks ORDER BY rowid"), tasks);
    }

    #[test]
    fn test_backfill_appends_after_existing_orders() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO lists VALUES ('1', 'A', '', '2024-01-01T00:00:00.000Z', 3);
             INSERT INTO lists VALUES ('2', 'B', '', '2024-01-01T00:00:00.000Z', 0);",
        )
        .unwrap();

        let report = migrate(&conn).unwrap();
        assert_eq!(report.backfilled_lists, 1);
        assert_eq!(
            orders(&conn, "SELECT id, order_idx FROM lists ORDER BY rowid"),
            vec![("1".to_string(), 3), ("2".to_string(), 4)]
        );
    }
}
