//! Database Connection and Setup
//!
//! The live SQLite database runs on a private scratch file. After every
//! committed change the whole file is the database image, which is written
//! through to `LocalStorage` under `DB_KEY`.

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, Row};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use super::local_storage::LocalStorage;
use super::migrations;
use crate::domain::{DomainError, DomainResult};

/// Storage key of the serialized database image
pub const DB_KEY: &str = "taskDb";

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(ErrorCode::NotADatabase) | Some(ErrorCode::DatabaseCorrupt) => {
                DomainError::CorruptImage(e.to_string())
            }
            _ => DomainError::Storage(e.to_string()),
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

/// Current time in the stored timestamp format (`2024-05-01T10:00:00.000Z`)
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Read a stored timestamp column
pub(crate) fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// An open database plus the scratch file it lives in
pub struct Database {
    conn: Connection,
    image: NamedTempFile,
    last_id: i64,
}

impl Database {
    /// Fresh database with the current schema
    pub fn create() -> DomainResult<Self> {
        let db = Self::open_on(NamedTempFile::new()?)?;
        migrations::create_schema(&db.conn)?;
        Ok(db)
    }

    /// Database restored from a saved image, migrated to the current schema
    pub fn from_image(bytes: &[u8]) -> DomainResult<Self> {
        let mut image = NamedTempFile::new()?;
        image.write_all(bytes)?;
        image.flush()?;

        let mut db = Self::open_on(image)?;
        let report = migrations::migrate(&db.conn)?;
        if !report.is_noop() {
            info!("Migrated database image: {:?}", report);
        }
        db.last_id = max_numeric_id(&db.conn)?;
        Ok(db)
    }

    fn open_on(image: NamedTempFile) -> DomainResult<Self> {
        let conn = Connection::open(image.path())?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            image,
            last_id: 0,
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Millisecond-clock id, strictly increasing within this database
    pub fn next_id(&mut self) -> DomainResult<String> {
        let after_last = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| DomainError::Internal("Id sequence exhausted".to_string()))?;
        let id = Utc::now().timestamp_millis().max(after_last);
        self.last_id = id;
        Ok(id.to_string())
    }

    /// Raw bytes of the database image
    pub fn export(&self) -> DomainResult<Vec<u8>> {
        Ok(std::fs::read(self.image.path())?)
    }

    /// Write the image through to storage
    pub fn flush(&self, storage: &dyn LocalStorage) -> DomainResult<()> {
        let bytes = self.export()?;
        let encoded =
            serde_json::to_string(&bytes).map_err(|e| DomainError::Internal(e.to_string()))?;
        storage.set_item(DB_KEY, &encoded)?;
        debug!("Flushed database image ({} bytes)", bytes.len());
        Ok(())
    }
}

/// Largest id that looks like one we issued. Foreign ids (non-digits, or
/// too long to fit an i64) never seed the sequence.
fn max_numeric_id(conn: &Connection) -> DomainResult<i64> {
    let max = conn.query_row(
        "SELECT COALESCE(MAX(CAST(id AS INTEGER)), 0)
         FROM (SELECT id FROM lists UNION ALL SELECT id FROM tasks)
         WHERE length(id) BETWEEN 1 AND 18 AND id NOT GLOB '*[^0-9]*'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(max)
}

/// Load the saved image (migrating it) or create a fresh database.
/// The result is persisted before returning.
pub fn init_db(storage: &dyn LocalStorage) -> DomainResult<Database> {
    let db = match storage.get_item(DB_KEY)? {
        Some(saved) => {
            let bytes: Vec<u8> = serde_json::from_str(&saved)
                .map_err(|e| DomainError::CorruptImage(format!("{} is not a byte array: {}", DB_KEY, e)))?;
            info!("Loading saved database image ({} bytes)", bytes.len());
            Database::from_image(&bytes)?
        }
        None => {
            info!("No saved database image, creating a new one");
            Database::create()?
        }
    };
    db.flush(storage)?;
    Ok(db)
}

/// Owned database handle shared by all repositories
pub struct DbState {
    db: Mutex<Option<Database>>,
    storage: Arc<dyn LocalStorage>,
}

impl DbState {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            db: Mutex::new(None),
            storage,
        }
    }

    pub fn storage(&self) -> &Arc<dyn LocalStorage> {
        &self.storage
    }

    pub async fn is_open(&self) -> bool {
        self.db.lock().await.is_some()
    }

    /// Open the database if it is not open yet
    pub async fn initialize(&self) -> DomainResult<()> {
        let mut guard = self.db.lock().await;
        Self::ensure_open(&mut guard, self.storage.as_ref())?;
        Ok(())
    }

    fn ensure_open<'a>(
        slot: &'a mut Option<Database>,
        storage: &dyn LocalStorage,
    ) -> DomainResult<&'a mut Database> {
        if slot.is_none() {
            *slot = Some(init_db(storage)?);
        }
        slot.as_mut()
            .ok_or_else(|| DomainError::Internal("Database not initialized".to_string()))
    }

    /// Run a read-only operation
    pub async fn read<R, F>(&self, op: F) -> DomainResult<R>
    where
        F: FnOnce(&Database) -> DomainResult<R> + Send,
        R: Send,
    {
        let mut guard = self.db.lock().await;
        let db = Self::ensure_open(&mut guard, self.storage.as_ref())?;
        op(db)
    }

    /// Run a mutating operation, then flush the image
    pub async fn write<R, F>(&self, op: F) -> DomainResult<R>
    where
        F: FnOnce(&mut Database) -> DomainResult<R> + Send,
        R: Send,
    {
        let mut guard = self.db.lock().await;
        let db = Self::ensure_open(&mut guard, self.storage.as_ref())?;
        let result = op(db)?;
        db.flush(self.storage.as_ref())?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStorage;

    #[test]
    fn test_ids_are_strictly_increasing() {
        let mut db = Database::create().unwrap();
        let ids: Vec<i64> = (0..50)
            .map(|_| db.next_id().unwrap().parse().unwrap())
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_fresh_database_is_flushed() {
        let storage = MemoryStorage::new();
        let db = init_db(&storage).unwrap();

        let saved = storage.get_item(DB_KEY).unwrap().unwrap();
        let bytes: Vec<u8> = serde_json::from_str(&saved).unwrap();
        assert_eq!(bytes, db.export().unwrap());
        assert!(bytes.starts_with(b"SQLite format 3\0"));
    }

    #[test]
    fn test_saved_image_restores_id_sequence() {
        let storage = MemoryStorage::new();
        let db = init_db(&storage).unwrap();
        let far_future = Utc::now().timestamp_millis() + 1_000_000;
        db.conn()
            .execute(
                "INSERT INTO lists (id, title, description, created_at, order_idx) VALUES (?1, 'L', '', ?2, 1)",
                rusqlite::params![far_future.to_string(), now_timestamp()],
            )
            .unwrap();
        db.flush(&storage).unwrap();
        drop(db);

        let mut reopened = init_db(&storage).unwrap();
        assert_eq!(reopened.next_id().unwrap(), (far_future + 1).to_string());
    }

    #[test]
    fn test_oversized_ids_do_not_seed_sequence() {
        let storage = MemoryStorage::new();
        let db = init_db(&storage).unwrap();
        for id in ["99999999999999999999", "12abc", "-5"] {
            db.conn()
                .execute(
                    "INSERT INTO lists (id, title, description, created_at, order_idx) VALUES (?1, 'Imported', '', ?2, 1)",
                    rusqlite::params![id, now_timestamp()],
                )
                .unwrap();
        }
        db.flush(&storage).unwrap();
        drop(db);

        let before = Utc::now().timestamp_millis();
        let mut reopened = init_db(&storage).unwrap();
        let first: i64 = reopened.next_id().unwrap().parse().unwrap();
        let second: i64 = reopened.next_id().unwrap().parse().unwrap();
        assert!(first >= before);
        assert!(second > first);
    }

    #[test]
    fn test_exhausted_sequence_is_an_error() {
        let mut db = Database::create().unwrap();
        db.last_id = i64::MAX;
        assert!(matches!(db.next_id(), Err(DomainError::Internal(_))));
        assert_eq!(db.last_id, i64::MAX);
    }

    #[test]
    fn test_rejects_non_array_image() {
        let storage = MemoryStorage::new();
        storage.set_item(DB_KEY, "{\"not\":\"bytes\"}").unwrap();
        assert!(matches!(init_db(&storage), Err(DomainError::CorruptImage(_))));
    }

    #[test]
    fn test_rejects_garbage_bytes() {
        let storage = MemoryStorage::new();
        let garbage: Vec<u8> = (0..200u8).map(|b| b.wrapping_mul(7)).collect();
        storage
            .set_item(DB_KEY, &serde_json::to_string(&garbage).unwrap())
            .unwrap();
        assert!(matches!(init_db(&storage), Err(DomainError::CorruptImage(_))));
    }

    #[test]
    fn test_timestamp_format() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2024-05-01T10:00:00.000Z".len());
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
