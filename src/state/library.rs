use rusqlite::{Connection, OptionalExtension, Result as SqlResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The ImageStore manages the SQLite record store of downloaded images.
///
/// Rows are `(image_path, image_size, image_hash)` and are only ever appended.
/// The table has no uniqueness constraint: callers check [`ImageStore::exists`]
/// before calling [`ImageStore::insert`].
///
/// One connection is held for the lifetime of the store and closed on drop.
pub struct ImageStore {
    conn: Connection,
    db_path: PathBuf,
}

impl ImageStore {
    /// Open (or create) the record store file at `db_path`.
    pub fn open(db_path: impl AsRef<Path>) -> SqlResult<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path)?;

        debug!("Opened image store at {}", db_path.display());

        Ok(ImageStore { conn, db_path })
    }

    /// Open a throwaway store that lives only in memory.
    #[cfg(test)]
    pub fn open_in_memory() -> SqlResult<Self> {
        Ok(ImageStore {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Create the Images table if it doesn't exist. Safe to call repeatedly.
    pub fn ensure_schema(&self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS Images (
                image_path      TEXT NOT NULL,
                image_size      TEXT NOT NULL,
                image_hash      TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// True if any row carries this fingerprint
    pub fn exists(&self, fingerprint: &str) -> SqlResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM Images WHERE image_hash = ?1 LIMIT 1",
                [fingerprint],
                |row| row.get(0),
            )
            .optional()?;

        Ok(found.is_some())
    }

    /// Path recorded for the first row with this fingerprint
    pub fn path_for(&self, fingerprint: &str) -> SqlResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT image_path FROM Images WHERE image_hash = ?1 ORDER BY rowid LIMIT 1",
                [fingerprint],
                |row| row.get(0),
            )
            .optional()
    }

    /// Append one row. No uniqueness check happens here.
    pub fn insert(&self, image_path: &str, image_size: u64, fingerprint: &str) -> SqlResult<()> {
        // image_size is TEXT in the schema
        self.conn.execute(
            "INSERT INTO Images (image_path, image_size, image_hash) VALUES (?1, ?2, ?3)",
            rusqlite::params![image_path, image_size.to_string(), fingerprint],
        )?;

        Ok(())
    }

    /// Get a count of recorded images
    pub fn image_count(&self) -> SqlResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM Images",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn store() -> ImageStore {
        let store = ImageStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let store = store();
        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();

        assert_eq!(store.image_count().unwrap(), 0);
    }

    #[test]
    fn test_exists_after_insert() {
        let store = store();
        assert!(!store.exists(HASH).unwrap());

        store.insert("/tmp/x/bar.jpg", 1234, HASH).unwrap();

        assert!(store.exists(HASH).unwrap());
        assert!(!store.exists("something-else").unwrap());
    }

    #[test]
    fn test_path_for_returns_first_recorded_path() {
        let store = store();
        assert_eq!(store.path_for(HASH).unwrap(), None);

        store.insert("/tmp/x/first.jpg", 4, HASH).unwrap();
        store.insert("/tmp/x/second.jpg", 4, HASH).unwrap();

        assert_eq!(store.path_for(HASH).unwrap().as_deref(), Some("/tmp/x/first.jpg"));
        assert_eq!(store.path_for("something-else").unwrap(), None);
    }

    #[test]
    fn test_exists_is_repeatable() {
        let store = store();
        store.insert("/tmp/x/bar.jpg", 1234, HASH).unwrap();

        for _ in 0..3 {
            assert!(store.exists(HASH).unwrap());
        }
        assert_eq!(store.image_count().unwrap(), 1);
    }

    #[test]
    fn test_insert_does_not_enforce_uniqueness() {
        let store = store();
        store.insert("/tmp/x/bar.jpg", 1234, HASH).unwrap();
        store.insert("/tmp/x/bar.jpg", 1234, HASH).unwrap();

        assert_eq!(store.image_count().unwrap(), 2);
    }

    #[test]
    fn test_size_is_stored_as_text() {
        let store = store();
        store.insert("/tmp/x/bar.jpg", 98765, HASH).unwrap();

        let (size, kind): (String, String) = store
            .conn
            .query_row(
                "SELECT image_size, typeof(image_size) FROM Images",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();

        assert_eq!(size, "98765");
        assert_eq!(kind, "text");
    }

    #[test]
    fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("apod_images.db");

        {
            let store = ImageStore::open(&db_path).unwrap();
            store.ensure_schema().unwrap();
            store.insert("/tmp/x/bar.jpg", 1, HASH).unwrap();
        }

        let store = ImageStore::open(&db_path).unwrap();
        store.ensure_schema().unwrap();
        assert_eq!(store.path(), db_path.as_path());
        assert!(store.exists(HASH).unwrap());
    }
}
