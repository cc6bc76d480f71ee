use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::PostlineError;
use crate::schema::{CREATE_SCHEMA_SQL, SCHEMA_VERSION};

/// Shared connection pool over the SQLite store. Cheap to clone; all clones
/// hand out connections from the same pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    pub fn connect(db_path: &Path) -> Result<Self, PostlineError> {
        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")
        });

        let pool = Pool::builder()
            .build(manager)
            .map_err(|e| PostlineError::Error(format!("Connection pool error: {e}")))?;

        let db = Database { pool };
        db.ensure_schema()?;

        Ok(db)
    }

    pub fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, PostlineError> {
        self.pool
            .get()
            .map_err(|e| PostlineError::Error(format!("Connection pool error: {e}")))
    }

    pub fn schema_version(&self) -> Result<String, PostlineError> {
        let conn = self.conn()?;
        let version: String = conn.query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    fn ensure_schema(&self) -> Result<(), PostlineError> {
        let conn = self.conn()?;

        let table_exists: bool = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='meta'",
                [],
                |row| row.get::<_, i32>(0),
            )
            .map(|count| count > 0)
            .unwrap_or(false);

        if !table_exists {
            conn.execute_batch(CREATE_SCHEMA_SQL)?;
            return Ok(());
        }

        let stored_version: String = conn.query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;

        match stored_version.as_str() {
            SCHEMA_VERSION => Ok(()),
            other => Err(PostlineError::Error(format!(
                "Schema version mismatch: database has '{other}', expected '{SCHEMA_VERSION}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::connect(&dir.path().join("postline.db")).unwrap();
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_reconnect_accepts_current_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postline.db");
        drop(Database::connect(&path).unwrap());
        assert!(Database::connect(&path).is_ok());
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postline.db");
        {
            let db = Database::connect(&path).unwrap();
            let conn = db.conn().unwrap();
            conn.execute("UPDATE meta SET value = '999' WHERE key = 'schema_version'", [])
                .unwrap();
        }
        assert!(Database::connect(&path).is_err());
    }
}
