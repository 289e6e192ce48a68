use rusqlite::Connection;
use std::cell::RefCell;

use crate::errors::DashError;

pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

// Thread-local connection slot, tagged with the path it was opened for.
thread_local! {
    static DB_CONN: RefCell<Option<(String, Connection)>> = RefCell::new(None);
}

#[derive(Debug, Clone)]
pub struct Database {
    path: String,
}

impl Database {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Provides a mutable connection to the closure.
    /// The slot is reopened when this thread last used a different file.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DashError>
    where
        F: FnOnce(&mut Connection) -> Result<T, DashError>,
    {
        DB_CONN
            .try_with(|cell| {
                let mut slot = cell.borrow_mut();
                let stale = match slot.as_ref() {
                    Some((path, _)) => path != &self.path,
                    None => true,
                };
                if stale {
                    let conn = Connection::open(&self.path)
                        .map_err(|e| DashError::Storage(format!("Open DB failed: {e}")))?;
                    *slot = Some((self.path.clone(), conn));
                }
                match slot.as_mut() {
                    Some((_, conn)) => f(conn),
                    None => Err(DashError::Storage("connection slot empty".into())),
                }
            })
            .map_err(|_| DashError::Storage("thread-local connection unavailable".into()))?
    }
}

/// Apply the embedded schema. Safe to run on every start.
pub fn init_db(db: &Database) -> Result<(), DashError> {
    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| DashError::Storage(format!("Failed to apply schema: {e}")))?;
        Ok(())
    })?;

    log::debug!("local storage ready at {}", db.path());
    Ok(())
}
