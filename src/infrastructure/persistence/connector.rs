use std::path::PathBuf;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};

use crate::domain::ports::connection::ConnectionProvider;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the `SQLite` alert database on demand.
///
/// The file must already exist (see `init-db`); opening never creates it, so
/// a wrong path surfaces as a delivery error instead of an empty database.
pub struct SqliteConnector {
    path: PathBuf,
    create: bool,
}

impl SqliteConnector {
    /// Expands `~` in `path`.
    #[must_use]
    pub fn new(path: &str) -> Self {
        let expanded = shellexpand::tilde(path);
        Self {
            path: PathBuf::from(expanded.as_ref()),
            create: false,
        }
    }

    /// Allow the database file (and its parent directories) to be created.
    #[must_use]
    pub const fn creating(mut self) -> Self {
        self.create = true;
        self
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ConnectionProvider for SqliteConnector {
    fn connect(&self) -> Result<Connection, rusqlite::Error> {
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.create {
            if let Some(parent) = self.path.parent() {
                // Open still fails afterwards; this keeps the io reason.
                if let Err(e) = std::fs::create_dir_all(parent) {
                    tracing::debug!("Cannot create {}: {e}", parent.display());
                }
            }
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }
        let conn = Connection::open_with_flags(&self.path, flags)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
