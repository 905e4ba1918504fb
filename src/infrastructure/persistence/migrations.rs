use rusqlite::Connection;

/// Create the alert table if it doesn't exist.
///
/// `table` must already be a validated identifier.
///
/// # Errors
/// Returns `rusqlite::Error` if the statement fails.
pub fn initialize_alert_table(conn: &Connection, table: &str) -> Result<(), rusqlite::Error> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            source          TEXT    NOT NULL,
            err_date        TEXT    NOT NULL DEFAULT CURRENT_TIMESTAMP,
            status          INTEGER NOT NULL CHECK (status IN (0, 1, 2)),
            err_msg         TEXT    NOT NULL,
            err_additional  TEXT,
            env             TEXT    NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{table}_err_date ON {table}(err_date);"
    ))
}
