use rusqlite::Connection;

/// Hands out database connections for the relational alert sink.
///
/// Every call returns a new connection; callers drop it as soon as the
/// statement is committed.
pub trait ConnectionProvider: Send + Sync {
    /// Open a fresh connection.
    ///
    /// # Errors
    ///
    /// Returns `rusqlite::Error` if the database cannot be opened.
    fn connect(&self) -> Result<Connection, rusqlite::Error>;

    /// Human-readable target, for logs.
    fn describe(&self) -> String;
}
