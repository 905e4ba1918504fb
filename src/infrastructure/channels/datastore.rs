use rusqlite::params;

use crate::domain::entities::alert::ChannelEvent;
use crate::domain::ports::channel::{AlertChannel, ChannelError};
use crate::domain::ports::connection::ConnectionProvider;
use crate::domain::value_objects::alert_level::LevelSet;

/// Writes one row per alert into a relational table.
///
/// A connection is opened for every delivery and dropped right after the
/// commit, so a long job never writes through a connection that idled out.
/// Errors are returned as-is; this channel never retries.
pub struct DataStoreChannel {
    connector: Box<dyn ConnectionProvider>,
    table: String,
    env_name: String,
}

impl DataStoreChannel {
    /// `table` must be a validated identifier; it is spliced into the SQL.
    pub fn new(
        connector: Box<dyn ConnectionProvider>,
        table: impl Into<String>,
        env_name: impl Into<String>,
    ) -> Self {
        Self {
            connector,
            table: table.into(),
            env_name: env_name.into(),
        }
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (source, err_date, status, err_msg, err_additional, env) \
             VALUES (?1, CURRENT_TIMESTAMP, ?2, ?3, ?4, ?5)",
            self.table
        )
    }
}

impl AlertChannel for DataStoreChannel {
    fn kind(&self) -> &'static str {
        "datastore"
    }

    fn default_levels(&self) -> LevelSet {
        LevelSet::all()
    }

    fn deliver(&self, event: &ChannelEvent<'_>) -> Result<u64, ChannelError> {
        let mut conn = self.connector.connect()?;
        tracing::debug!(
            "Inserting {} alert into {} ({})",
            event.level,
            self.table,
            self.connector.describe()
        );

        let tx = conn.transaction()?;
        let rows = tx.execute(
            &self.insert_sql(),
            params![
                event.source,
                event.level.code(),
                event.title,
                event.detail,
                self.env_name,
            ],
        )?;
        tx.commit()?;
        Ok(rows as u64)
    }
}
