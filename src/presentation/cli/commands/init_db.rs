use anyhow::Context;
use colored::Colorize;

use crate::application::config::AppConfig;
use crate::domain::ports::connection::ConnectionProvider;
use crate::infrastructure::persistence::{initialize_alert_table, SqliteConnector};

/// Create the database file and alert table for the selected environment.
///
/// # Errors
///
/// Returns an error if the environment has no datastore section, or the
/// database cannot be opened or migrated.
pub fn run_init_db(config: &AppConfig) -> anyhow::Result<()> {
    let Some(ref datastore) = config.settings.datastore else {
        anyhow::bail!(
            "Environment `{}` has no [{}.datastore] section",
            config.env_name,
            config.env_name
        );
    };

    let connector = SqliteConnector::new(&datastore.path).creating();
    let conn = connector
        .connect()
        .with_context(|| format!("Failed to open database {}", connector.describe()))?;
    initialize_alert_table(&conn, &datastore.table)
        .with_context(|| format!("Failed to create table `{}`", datastore.table))?;

    println!(
        "{} Table {} ready in {}",
        "✓".green().bold(),
        datastore.table.bold(),
        connector.describe()
    );
    Ok(())
}
