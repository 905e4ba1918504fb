pub mod connector;
pub mod migrations;

pub use connector::SqliteConnector;
pub use migrations::initialize_alert_table;
