pub mod alert_level;

pub use alert_level::{AlertLevel, LevelSet};
