use colored::Colorize;

use crate::application::services::router::AlertRouter;
use crate::domain::value_objects::alert_level::{AlertLevel, LevelSet};

fn colorize_level(level: AlertLevel) -> String {
    match level {
        AlertLevel::Success => level.as_str().green().to_string(),
        AlertLevel::Warning => level.as_str().yellow().to_string(),
        AlertLevel::Failure => level.as_str().red().bold().to_string(),
    }
}

/// One row of the channel listing.
#[must_use]
pub fn format_channel(name: &str, levels: LevelSet) -> String {
    let rendered = if levels.is_empty() {
        "(muted)".dimmed().to_string()
    } else {
        levels
            .iter()
            .map(colorize_level)
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{:<12} {rendered}", name.bold())
}

/// Print every registered channel in dispatch order with the levels it
/// delivers.
pub fn run_channels(router: &AlertRouter, env_name: &str) {
    println!("{}", format!("cronguard — channels ({env_name})").bold().cyan());
    println!("{}", "━".repeat(40));

    if router.is_empty() {
        println!("  {}", "No channel configured".dimmed());
        return;
    }

    for name in router.channel_names() {
        let levels = router.monitored_levels(name).unwrap_or_default();
        println!("  {}", format_channel(name, levels));
    }
}
