use anyhow::Context;
use colored::Colorize;

use crate::application::services::router::AlertRouter;
use crate::domain::entities::alert::AlertDetail;
use crate::domain::value_objects::alert_level::AlertLevel;

/// Dispatch a single ad hoc alert.
///
/// A `detail` that parses as a JSON object is sent as structured data,
/// anything else as plain text.
///
/// # Errors
///
/// Returns an error if a channel fails to deliver the alert.
pub fn run_alert(
    router: &AlertRouter,
    source: &str,
    level: AlertLevel,
    title: &str,
    detail: Option<&str>,
) -> anyhow::Result<usize> {
    if router.is_empty() {
        tracing::warn!("No alert channel configured, nothing will be sent");
    }

    let delivered = router
        .send(source, level, title, detail.map(AlertDetail::parse))
        .with_context(|| format!("Failed to deliver {level} alert `{title}`"))?;

    println!(
        "{} {} alert delivered to {delivered} channel(s)",
        "✓".green().bold(),
        level
    );
    Ok(delivered)
}
