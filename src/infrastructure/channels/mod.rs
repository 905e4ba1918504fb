pub mod datastore;
pub mod webhook;

use std::time::Duration;

use crate::application::config::AppConfig;
use crate::application::services::retry::{RetryPolicy, RetryingChannel};
use crate::application::services::router::{AlertRouter, RouterOptions};
use crate::domain::ports::channel::{AlertChannel, ChannelError};
use crate::domain::value_objects::alert_level::LevelSet;
use crate::infrastructure::persistence::SqliteConnector;

pub use datastore::DataStoreChannel;
pub use webhook::WebhookChannel;

pub const DATASTORE_CHANNEL: &str = "datastore";
pub const WEBHOOK_CHANNEL: &str = "webhook";

fn delivery_policy(config: &AppConfig) -> RetryPolicy<ChannelError> {
    RetryPolicy::from_config(&config.settings.retry).on_retry(|e, remaining, delay| {
        tracing::warn!(
            "Alert delivery failed ({e}), {} attempts left, retrying in {delay:?}",
            remaining - 1
        );
    })
}

fn maybe_retrying<C: AlertChannel + 'static>(
    channel: C,
    config: &AppConfig,
) -> Box<dyn AlertChannel> {
    if config.settings.retry.retry_deliveries {
        Box::new(RetryingChannel::new(channel, delivery_policy(config)))
    } else {
        Box::new(channel)
    }
}

fn register(
    router: &mut AlertRouter,
    name: &str,
    channel: Box<dyn AlertChannel>,
    levels: Option<LevelSet>,
) {
    router.register(name, channel);
    if let Some(levels) = levels {
        router.set_monitored_levels(name, levels);
    }
}

/// Build the alert router for the configured environment.
///
/// Channels are registered in a fixed order, datastore first, so that a
/// webhook outage never keeps a row out of the database.
///
/// # Errors
///
/// Returns `ChannelError::Connection` if the webhook HTTP client cannot be
/// built.
pub fn create_alert_router(config: &AppConfig) -> Result<AlertRouter, ChannelError> {
    let settings = &config.settings;
    let mut router = AlertRouter::new(RouterOptions {
        supported: LevelSet::all(),
        isolate_channel_failures: settings.isolate_channel_failures,
    });

    match settings.datastore {
        Some(ref ds) => {
            let channel = DataStoreChannel::new(
                Box::new(SqliteConnector::new(&ds.path)),
                ds.table.clone(),
                config.env_name.clone(),
            );
            register(
                &mut router,
                DATASTORE_CHANNEL,
                maybe_retrying(channel, config),
                ds.monitored_levels,
            );
        }
        None => tracing::warn!(
            "No datastore configured for `{}`, database alerts disabled",
            config.env_name
        ),
    }

    match settings.webhook {
        Some(ref wh) => {
            let channel = WebhookChannel::new(
                wh.endpoint.clone(),
                wh.username.clone(),
                config.env_name.clone(),
                Duration::from_secs(wh.timeout_secs),
            )?;
            register(
                &mut router,
                WEBHOOK_CHANNEL,
                maybe_retrying(channel, config),
                wh.monitored_levels,
            );
        }
        None => tracing::warn!(
            "No webhook configured for `{}`, chat alerts disabled",
            config.env_name
        ),
    }

    Ok(router)
}
