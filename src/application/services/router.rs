use crate::domain::entities::alert::{AlertDetail, AlertEvent, ChannelEvent};
use crate::domain::ports::channel::{AlertChannel, ChannelError};
use crate::domain::value_objects::alert_level::{AlertLevel, LevelSet};

#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    /// Levels the router accepts at all.
    pub supported: LevelSet,
    /// When false, the first channel error stops the fan-out.
    pub isolate_channel_failures: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            supported: LevelSet::all(),
            isolate_channel_failures: false,
        }
    }
}

struct Registration {
    name: String,
    channel: Box<dyn AlertChannel>,
    monitored: LevelSet,
}

/// Fans alert events out to named channels, in registration order.
///
/// Filtering happens in two stages: the event level must be supported by the
/// router, then monitored by the channel. Filtered events are silently
/// dropped.
pub struct AlertRouter {
    options: RouterOptions,
    registrations: Vec<Registration>,
}

impl AlertRouter {
    #[must_use]
    pub const fn new(options: RouterOptions) -> Self {
        Self {
            options,
            registrations: Vec::new(),
        }
    }

    /// Register `channel` under `name`, monitoring its default levels.
    ///
    /// Registering an existing name replaces that channel in place.
    pub fn register(&mut self, name: impl Into<String>, channel: Box<dyn AlertChannel>) {
        let name = name.into();
        let monitored = channel.default_levels().intersection(self.options.supported);
        tracing::debug!("Registering {} channel `{name}` for {monitored}", channel.kind());

        let registration = Registration {
            name,
            channel,
            monitored,
        };
        if let Some(existing) = self
            .registrations
            .iter_mut()
            .find(|r| r.name == registration.name)
        {
            *existing = registration;
        } else {
            self.registrations.push(registration);
        }
    }

    /// Replace a channel's monitored levels with `levels ∩ supported`.
    ///
    /// Unknown channel names are ignored.
    pub fn set_monitored_levels(&mut self, name: &str, levels: LevelSet) {
        let supported = self.options.supported;
        if let Some(registration) = self.registrations.iter_mut().find(|r| r.name == name) {
            registration.monitored = levels.intersection(supported);
        }
    }

    #[must_use]
    pub fn monitored_levels(&self, name: &str) -> Option<LevelSet> {
        self.registrations
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.monitored)
    }

    #[must_use]
    pub const fn supported_levels(&self) -> LevelSet {
        self.options.supported
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.registrations.iter().map(|r| r.name.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Deliver `event` to every channel monitoring its level.
    ///
    /// Returns how many channels received the event.
    ///
    /// # Errors
    ///
    /// Returns the first `ChannelError`. Without channel isolation, channels
    /// registered after the failing one are not attempted.
    pub fn dispatch(&self, event: &AlertEvent) -> Result<usize, ChannelError> {
        if !self.options.supported.contains(event.level) {
            return Ok(0);
        }

        let detail = event.detail.as_ref().map(|d| d.to_wire());
        tracing::debug!(
            "Sending alert -> {} :: {} :: {}",
            event.level,
            event.title,
            detail.as_deref().unwrap_or("")
        );

        let wire = ChannelEvent {
            source: &event.source,
            level: event.level,
            title: &event.title,
            detail: detail.as_deref(),
        };

        let mut delivered = 0;
        let mut first_error = None;
        for registration in &self.registrations {
            if !registration.monitored.contains(event.level) {
                continue;
            }
            match registration.channel.deliver(&wire) {
                Ok(_) => delivered += 1,
                Err(e) if self.options.isolate_channel_failures => {
                    tracing::warn!("Alert delivery via `{}` failed: {e}", registration.name);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
        first_error.map_or(Ok(delivered), Err)
    }

    /// Convenience wrapper building the event in place.
    ///
    /// # Errors
    ///
    /// See [`AlertRouter::dispatch`].
    pub fn send(
        &self,
        source: &str,
        level: AlertLevel,
        title: &str,
        detail: Option<AlertDetail>,
    ) -> Result<usize, ChannelError> {
        self.dispatch(&AlertEvent::new(source, level, title, detail))
    }
}

impl Default for AlertRouter {
    fn default() -> Self {
        Self::new(RouterOptions::default())
    }
}
