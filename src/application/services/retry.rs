use std::time::Duration;

use crate::application::config::RetryConfig;
use crate::domain::entities::alert::ChannelEvent;
use crate::domain::ports::channel::{AlertChannel, ChannelError};
use crate::domain::value_objects::alert_level::LevelSet;

type Matcher<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;
type RetryCallback<E> = Box<dyn Fn(&E, u32, Duration) + Send + Sync>;
type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

/// Longest single wait between attempts; longer schedules are clamped.
pub const MAX_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Seconds to a delay, clamped to `[0, MAX_DELAY]`. NaN counts as zero.
fn clamped_delay(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).map_or(MAX_DELAY, |d| d.min(MAX_DELAY))
}

/// Bounded re-execution of a fallible operation with a growing delay.
///
/// Each matching failure sleeps for the current delay, then the delay is
/// multiplied by `backoff`. This also happens after the last attempt, so a
/// fully exhausted run of `tries = 3, delay = 1s, backoff = 2` sleeps
/// 1s, 2s and 4s before returning the last error. The `on_retry` callback
/// only fires when another attempt follows, receiving the error, the
/// attempts left before the decrement, and the delay about to be slept.
///
/// Errors the matcher rejects are returned immediately, without sleeping.
pub struct RetryPolicy<E> {
    tries: u32,
    delay: Duration,
    backoff: f64,
    matcher: Matcher<E>,
    on_retry: Option<RetryCallback<E>>,
    sleeper: Sleeper,
}

impl<E> RetryPolicy<E> {
    /// Retry only errors for which `matcher` returns true.
    pub fn new(matcher: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        Self {
            tries: 3,
            delay: Duration::from_secs(5),
            backoff: 2.0,
            matcher: Box::new(matcher),
            on_retry: None,
            sleeper: Box::new(std::thread::sleep),
        }
    }

    /// Retry every error.
    #[must_use]
    pub fn any() -> Self {
        Self::new(|_| true)
    }

    /// Retry every error on the configured schedule.
    #[must_use]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::from_config_matching(config, |_| true)
    }

    /// Retry errors accepted by `matcher` on the configured schedule.
    pub fn from_config_matching(
        config: &RetryConfig,
        matcher: impl Fn(&E) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(matcher)
            .tries(config.tries)
            .delay(clamped_delay(config.delay_secs))
            .backoff(config.backoff)
    }

    /// Total attempts, at least one.
    #[must_use]
    pub fn tries(mut self, tries: u32) -> Self {
        self.tries = tries.max(1);
        self
    }

    /// Initial delay, at most [`MAX_DELAY`].
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay.min(MAX_DELAY);
        self
    }

    #[must_use]
    pub fn backoff(mut self, backoff: f64) -> Self {
        self.backoff = if backoff.is_finite() && backoff >= 0.0 {
            backoff
        } else {
            1.0
        };
        self
    }

    #[must_use]
    pub fn on_retry(mut self, callback: impl Fn(&E, u32, Duration) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Box::new(callback));
        self
    }

    /// Replace the blocking sleep, mainly for tests.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Run `op` until it succeeds, fails with a non-matching error, or the
    /// attempts are used up.
    ///
    /// # Errors
    ///
    /// Returns the first non-matching error, or the last matching error once
    /// every attempt has failed. Errors are never wrapped.
    pub fn call<T>(&self, mut op: impl FnMut() -> Result<T, E>) -> Result<T, E> {
        let mut remaining = self.tries;
        let mut next_delay = self.delay;

        loop {
            let err = match op() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !(self.matcher)(&err) {
                return Err(err);
            }

            if remaining > 1 {
                if let Some(ref callback) = self.on_retry {
                    callback(&err, remaining, next_delay);
                }
            }

            tracing::debug!(
                "Attempt {}/{} failed, sleeping {:?}",
                self.tries - remaining + 1,
                self.tries,
                next_delay
            );
            (self.sleeper)(next_delay);
            remaining -= 1;
            next_delay = clamped_delay(next_delay.as_secs_f64() * self.backoff);

            if remaining == 0 {
                return Err(err);
            }
        }
    }
}

/// Channel decorator that retries every delivery of the wrapped channel.
pub struct RetryingChannel<C> {
    inner: C,
    policy: RetryPolicy<ChannelError>,
}

impl<C: AlertChannel> RetryingChannel<C> {
    pub fn new(inner: C, policy: RetryPolicy<ChannelError>) -> Self {
        Self { inner, policy }
    }
}

impl<C: AlertChannel> AlertChannel for RetryingChannel<C> {
    fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    fn default_levels(&self) -> LevelSet {
        self.inner.default_levels()
    }

    fn deliver(&self, event: &ChannelEvent<'_>) -> Result<u64, ChannelError> {
        self.policy.call(|| self.inner.deliver(event))
    }
}
