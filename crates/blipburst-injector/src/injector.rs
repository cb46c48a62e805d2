use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::caller::NetworkCaller;
use crate::clock::{Clock, SystemClock};
use crate::error::{AttemptError, FailureMode};
use crate::options::{InjectorConfig, InjectorOptions};
use crate::schedule::{Decision, Schedule, ScheduleSnapshot, ScheduleState};

/// Wraps a [`NetworkCaller`] and fails some of its calls on purpose.
///
/// Inside the configured window the injector raises simulated failures
/// according to its [`Schedule`]; every other attempt goes to the caller and
/// returns its decoded payload.
///
/// `attempt` takes `&mut self`, so one instance is driven sequentially. Use
/// [`SharedInjector`](crate::SharedInjector) when several tasks share one
/// budget.
pub struct FaultInjector<C, K = SystemClock> {
    schedule: Schedule,
    url: String,
    caller: C,
    clock: K,
}

impl<C: NetworkCaller> FaultInjector<C, SystemClock> {
    pub fn new(options: InjectorOptions, caller: C) -> Self {
        Self::with_clock(options, caller, SystemClock)
    }
}

impl<C: NetworkCaller, K: Clock> FaultInjector<C, K> {
    pub fn with_clock(options: InjectorOptions, caller: C, clock: K) -> Self {
        let config = options.resolve(clock.now());
        Self::from_config(config, caller, clock)
    }

    /// Build from an already resolved snapshot; `clock` is only read on attempts.
    pub fn from_config(config: InjectorConfig, caller: C, clock: K) -> Self {
        tracing::debug!(
            target: "blipburst_injector",
            start = %config.start,
            end = %config.end,
            frequency = config.frequency,
            total = config.total,
            url = %config.url,
            "injector configured"
        );
        Self {
            schedule: Schedule::new(&config),
            url: config.url,
            caller,
            clock,
        }
    }

    /// Either fail on purpose or fetch the target URL.
    ///
    /// A simulated failure replaces the network call entirely. Errors from the
    /// caller come back as [`AttemptError::Transport`] unchanged.
    pub async fn attempt(&mut self) -> Result<Value, AttemptError<C::Error>> {
        let now = self.clock.now();
        match self.schedule.decide(now) {
            Decision::Fail(failure) => {
                tracing::info!(
                    target: "blipburst_injector",
                    mode = %failure.mode,
                    errors_emitted = self.schedule.errors_emitted(),
                    "raising simulated failure"
                );
                Err(failure.into())
            }
            Decision::PassThrough(reason) => {
                tracing::debug!(
                    target: "blipburst_injector",
                    reason = %reason,
                    url = %self.url,
                    "passing through"
                );
                self.caller
                    .fetch_json(&self.url)
                    .await
                    .map_err(AttemptError::Transport)
            }
        }
    }

    /// The decision the next attempt would take right now, without recording it.
    pub fn preview(&self) -> Decision {
        self.schedule.peek(self.clock.now())
    }

    pub fn is_in_window(&self) -> bool {
        self.schedule.in_window(self.clock.now())
    }

    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        self.schedule.window()
    }

    pub fn mode(&self) -> FailureMode {
        self.schedule.mode()
    }

    pub fn state(&self) -> ScheduleState {
        self.schedule.state()
    }

    pub fn errors_emitted(&self) -> u32 {
        self.schedule.errors_emitted()
    }

    pub fn last_error_at(&self) -> Option<DateTime<Utc>> {
        self.schedule.last_error_at()
    }

    pub fn snapshot(&self) -> ScheduleSnapshot {
        self.schedule.snapshot()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn caller(&self) -> &C {
        &self.caller
    }
}
