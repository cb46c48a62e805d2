//! The decision logic behind every attempt.
//!
//! A [`Schedule`] owns the window, the policy and the two counters. It does no
//! I/O: [`Schedule::decide`] is the only transition and callers act on the
//! returned [`Decision`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FailureMode, SimulatedFailure};
use crate::options::InjectorConfig;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Where a schedule stands within its mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ScheduleState {
    /// Burst mode, the single failure has not been raised yet.
    Armed,
    /// Burst mode, the single failure has been raised.
    Fired,
    /// Rate mode with failures left in the budget.
    BudgetAvailable { remaining: u32 },
    /// Rate mode with the budget spent.
    Exhausted,
}

/// Why an attempt goes to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    OutsideWindow,
    BurstSpent,
    BudgetExhausted,
    /// The minimum spacing since the last failure has not elapsed.
    Cooldown { remaining: Duration },
}

impl std::fmt::Display for PassReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassReason::OutsideWindow => write!(f, "outside error window"),
            PassReason::BurstSpent => write!(f, "burst already fired"),
            PassReason::BudgetExhausted => write!(f, "error budget exhausted"),
            PassReason::Cooldown { remaining } => {
                write!(f, "cooldown, {}ms remaining", remaining.num_milliseconds())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Fail(SimulatedFailure),
    PassThrough(PassReason),
}

impl Decision {
    pub fn is_failure(&self) -> bool {
        matches!(self, Decision::Fail(_))
    }
}

/// Point-in-time view of a schedule's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub mode: FailureMode,
    pub state: ScheduleState,
    pub errors_emitted: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Schedule {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    frequency: f64,
    total: i64,
    errors_emitted: u32,
    last_error_at: Option<DateTime<Utc>>,
}

impl Schedule {
    pub fn new(config: &InjectorConfig) -> Self {
        Self {
            start: config.start,
            end: config.end,
            frequency: config.frequency,
            total: config.total,
            errors_emitted: 0,
            last_error_at: None,
        }
    }

    /// Both bounds are inclusive. An inverted window is never active.
    pub fn in_window(&self, now: DateTime<Utc>) -> bool {
        now >= self.start && now <= self.end
    }

    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start, self.end)
    }

    pub fn mode(&self) -> FailureMode {
        if self.frequency == 0.0 {
            FailureMode::Burst
        } else {
            FailureMode::Rate
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn errors_emitted(&self) -> u32 {
        self.errors_emitted
    }

    /// `None` until the first rate-mode failure. Burst failures carry no
    /// timestamp.
    pub fn last_error_at(&self) -> Option<DateTime<Utc>> {
        self.last_error_at
    }

    /// Minimum spacing between rate-mode failures, in milliseconds.
    ///
    /// Negative for a negative frequency, NaN for a NaN one.
    pub fn interval_ms(&self) -> f64 {
        MS_PER_MINUTE / self.frequency
    }

    pub fn state(&self) -> ScheduleState {
        match self.mode() {
            FailureMode::Burst if self.errors_emitted == 0 => ScheduleState::Armed,
            FailureMode::Burst => ScheduleState::Fired,
            FailureMode::Rate if i64::from(self.errors_emitted) < self.total => {
                let remaining = self.total - i64::from(self.errors_emitted);
                ScheduleState::BudgetAvailable {
                    remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
                }
            }
            FailureMode::Rate => ScheduleState::Exhausted,
        }
    }

    pub fn snapshot(&self) -> ScheduleSnapshot {
        ScheduleSnapshot {
            mode: self.mode(),
            state: self.state(),
            errors_emitted: self.errors_emitted,
            last_error_at: self.last_error_at(),
        }
    }

    /// What [`decide`](Self::decide) would return at `now`, without
    /// recording anything.
    pub fn peek(&self, now: DateTime<Utc>) -> Decision {
        if !self.in_window(now) {
            return Decision::PassThrough(PassReason::OutsideWindow);
        }

        match self.state() {
            ScheduleState::Armed => Decision::Fail(SimulatedFailure::burst()),
            ScheduleState::Fired => Decision::PassThrough(PassReason::BurstSpent),
            ScheduleState::Exhausted => Decision::PassThrough(PassReason::BudgetExhausted),
            ScheduleState::BudgetAvailable { .. } => {
                let interval = self.interval_ms();
                // Never having failed counts as failing at the epoch.
                let last = self.last_error_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
                let elapsed = (now - last).num_milliseconds() as f64;
                if elapsed >= interval {
                    Decision::Fail(SimulatedFailure::rate())
                } else {
                    Decision::PassThrough(PassReason::Cooldown {
                        remaining: cooldown(interval - elapsed),
                    })
                }
            }
        }
    }

    /// Decide the attempt made at `now` and record it when it fails.
    pub fn decide(&mut self, now: DateTime<Utc>) -> Decision {
        let decision = self.peek(now);
        if let Decision::Fail(failure) = &decision {
            if failure.mode == FailureMode::Rate {
                self.last_error_at = Some(now);
            }
            self.errors_emitted += 1;
        }
        decision
    }
}

fn cooldown(remaining_ms: f64) -> Duration {
    // A NaN interval lands here too; `as` maps it to zero.
    let millis = remaining_ms.ceil() as i64;
    Duration::try_milliseconds(millis).unwrap_or(Duration::MAX)
}
