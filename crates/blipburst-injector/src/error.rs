use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BURST_MESSAGE: &str = "Error from moon - all at once";
pub const RATE_MESSAGE: &str = "Error from mars - frequency mode";

/// Which policy produced a simulated failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Zero frequency: a single failure on the first in-window attempt.
    Burst,
    /// Non-zero frequency: failures spaced by `60000 / frequency` ms.
    Rate,
}

impl std::fmt::Display for FailureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureMode::Burst => "burst",
            FailureMode::Rate => "rate",
        };
        write!(f, "{label}")
    }
}

/// A failure raised on purpose instead of making the network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("simulated {mode} failure: {message}")]
pub struct SimulatedFailure {
    pub mode: FailureMode,
    pub message: &'static str,
}

impl SimulatedFailure {
    pub fn burst() -> Self {
        Self {
            mode: FailureMode::Burst,
            message: BURST_MESSAGE,
        }
    }

    pub fn rate() -> Self {
        Self {
            mode: FailureMode::Rate,
            message: RATE_MESSAGE,
        }
    }
}

/// Outcome of a failed [`attempt`](crate::FaultInjector::attempt).
///
/// `E` is the network caller's own error type. Simulated and transport
/// failures never collapse into one another.
#[derive(Debug, Error)]
pub enum AttemptError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Simulated(#[from] SimulatedFailure),

    #[error(transparent)]
    Transport(E),

    /// The shared injector's decision loop is gone.
    #[error("injector service loop closed")]
    Closed,
}

impl<E> AttemptError<E>
where
    E: std::error::Error + 'static,
{
    pub fn is_simulated(&self) -> bool {
        matches!(self, AttemptError::Simulated(_))
    }

    pub fn simulated(&self) -> Option<&SimulatedFailure> {
        match self {
            AttemptError::Simulated(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn transport(&self) -> Option<&E> {
        match self {
            AttemptError::Transport(error) => Some(error),
            _ => None,
        }
    }

    pub fn into_transport(self) -> Option<E> {
        match self {
            AttemptError::Transport(error) => Some(error),
            _ => None,
        }
    }
}
