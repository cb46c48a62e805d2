use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Result};
use blipburst_injector::{AttemptError, Clock, FaultInjector, NetworkCaller};
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: u32,
    pub simulated: u32,
    pub transport: u32,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "summary: {} passed, {} simulated, {} transport",
            self.passed, self.simulated, self.transport
        )
    }
}

/// Drive `attempts` calls through `injector`, pausing `interval` between them,
/// and write one line per outcome to `out`.
pub async fn run_attempts<C, K, W>(
    injector: &mut FaultInjector<C, K>,
    attempts: u32,
    interval: Duration,
    out: &mut W,
) -> Result<RunSummary>
where
    C: NetworkCaller,
    K: Clock,
    W: Write,
{
    let mut summary = RunSummary::default();

    for attempt in 1..=attempts {
        let outcome = injector.attempt().await;
        record(&mut summary, attempt, outcome, out)?;

        if attempt < attempts && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }

    writeln!(out, "{summary}")?;
    Ok(summary)
}

/// Count one outcome and write its line. A closed injector ends the run.
fn record<E, W>(
    summary: &mut RunSummary,
    attempt: u32,
    outcome: Result<Value, AttemptError<E>>,
    out: &mut W,
) -> Result<()>
where
    E: std::error::Error + 'static,
    W: Write,
{
    match outcome {
        Ok(payload) => {
            summary.passed += 1;
            writeln!(out, "[{attempt}] {}", serde_json::to_string(&payload)?)?;
        }
        Err(AttemptError::Simulated(failure)) => {
            summary.simulated += 1;
            writeln!(out, "[{attempt}] {failure}")?;
        }
        Err(AttemptError::Transport(err)) => {
            summary.transport += 1;
            tracing::warn!(attempt, error = %err, "transport error");
            writeln!(out, "[{attempt}] transport error: {err}")?;
        }
        Err(AttemptError::Closed) => bail!("attempt {attempt}: injector closed"),
    }
    Ok(())
}
