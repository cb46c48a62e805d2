use tokio::sync::mpsc;

use crate::clock::Clock;
use crate::schedule::{Decision, Schedule};

use super::handle::InjectorRequest;

/// Owns the schedule and answers requests one at a time.
///
/// Exits on [`InjectorRequest::Shutdown`] or once every handle is dropped.
pub async fn run<K: Clock>(
    mut rx: mpsc::UnboundedReceiver<InjectorRequest>,
    mut schedule: Schedule,
    clock: K,
) {
    tracing::info!(target: "blipburst_injector", mode = %schedule.mode(), "service loop started");

    while let Some(req) = rx.recv().await {
        match req {
            InjectorRequest::Decide { reply } => {
                // A cancelled attempt must not spend a failure nobody will see.
                if reply.is_closed() {
                    tracing::debug!(target: "blipburst_injector", "attempt cancelled before decision");
                    continue;
                }
                let before = schedule.clone();
                let decision = schedule.decide(clock.now());
                match &decision {
                    Decision::Fail(failure) => tracing::info!(
                        target: "blipburst_injector",
                        mode = %failure.mode,
                        errors_emitted = schedule.errors_emitted(),
                        "raising simulated failure"
                    ),
                    Decision::PassThrough(reason) => tracing::debug!(
                        target: "blipburst_injector",
                        reason = %reason,
                        "passing through"
                    ),
                }
                if let Err(Decision::Fail(failure)) = reply.send(decision) {
                    tracing::debug!(
                        target: "blipburst_injector",
                        mode = %failure.mode,
                        "attempt cancelled after decision, failure returned to budget"
                    );
                    schedule = before;
                }
            }
            InjectorRequest::Preview { reply } => {
                let _ = reply.send(schedule.peek(clock.now()));
            }
            InjectorRequest::Snapshot { reply } => {
                let _ = reply.send(schedule.snapshot());
            }
            InjectorRequest::Shutdown { reply } => {
                tracing::info!(target: "blipburst_injector", "Shutdown - exiting service loop");
                let _ = reply.send(());
                break;
            }
        }
    }

    tracing::info!(
        target: "blipburst_injector",
        errors_emitted = schedule.errors_emitted(),
        "service loop exited"
    );
}
