use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::caller::NetworkCaller;
use crate::clock::{Clock, SystemClock};
use crate::error::AttemptError;
use crate::options::InjectorOptions;
use crate::schedule::{Decision, Schedule, ScheduleSnapshot};

#[derive(Debug)]
pub enum InjectorRequest {
    Decide {
        reply: oneshot::Sender<Decision>,
    },
    Preview {
        reply: oneshot::Sender<Decision>,
    },
    Snapshot {
        reply: oneshot::Sender<ScheduleSnapshot>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// A cloneable injector whose decisions are serialized through one task.
///
/// Each clone sends its decide request to the service loop that owns the
/// [`Schedule`], then makes the network call itself. Concurrent attempts never
/// overrun the budget, and pass-through requests run in parallel.
pub struct SharedInjector<C> {
    tx: mpsc::UnboundedSender<InjectorRequest>,
    caller: Arc<C>,
    url: Arc<str>,
}

impl<C> Clone for SharedInjector<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            caller: Arc::clone(&self.caller),
            url: Arc::clone(&self.url),
        }
    }
}

impl<C> std::fmt::Debug for SharedInjector<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedInjector")
            .field("url", &self.url)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<C: NetworkCaller + 'static> SharedInjector<C> {
    /// Spawn the service loop on the current tokio runtime.
    pub fn spawn(options: InjectorOptions, caller: C) -> Self {
        Self::spawn_with_clock(options, caller, SystemClock)
    }

    pub fn spawn_with_clock<K: Clock + 'static>(
        options: InjectorOptions,
        caller: C,
        clock: K,
    ) -> Self {
        let config = options.resolve(clock.now());
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(super::service::run(rx, Schedule::new(&config), clock));
        Self {
            tx,
            caller: Arc::new(caller),
            url: Arc::from(config.url),
        }
    }

    async fn round_trip<T, F>(&self, build_request: F) -> Result<T, AttemptError<C::Error>>
    where
        F: FnOnce(oneshot::Sender<T>) -> InjectorRequest,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build_request(reply_tx))
            .map_err(|_| AttemptError::Closed)?;
        reply_rx.await.map_err(|_| AttemptError::Closed)
    }

    /// Same contract as [`FaultInjector::attempt`](crate::FaultInjector::attempt).
    pub async fn attempt(&self) -> Result<Value, AttemptError<C::Error>> {
        match self.round_trip(|reply| InjectorRequest::Decide { reply }).await? {
            Decision::Fail(failure) => Err(failure.into()),
            Decision::PassThrough(_) => self
                .caller
                .fetch_json(&self.url)
                .await
                .map_err(AttemptError::Transport),
        }
    }

    pub async fn preview(&self) -> Result<Decision, AttemptError<C::Error>> {
        self.round_trip(|reply| InjectorRequest::Preview { reply }).await
    }

    pub async fn snapshot(&self) -> Result<ScheduleSnapshot, AttemptError<C::Error>> {
        self.round_trip(|reply| InjectorRequest::Snapshot { reply }).await
    }

    /// Stop the service loop. Later attempts on any clone return
    /// [`AttemptError::Closed`].
    pub async fn shutdown(&self) -> Result<(), AttemptError<C::Error>> {
        self.round_trip(|reply| InjectorRequest::Shutdown { reply }).await
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
