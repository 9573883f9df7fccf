//! # Wait Controller
//!
//! Bridges a [`Waiter`] to a [`Pipeline`]: registers it as a one-shot
//! listener, suspends until the first accepted occurrence, and revokes the
//! registration on every exit path.
//!
//! ```rust,ignore
//! let reply = EventWaiter::<Reply>::new()
//!     .wait_on(&pipeline)
//!     .wait_or(Duration::from_secs(30), default_reply)
//!     .await?;
//! ```
//!
//! # Exit Paths
//!
//! | path         | result                     |
//! |--------------|----------------------------|
//! | match        | `Ok(value)`                |
//! | timeout      | `Ok(default)`              |
//! | hard error   | `Err(WaitError)`           |
//! | cancellation | future dropped, no value   |
//!
//! The registration is revoked in all four. Cancellation revokes it while the
//! future is being dropped.

use crate::gate::{Gate, Settlement};
use interject_core::{
    BoxError, Listener, MatchOutcome, Occurrence, Pipeline, Propagation, RegistrationHandle,
    WaitError, Waiter,
};
use std::{
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::sync::oneshot;
use tracing::{Instrument, debug, trace};

/// One outstanding wait: a waiter plus the pipeline it will be registered on.
///
/// Waiting consumes the controller, so a registration is never reused.
pub struct WaitController<P, W> {
    pipeline: P,
    waiter: W,
}

impl<P, W> WaitController<P, W>
where
    P: Pipeline,
    W: Waiter,
{
    /// Create a controller for `waiter` on `pipeline`.
    pub fn new(pipeline: P, waiter: W) -> Self {
        Self { pipeline, waiter }
    }

    /// The waiter this controller will register.
    pub fn waiter(&self) -> &W {
        &self.waiter
    }

    /// Wait without a timeout.
    pub async fn wait(self) -> Result<W::Output, WaitError> {
        self.run(None)
            .await?
            .ok_or(WaitError::PipelineClosed)
    }

    /// Wait at most `timeout`; `None` if it elapses first.
    ///
    /// `Duration::ZERO` is a real timeout that elapses immediately, not a
    /// request to wait forever; use [`wait`](Self::wait) for that.
    pub async fn wait_timeout(self, timeout: Duration) -> Result<Option<W::Output>, WaitError> {
        self.run(Some(timeout)).await
    }

    /// Wait at most `timeout`, falling back to `default`.
    pub async fn wait_or(self, timeout: Duration, default: W::Output) -> Result<W::Output, WaitError> {
        Ok(self.run(Some(timeout)).await?.unwrap_or(default))
    }

    /// Wait with an optional timeout and an optional default.
    ///
    /// Without a timeout this only returns once an occurrence is accepted or
    /// the wait fails. With one, an elapsed timer yields `default`, and
    /// `Some(Duration::ZERO)` elapses immediately.
    pub async fn wait_with(
        self,
        timeout: Option<Duration>,
        default: Option<W::Output>,
    ) -> Result<Option<W::Output>, WaitError> {
        Ok(self.run(timeout).await?.or(default))
    }

    async fn run(self, timeout: Option<Duration>) -> Result<Option<W::Output>, WaitError> {
        let Self { pipeline, waiter } = self;
        let spec = waiter.config().listener_spec();
        let span = tracing::info_span!(
            "wait",
            waiter = std::any::type_name::<W>(),
            priority = spec.priority,
            ?timeout,
            registration = tracing::field::Empty,
        );

        async move {
            let (sender, mut receiver) = oneshot::channel();
            let gate = Arc::new(Gate::new(sender));
            let weak = Arc::downgrade(&gate);
            let listener = WaiterListener { waiter, gate };

            let handle = pipeline.register(spec, Arc::new(listener));
            tracing::Span::current().record("registration", handle.id());
            if let Some(gate) = weak.upgrade() {
                gate.attach(handle.clone());
            }
            let _guard = RegistrationGuard {
                pipeline: &pipeline,
                handle,
                gate: weak.clone(),
            };
            debug!("waiter registered");

            let Some(timeout) = timeout else {
                return delivered(receiver.await).map(Some);
            };
            match tokio::time::timeout(timeout, &mut receiver).await {
                Ok(settlement) => delivered(settlement).map(Some),
                Err(_) => {
                    if claim(&weak) {
                        debug!("wait timed out");
                        return Ok(None);
                    }
                    // Settled between the timer firing and the claim.
                    delivered(receiver.try_recv()).map(Some)
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl<P, W: std::fmt::Debug> std::fmt::Debug for WaitController<P, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitController")
            .field("waiter", &self.waiter)
            .finish_non_exhaustive()
    }
}

fn delivered<T, E>(received: Result<Settlement<T>, E>) -> Settlement<T> {
    match received {
        Ok(settlement) => settlement,
        Err(_) => {
            debug!("pipeline dropped the waiter before it settled");
            Err(WaitError::PipelineClosed)
        }
    }
}

fn claim<T>(gate: &Weak<Gate<T>>) -> bool {
    gate.upgrade().is_some_and(|gate| gate.close())
}

/// Claims the gate and revokes the registration when the wait ends, however
/// it ends.
///
/// A listener still inside `detect` when the wait is dropped finds the gate
/// closed and reports the occurrence as rejected.
struct RegistrationGuard<'a, P: Pipeline, T> {
    pipeline: &'a P,
    handle: RegistrationHandle,
    gate: Weak<Gate<T>>,
}

impl<P: Pipeline, T> Drop for RegistrationGuard<'_, P, T> {
    fn drop(&mut self) {
        if claim(&self.gate) {
            debug!(registration = self.handle.id(), "wait cancelled");
        }
        self.handle.retire();
        self.pipeline.revoke(&self.handle);
        debug!(registration = self.handle.id(), "waiter revoked");
    }
}

/// The one-shot listener a controller registers on the pipeline.
struct WaiterListener<W: Waiter> {
    waiter: W,
    gate: Arc<Gate<W::Output>>,
}

impl<W: Waiter> Listener for WaiterListener<W> {
    async fn on_occurrence(&self, occurrence: &Occurrence) -> Result<Propagation, BoxError> {
        if self.gate.is_settled() {
            return Ok(Propagation::Rejected);
        }

        let config = self.waiter.config();
        let context = config.context(occurrence);
        match config.inspect(&context) {
            Ok(true) => {}
            Ok(false) => {
                trace!(event = %occurrence.kind(), "headless decorator rejected occurrence");
                return Ok(Propagation::Rejected);
            }
            Err(error) => {
                debug!(event = %occurrence.kind(), %error, "headless decorator failed");
                self.gate.settle(Err(WaitError::Decorator(error)));
                return Ok(Propagation::Rejected);
            }
        }

        match self.waiter.detect(&context).await {
            Ok(MatchOutcome::Resolved(value)) => {
                if self.gate.settle(Ok(value)) {
                    debug!(event = %occurrence.kind(), "wait resolved");
                    Ok(Propagation::Accepted)
                } else {
                    Ok(Propagation::Rejected)
                }
            }
            Ok(outcome) => {
                let propagation = outcome.propagation();
                trace!(event = %occurrence.kind(), ?propagation, "occurrence rejected");
                Ok(propagation)
            }
            Err(error) => {
                debug!(event = %occurrence.kind(), %error, "wait failed");
                self.gate.settle(Err(error));
                Ok(Propagation::Rejected)
            }
        }
    }
}

/// Extension methods for every [`Waiter`].
pub trait WaitExt: Waiter + Sized {
    /// Prepare a wait on `pipeline`.
    fn wait_on<P: Pipeline>(self, pipeline: P) -> WaitController<P, Self> {
        WaitController::new(pipeline, self)
    }
}

impl<W: Waiter> WaitExt for W {}
