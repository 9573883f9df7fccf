//! Settle-once gate shared by a wait controller and its listener.
//!
//! Claiming the settlement, delivering the value, and retiring the
//! registration all happen under one lock, so a listener can never resolve a
//! wait that already timed out and a timed-out wait can never be resolved
//! afterwards.

use interject_core::{RegistrationHandle, WaitError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

pub(crate) type Settlement<T> = Result<T, WaitError>;

struct GateState<T> {
    sender: Option<oneshot::Sender<Settlement<T>>>,
    registration: Option<RegistrationHandle>,
}

pub(crate) struct Gate<T> {
    state: Mutex<GateState<T>>,
}

impl<T> Gate<T> {
    pub(crate) fn new(sender: oneshot::Sender<Settlement<T>>) -> Self {
        Self {
            state: Mutex::new(GateState {
                sender: Some(sender),
                registration: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind the registration this gate guards.
    ///
    /// If the gate settled before registration returned, the handle is
    /// retired immediately.
    pub(crate) fn attach(&self, handle: RegistrationHandle) {
        let mut state = self.lock();
        if state.sender.is_none() {
            handle.retire();
        } else {
            state.registration = Some(handle);
        }
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.lock().sender.is_none()
    }

    /// Deliver `settlement` if nobody has settled the gate yet.
    pub(crate) fn settle(&self, settlement: Settlement<T>) -> bool {
        let mut state = self.lock();
        let Some(sender) = state.sender.take() else {
            return false;
        };
        if let Some(registration) = state.registration.take() {
            registration.retire();
        }
        // A dropped receiver means the wait was cancelled; nothing to deliver to.
        let _ = sender.send(settlement);
        true
    }

    /// Claim the gate without a value (timeout or cancellation).
    pub(crate) fn close(&self) -> bool {
        let mut state = self.lock();
        let claimed = state.sender.take().is_some();
        if let Some(registration) = state.registration.take() {
            registration.retire();
        }
        claimed
    }
}
