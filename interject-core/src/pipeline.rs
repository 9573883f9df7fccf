//! # Pipeline Boundary (Listener)
//!
//! The seam between waiters and whatever event pipeline hosts them.
//!
//! A pipeline owns a set of registered [`Listener`]s. When an occurrence is
//! published it offers the occurrence to every live listener whose
//! [`ListenerSpec`] lists the occurrence's event type, lowest priority value
//! first, and stops early when a listener blocks propagation.
//!
//! Waiters never talk to a pipeline directly: the wait controller wraps them
//! in a one-shot listener, registers it, and revokes it when the wait ends.
//!
//! # Liveness
//!
//! [`RegistrationHandle`] is the single source of truth for "may this
//! listener still be invoked". Pipelines check [`RegistrationHandle::is_live`]
//! before every invocation; revoking or retiring a handle is idempotent.

use crate::{
    context::Occurrence,
    error::BoxError,
    message::EventKind,
    outcome::Propagation,
};
use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// A callback registered on a pipeline.
///
/// This trait uses native `async fn` for static dispatch. Pipelines store
/// listeners as [`DynListener`] trait objects.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Listener`",
    label = "missing `Listener` implementation",
    note = "Listeners must implement `on_occurrence`."
)]
pub trait Listener: Send + Sync + 'static {
    /// Called once per delivered occurrence.
    ///
    /// An error aborts the remaining delivery of this occurrence.
    fn on_occurrence(
        &self,
        occurrence: &Occurrence,
    ) -> impl Future<Output = Result<Propagation, BoxError>> + Send;
}

/// Dynamic object-safe version of [`Listener`].
pub trait DynListener: Send + Sync + 'static {
    /// Called once per delivered occurrence (dynamic dispatch version).
    fn on_occurrence_dyn<'a>(
        &'a self,
        occurrence: &'a Occurrence,
    ) -> Pin<Box<dyn Future<Output = Result<Propagation, BoxError>> + Send + 'a>>;
}

// Blanket implementation: Any type implementing Listener implements DynListener automatically.
impl<L: Listener> DynListener for L {
    fn on_occurrence_dyn<'a>(
        &'a self,
        occurrence: &'a Occurrence,
    ) -> Pin<Box<dyn Future<Output = Result<Propagation, BoxError>> + Send + 'a>> {
        Box::pin(self.on_occurrence(occurrence))
    }
}

/// Registration parameters of a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerSpec {
    /// Event types the listener wants delivered.
    pub events: Vec<EventKind>,
    /// Lower values are offered occurrences first.
    pub priority: i32,
    /// Whether an accepted occurrence stops at this listener.
    pub block_propagation: bool,
}

impl ListenerSpec {
    /// Whether the listener wants occurrences of `kind`.
    pub fn listens_to(&self, kind: EventKind) -> bool {
        self.events.contains(&kind)
    }
}

/// A handle to one registration on a pipeline.
///
/// Clones share the same liveness flag.
#[derive(Debug, Clone)]
pub struct RegistrationHandle {
    id: u64,
    live: Arc<AtomicBool>,
}

impl RegistrationHandle {
    /// Create a live handle with the given pipeline-assigned id.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// The pipeline-assigned id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the listener may still be invoked.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Mark the registration dead. Returns `true` only for the call that
    /// actually flipped it.
    pub fn retire(&self) -> bool {
        self.live.swap(false, Ordering::AcqRel)
    }
}

/// An event pipeline that can host one-shot listeners.
///
/// Registration and revocation must be safe to call concurrently from
/// unrelated tasks.
pub trait Pipeline: Send + Sync {
    /// Register `listener` and return its handle.
    fn register(&self, spec: ListenerSpec, listener: Arc<dyn DynListener>) -> RegistrationHandle;

    /// Remove a registration. Idempotent.
    fn revoke(&self, handle: &RegistrationHandle);
}

impl<P: Pipeline + ?Sized> Pipeline for &P {
    fn register(&self, spec: ListenerSpec, listener: Arc<dyn DynListener>) -> RegistrationHandle {
        (**self).register(spec, listener)
    }

    fn revoke(&self, handle: &RegistrationHandle) {
        (**self).revoke(handle)
    }
}

impl<P: Pipeline + ?Sized> Pipeline for Arc<P> {
    fn register(&self, spec: ListenerSpec, listener: Arc<dyn DynListener>) -> RegistrationHandle {
        (**self).register(spec, listener)
    }

    fn revoke(&self, handle: &RegistrationHandle) {
        (**self).revoke(handle)
    }
}
