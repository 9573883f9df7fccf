//! In-process reference pipeline.
//!
//! [`Broadcast`] keeps its listeners sorted by priority (stable, so equal
//! priorities keep registration order) and delivers each published
//! occurrence to them one by one, stopping early when a listener that blocks
//! propagation accepts or refuses it.
//!
//! Delivery works on a snapshot of the registry, so listeners may register
//! or revoke (their own registration included) while an occurrence is in
//! flight. Revoked listeners are skipped even if they are still in the
//! snapshot.

use interject_core::{
    BoxError, DynListener, Event, ListenerSpec, Occurrence, Pipeline, RegistrationHandle,
};
use std::sync::{
    Arc, PoisonError, RwLock,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

struct Entry {
    handle: RegistrationHandle,
    spec: ListenerSpec,
    listener: Arc<dyn DynListener>,
}

/// Summary of one publication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// How many listeners were invoked.
    pub delivered: usize,
    /// Whether a listener stopped the occurrence before the end.
    pub stopped: bool,
}

/// A priority-ordered in-process event pipeline.
#[derive(Default)]
pub struct Broadcast {
    entries: RwLock<Vec<Entry>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl Broadcast {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an owned event.
    pub async fn publish<E: Event>(&self, event: E) -> Result<DispatchReport, BoxError> {
        self.publish_occurrence(&Occurrence::new(event)).await
    }

    /// Publish an occurrence to every live listener of its kind.
    ///
    /// A listener error aborts the remaining delivery and is returned.
    pub async fn publish_occurrence(
        &self,
        occurrence: &Occurrence,
    ) -> Result<DispatchReport, BoxError> {
        let kind = occurrence.kind();
        let snapshot: Vec<(RegistrationHandle, bool, Arc<dyn DynListener>)> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.spec.listens_to(kind))
            .map(|entry| {
                (
                    entry.handle.clone(),
                    entry.spec.block_propagation,
                    Arc::clone(&entry.listener),
                )
            })
            .collect();

        let mut report = DispatchReport::default();
        for (handle, block_propagation, listener) in snapshot {
            if !handle.is_live() {
                continue;
            }
            report.delivered += 1;
            let propagation = listener.on_occurrence_dyn(occurrence).await?;
            if propagation.blocks(block_propagation) {
                tracing::trace!(
                    registration = handle.id(),
                    event = %kind,
                    ?propagation,
                    "propagation stopped"
                );
                report.stopped = true;
                break;
            }
        }
        Ok(report)
    }

    /// Number of registrations currently held.
    pub fn active_registrations(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop every listener and refuse later registrations.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let drained: Vec<Entry> = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for entry in &drained {
            entry.handle.retire();
        }
        tracing::debug!(dropped = drained.len(), "pipeline closed");
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Pipeline for Broadcast {
    fn register(&self, spec: ListenerSpec, listener: Arc<dyn DynListener>) -> RegistrationHandle {
        let handle = RegistrationHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        if self.is_closed() {
            handle.retire();
            return handle;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Re-checked under the lock so a concurrent close cannot miss this entry.
        if self.is_closed() {
            handle.retire();
            return handle;
        }
        tracing::debug!(
            registration = handle.id(),
            priority = spec.priority,
            events = ?spec.events,
            "listener registered"
        );
        let position = entries.partition_point(|entry| entry.spec.priority <= spec.priority);
        entries.insert(
            position,
            Entry {
                handle: handle.clone(),
                spec,
                listener,
            },
        );
        handle
    }

    fn revoke(&self, handle: &RegistrationHandle) {
        handle.retire();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(position) = entries.iter().position(|entry| entry.handle.id() == handle.id()) {
            entries.remove(position);
            tracing::debug!(registration = handle.id(), "listener revoked");
        }
    }
}

impl std::fmt::Debug for Broadcast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcast")
            .field("active_registrations", &self.active_registrations())
            .field("closed", &self.is_closed())
            .finish()
    }
}
