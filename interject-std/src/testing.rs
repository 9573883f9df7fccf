//! Testing utilities for Interject.
//!
//! # Features
//!
//! - [`SpyPipeline`]: wraps a pipeline and tracks registrations, to assert
//!   that every wait cleans up after itself
//! - [`RecordingListener`]: a listener that records what it receives and
//!   returns a fixed [`Propagation`]
//! - [`CountingPredicate`]: a call-count spy for validator predicates

use crate::broadcast::Broadcast;
use interject_core::{
    BoxError, DynListener, EventKind, Listener, ListenerSpec, Occurrence, Pipeline, Propagation,
    RegistrationHandle,
};
use std::{
    collections::HashSet,
    ops::Deref,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

// ============================================================================
// Spy Pipeline
// ============================================================================

/// A pipeline wrapper that records registration traffic.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = SpyPipeline::new(Broadcast::new());
/// let _ = EventWaiter::<Ping>::new()
///     .wait_on(&pipeline)
///     .wait_timeout(Duration::from_millis(10))
///     .await;
/// assert_eq!(pipeline.active(), 0);
/// ```
pub struct SpyPipeline<P = Broadcast> {
    inner: P,
    registered: AtomicUsize,
    revoked: AtomicUsize,
    active: Mutex<HashSet<u64>>,
    last_spec: Mutex<Option<ListenerSpec>>,
}

impl<P: Pipeline> SpyPipeline<P> {
    /// Wrap `inner`.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            registered: AtomicUsize::new(0),
            revoked: AtomicUsize::new(0),
            active: Mutex::new(HashSet::new()),
            last_spec: Mutex::new(None),
        }
    }

    /// Total `register` calls.
    pub fn registered(&self) -> usize {
        self.registered.load(Ordering::SeqCst)
    }

    /// Total `revoke` calls, repeated ones included.
    pub fn revoked(&self) -> usize {
        self.revoked.load(Ordering::SeqCst)
    }

    /// Registrations made through this spy and not yet revoked.
    pub fn active(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    /// The spec of the most recent registration.
    pub fn last_spec(&self) -> Option<ListenerSpec> {
        self.last_spec.lock().unwrap().clone()
    }

    /// The wrapped pipeline.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl Default for SpyPipeline<Broadcast> {
    fn default() -> Self {
        Self::new(Broadcast::new())
    }
}

impl<P> Deref for SpyPipeline<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.inner
    }
}

impl<P: Pipeline> Pipeline for SpyPipeline<P> {
    fn register(&self, spec: ListenerSpec, listener: Arc<dyn DynListener>) -> RegistrationHandle {
        self.registered.fetch_add(1, Ordering::SeqCst);
        *self.last_spec.lock().unwrap() = Some(spec.clone());
        let handle = self.inner.register(spec, listener);
        self.active.lock().unwrap().insert(handle.id());
        handle
    }

    fn revoke(&self, handle: &RegistrationHandle) {
        self.revoked.fetch_add(1, Ordering::SeqCst);
        self.active.lock().unwrap().remove(&handle.id());
        self.inner.revoke(handle);
    }
}

// ============================================================================
// Recording Listener
// ============================================================================

/// Shared log of listener tags, in invocation order.
pub type OrderLog = Arc<Mutex<Vec<i32>>>;

/// A listener that records every occurrence it receives.
///
/// Clones share the same record.
#[derive(Clone)]
pub struct RecordingListener {
    seen: Arc<Mutex<Vec<EventKind>>>,
    result: Propagation,
    order: Option<(OrderLog, i32)>,
}

impl RecordingListener {
    /// Create a listener that always answers `result`.
    pub fn new(result: Propagation) -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
            result,
            order: None,
        }
    }

    /// A fresh log for [`with_order`](Self::with_order).
    pub fn order_log() -> OrderLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    /// Also push `tag` onto `log` on every invocation.
    pub fn with_order(mut self, log: &OrderLog, tag: i32) -> Self {
        self.order = Some((Arc::clone(log), tag));
        self
    }

    /// Kinds of the occurrences received so far.
    pub fn events(&self) -> Vec<EventKind> {
        self.seen.lock().unwrap().clone()
    }

    /// Number of occurrences received so far.
    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Listener for RecordingListener {
    async fn on_occurrence(&self, occurrence: &Occurrence) -> Result<Propagation, BoxError> {
        self.seen.lock().unwrap().push(occurrence.kind());
        if let Some((log, tag)) = &self.order {
            log.lock().unwrap().push(*tag);
        }
        Ok(self.result)
    }
}

// ============================================================================
// Counting Predicate
// ============================================================================

/// A shared call counter for validator predicates.
#[derive(Clone, Default)]
pub struct CountingPredicate {
    calls: Arc<AtomicUsize>,
}

impl CountingPredicate {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call.
    pub fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Calls recorded so far.
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// A typed predicate that counts its calls and always passes.
    pub fn accepting<V: Send + 'static>(&self) -> impl Fn(Option<V>) -> bool + Send + Sync + 'static {
        let counter = self.clone();
        move |_| {
            counter.hit();
            true
        }
    }

    /// A typed predicate that counts its calls and always fails.
    pub fn rejecting<V: Send + 'static>(&self) -> impl Fn(Option<V>) -> bool + Send + Sync + 'static {
        let counter = self.clone();
        move |_| {
            counter.hit();
            false
        }
    }
}
