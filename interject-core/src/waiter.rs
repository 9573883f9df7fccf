//! # Waiter (One-Shot Listener Specification)
//!
//! A waiter describes *what* a suspended task is waiting for: which event
//! types to listen to, how to resolve values out of an occurrence, and how to
//! decide whether an occurrence is the one.
//!
//! Every waiter carries a [`WaiterConfig`] (the capability set shared by all
//! variants) and implements [`Waiter::detect`], its match routine.
//!
//! # Configuration
//!
//! ```rust,ignore
//! let config = WaiterConfig::for_event::<Ping>()
//!     .with_priority(5)
//!     .with_block_propagation(true)
//!     .with_provider(session_provider);
//! ```

use crate::{
    context::{ContextProvider, DispatchContext, HeadlessDecorator, Occurrence, Providers},
    error::{BoxError, ConfigError, WaitError},
    message::{Event, EventKind},
    outcome::MatchOutcome,
    pipeline::ListenerSpec,
};
use std::{fmt, future::Future, sync::Arc};

/// Priority a waiter gets unless configured otherwise.
pub const DEFAULT_PRIORITY: i32 = 15;

/// The capability set shared by every waiter variant.
///
/// Built once, before the wait begins, and never mutated afterwards.
#[derive(Clone)]
pub struct WaiterConfig {
    events: Vec<EventKind>,
    providers: Providers,
    decorators: Vec<Arc<dyn HeadlessDecorator>>,
    priority: i32,
    block_propagation: bool,
}

impl WaiterConfig {
    /// Create a configuration listening to `events`.
    ///
    /// Duplicate kinds collapse; an empty set is rejected.
    pub fn new<I>(events: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = EventKind>,
    {
        let mut kinds: Vec<EventKind> = Vec::new();
        for kind in events {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            return Err(ConfigError::EmptyEventSet);
        }
        Ok(Self::with_kinds(kinds))
    }

    /// Create a configuration listening to the single event type `E`.
    pub fn for_event<E: Event>() -> Self {
        Self::with_kinds(vec![EventKind::of::<E>()])
    }

    fn with_kinds(events: Vec<EventKind>) -> Self {
        Self {
            events,
            providers: Arc::from(Vec::new()),
            decorators: Vec::new(),
            priority: DEFAULT_PRIORITY,
            block_propagation: false,
        }
    }

    /// Set priority (lower = offered occurrences earlier).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set whether an accepted occurrence stops at this waiter.
    pub fn with_block_propagation(mut self, block: bool) -> Self {
        self.block_propagation = block;
        self
    }

    /// Append a context provider.
    pub fn with_provider<P: ContextProvider>(self, provider: P) -> Self {
        self.with_shared_provider(Arc::new(provider))
    }

    /// Append an already shared context provider.
    pub fn with_shared_provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        let mut providers = self.providers.to_vec();
        providers.push(provider);
        self.providers = providers.into();
        self
    }

    /// Append a headless decorator.
    pub fn with_decorator<D: HeadlessDecorator>(mut self, decorator: D) -> Self {
        self.decorators.push(Arc::new(decorator));
        self
    }

    /// Event types this waiter listens to.
    pub fn events(&self) -> &[EventKind] {
        &self.events
    }

    /// Whether this waiter listens to `kind`.
    pub fn listens_to(&self, kind: EventKind) -> bool {
        self.events.contains(&kind)
    }

    /// Context providers, in consultation order.
    pub fn providers(&self) -> &[Arc<dyn ContextProvider>] {
        &self.providers
    }

    /// Headless decorators, in evaluation order.
    pub fn decorators(&self) -> &[Arc<dyn HeadlessDecorator>] {
        &self.decorators
    }

    /// The configured priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether an accepted occurrence stops at this waiter.
    pub fn block_propagation(&self) -> bool {
        self.block_propagation
    }

    /// Registration parameters for a pipeline.
    pub fn listener_spec(&self) -> ListenerSpec {
        ListenerSpec {
            events: self.events.clone(),
            priority: self.priority,
            block_propagation: self.block_propagation,
        }
    }

    /// Build the dispatch context for one occurrence.
    pub fn context(&self, occurrence: &Occurrence) -> DispatchContext {
        DispatchContext::new(occurrence.clone(), Arc::clone(&self.providers))
    }

    /// Run the headless decorators in order.
    ///
    /// Stops at the first decorator that declines or fails.
    pub fn inspect(&self, context: &DispatchContext) -> Result<bool, BoxError> {
        for decorator in &self.decorators {
            if !decorator.inspect(context)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Debug for WaiterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaiterConfig")
            .field("events", &self.events)
            .field("providers", &self.providers.len())
            .field("decorators", &self.decorators.len())
            .field("priority", &self.priority)
            .field("block_propagation", &self.block_propagation)
            .finish()
    }
}

/// A one-shot listener specification.
///
/// # Static vs Dynamic Dispatch
///
/// This trait uses native `async fn`. The wait controller wraps a waiter in a
/// [`Listener`] before handing it to a pipeline as a trait object.
///
/// [`Listener`]: crate::Listener
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Waiter`",
    label = "missing `Waiter` implementation",
    note = "Waiters must expose a `WaiterConfig` and implement `detect`."
)]
pub trait Waiter: Send + Sync + 'static {
    /// The value a successful wait produces.
    type Output: Send + 'static;

    /// The capability set of this waiter.
    fn config(&self) -> &WaiterConfig;

    /// The match routine, called once per candidate occurrence.
    ///
    /// Headless decorators have already accepted the occurrence when this
    /// runs. An error fails the wait instead of rejecting the occurrence.
    fn detect(
        &self,
        context: &DispatchContext,
    ) -> impl Future<Output = Result<MatchOutcome<Self::Output>, WaitError>> + Send;
}
