//! # Dispatch Context (Context Resolution)
//!
//! Type-directed value lookup for a single event occurrence.
//!
//! A waiter never sees the pipeline's internals. It receives a
//! [`DispatchContext`] for each candidate occurrence and asks it for values
//! by type:
//!
//! ```rust,ignore
//! let user: UserId = context.resolve()?;
//! ```
//!
//! # Resolution Order
//!
//! 1. The waiter's [`ContextProvider`]s, in declaration order. The first
//!    provider that fills the [`Lookup`] wins; a provider error aborts the
//!    lookup with [`ResolveError::Provider`].
//! 2. The event itself, through [`Event::provide`].
//!
//! If nobody fills the slot the lookup fails with [`ResolveError::Unresolved`].
//!
//! # Lifetime
//!
//! A context is built per occurrence and handed to the waiter by reference.
//! Waiters extract owned values out of it and must not keep it around once
//! their match routine returns.

use crate::{
    error::{BoxError, ResolveError},
    message::{AsAnyEvent, Event, EventKind},
};
use std::{
    any::{Any, TypeId},
    fmt,
    sync::Arc,
};

/// One published event instance, shared between every listener it reaches.
#[derive(Clone)]
pub struct Occurrence {
    event: Arc<dyn Event>,
    kind: EventKind,
}

impl Occurrence {
    /// Wrap an owned event.
    pub fn new<E: Event>(event: E) -> Self {
        Self::from_arc(Arc::new(event))
    }

    /// Wrap an already shared event without copying it.
    pub fn from_arc<E: Event>(event: Arc<E>) -> Self {
        Self {
            event,
            kind: EventKind::of::<E>(),
        }
    }

    /// The event type of this occurrence.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The type-erased event.
    pub fn event(&self) -> &dyn Event {
        &*self.event
    }

    /// Borrow the event as `E` if that is its concrete type.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        (*self.event).as_any().downcast_ref::<E>()
    }

    /// Share the event as `Arc<E>` if that is its concrete type.
    ///
    /// The returned `Arc` points at the very instance that was published.
    pub fn downcast<E: Event>(&self) -> Option<Arc<E>> {
        if self.kind != EventKind::of::<E>() {
            return None;
        }
        AsAnyEvent::into_any_arc(Arc::clone(&self.event))
            .downcast::<E>()
            .ok()
    }
}

impl fmt::Debug for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Occurrence")
            .field("kind", &self.kind)
            .field("event", &self.event)
            .finish()
    }
}

/// A pending request for a value of one specific type.
///
/// Providers call [`Lookup::provide`] (or [`Lookup::provide_with`]) for every
/// value they are able to offer; only a value of the requested type is kept,
/// and only the first one.
pub struct Lookup {
    target: TypeId,
    target_name: &'static str,
    value: Option<Box<dyn Any + Send>>,
}

impl Lookup {
    /// Start a lookup for a value of type `T`.
    pub fn new<T: Send + 'static>() -> Self {
        Self {
            target: TypeId::of::<T>(),
            target_name: std::any::type_name::<T>(),
            value: None,
        }
    }

    /// Whether this lookup asks for a `T`.
    pub fn wants<T: 'static>(&self) -> bool {
        self.target == TypeId::of::<T>()
    }

    /// Offer a value. Ignored unless it has the requested type and the
    /// lookup is still empty.
    pub fn provide<T: Send + 'static>(&mut self, value: T) -> &mut Self {
        if self.value.is_none() && self.wants::<T>() {
            self.value = Some(Box::new(value));
        }
        self
    }

    /// Offer a lazily computed value; `f` only runs when it would be kept.
    pub fn provide_with<T: Send + 'static>(&mut self, f: impl FnOnce() -> T) -> &mut Self {
        if self.value.is_none() && self.wants::<T>() {
            self.value = Some(Box::new(f()));
        }
        self
    }

    /// Whether a value has been provided.
    pub fn is_fulfilled(&self) -> bool {
        self.value.is_some()
    }

    /// Name of the requested type.
    pub fn target_name(&self) -> &'static str {
        self.target_name
    }

    /// Take the provided value out of the lookup.
    pub fn take<T: 'static>(self) -> Option<T> {
        self.value
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }
}

impl fmt::Debug for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookup")
            .field("target", &self.target_name)
            .field("fulfilled", &self.is_fulfilled())
            .finish()
    }
}

/// A strategy for resolving typed values out of an occurrence.
///
/// These are the waiter-level "dispatchers": they run before the event's own
/// [`Event::provide`] and may therefore override what the event offers.
pub trait ContextProvider: Send + Sync + 'static {
    /// Offer values for `lookup`, or fail the lookup.
    fn provide(&self, occurrence: &Occurrence, lookup: &mut Lookup) -> Result<(), BoxError>;
}

impl<F> ContextProvider for F
where
    F: Fn(&Occurrence, &mut Lookup) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn provide(&self, occurrence: &Occurrence, lookup: &mut Lookup) -> Result<(), BoxError> {
        (self)(occurrence, lookup)
    }
}

/// A post-processing strategy applied to a resolved value.
pub trait Decorator<T>: Send + Sync + 'static {
    /// Transform or validate `value`; an error fails the resolution.
    fn decorate(&self, context: &DispatchContext, value: T) -> Result<T, BoxError>;
}

impl<T, F> Decorator<T> for F
where
    F: Fn(T) -> Result<T, BoxError> + Send + Sync + 'static,
{
    fn decorate(&self, _context: &DispatchContext, value: T) -> Result<T, BoxError> {
        (self)(value)
    }
}

/// A validation strategy that is not tied to any extracted value.
///
/// Returning `Ok(false)` rejects the occurrence; an error fails the wait.
pub trait HeadlessDecorator: Send + Sync + 'static {
    /// Inspect the occurrence before the waiter's own matching runs.
    fn inspect(&self, context: &DispatchContext) -> Result<bool, BoxError>;
}

impl<F> HeadlessDecorator for F
where
    F: Fn(&DispatchContext) -> Result<bool, BoxError> + Send + Sync + 'static,
{
    fn inspect(&self, context: &DispatchContext) -> Result<bool, BoxError> {
        (self)(context)
    }
}

/// Shared, immutable list of context providers.
pub type Providers = Arc<[Arc<dyn ContextProvider>]>;

/// The per-occurrence bundle a waiter queries for typed values.
#[derive(Clone)]
pub struct DispatchContext {
    occurrence: Occurrence,
    providers: Providers,
}

impl DispatchContext {
    /// Build a context for `occurrence` consulting `providers`.
    pub fn new(occurrence: Occurrence, providers: Providers) -> Self {
        Self {
            occurrence,
            providers,
        }
    }

    /// The occurrence under inspection.
    pub fn occurrence(&self) -> &Occurrence {
        &self.occurrence
    }

    /// The event type of the occurrence.
    pub fn kind(&self) -> EventKind {
        self.occurrence.kind()
    }

    /// Borrow the event as `E` if that is its concrete type.
    pub fn event<E: Event>(&self) -> Option<&E> {
        self.occurrence.downcast_ref()
    }

    /// Resolve a value of type `T`.
    pub fn resolve<T: Send + 'static>(&self) -> Result<T, ResolveError> {
        let mut lookup = Lookup::new::<T>();
        for provider in self.providers.iter() {
            provider
                .provide(&self.occurrence, &mut lookup)
                .map_err(ResolveError::Provider)?;
            if lookup.is_fulfilled() {
                break;
            }
        }
        if !lookup.is_fulfilled() {
            self.occurrence.event().provide(&mut lookup);
        }
        lookup.take::<T>().ok_or_else(|| ResolveError::Unresolved {
            target: std::any::type_name::<T>(),
            event: self.occurrence.kind().name(),
        })
    }

    /// Resolve a value of type `T` and run it through `decorator`.
    pub fn resolve_with<T: Send + 'static>(
        &self,
        decorator: &dyn Decorator<T>,
    ) -> Result<T, ResolveError> {
        let value = self.resolve::<T>()?;
        decorator
            .decorate(self, value)
            .map_err(ResolveError::Decorator)
    }
}

impl fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchContext")
            .field("occurrence", &self.occurrence)
            .field("providers", &self.providers.len())
            .finish()
    }
}
