//! Validator chains for typed-extraction waiters.
//!
//! A chain is an ordered list of `(type, predicate)` entries. For each entry
//! the chain resolves a value of the entry's type from the dispatch context
//! and hands it to the predicate. Resolution failures never escape: the
//! predicate simply receives `None`.
//!
//! The first predicate that returns `false` (or fails) rejects the
//! occurrence; later entries are not evaluated.

use interject_core::{BoxError, DispatchContext, Event};
use std::{fmt, marker::PhantomData};

/// One guard in a [`ValidatorChain`].
pub trait Validator: Send + Sync + 'static {
    /// Name of the type this guard inspects.
    fn target(&self) -> &'static str;

    /// Whether the occurrence passes this guard.
    fn check(&self, context: &DispatchContext) -> bool;
}

/// A predicate over the event itself.
pub struct EventValidator<E, F> {
    predicate: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> EventValidator<E, F> {
    /// Create a new event validator.
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            _event: PhantomData,
        }
    }
}

impl<E, F> Validator for EventValidator<E, F>
where
    E: Event,
    F: Fn(&E) -> bool + Send + Sync + 'static,
{
    fn target(&self) -> &'static str {
        std::any::type_name::<E>()
    }

    fn check(&self, context: &DispatchContext) -> bool {
        context.event::<E>().is_some_and(|event| (self.predicate)(event))
    }
}

/// A predicate over a value resolved from the context.
pub struct TypedValidator<V, F> {
    predicate: F,
    _value: PhantomData<fn(Option<V>)>,
}

impl<V, F> TypedValidator<V, F> {
    /// Create a new typed validator.
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            _value: PhantomData,
        }
    }
}

impl<V, F> Validator for TypedValidator<V, F>
where
    V: Send + 'static,
    F: Fn(Option<V>) -> bool + Send + Sync + 'static,
{
    fn target(&self) -> &'static str {
        std::any::type_name::<V>()
    }

    fn check(&self, context: &DispatchContext) -> bool {
        (self.predicate)(context.resolve::<V>().ok())
    }
}

/// A fallible predicate over a value resolved from the context.
///
/// A predicate error counts as `false`.
pub struct FallibleValidator<V, F> {
    predicate: F,
    _value: PhantomData<fn(Option<V>)>,
}

impl<V, F> FallibleValidator<V, F> {
    /// Create a new fallible validator.
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            _value: PhantomData,
        }
    }
}

impl<V, F> Validator for FallibleValidator<V, F>
where
    V: Send + 'static,
    F: Fn(Option<V>) -> Result<bool, BoxError> + Send + Sync + 'static,
{
    fn target(&self) -> &'static str {
        std::any::type_name::<V>()
    }

    fn check(&self, context: &DispatchContext) -> bool {
        match (self.predicate)(context.resolve::<V>().ok()) {
            Ok(passed) => passed,
            Err(error) => {
                tracing::trace!(target_type = self.target(), %error, "validator failed");
                false
            }
        }
    }
}

/// An ordered sequence of validators.
#[derive(Default)]
pub struct ValidatorChain {
    entries: Vec<Box<dyn Validator>>,
}

impl ValidatorChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validator.
    pub fn push<V: Validator>(&mut self, validator: V) {
        self.entries.push(Box::new(validator));
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the inspected types, in evaluation order.
    pub fn targets(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.target())
    }

    /// Evaluate the chain, short-circuiting on the first failing entry.
    pub fn accepts(&self, context: &DispatchContext) -> bool {
        for (index, entry) in self.entries.iter().enumerate() {
            if !entry.check(context) {
                tracing::trace!(
                    index,
                    target_type = entry.target(),
                    event = %context.kind(),
                    "validator chain rejected occurrence"
                );
                return false;
            }
        }
        true
    }
}

impl fmt::Debug for ValidatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.targets()).finish()
    }
}
