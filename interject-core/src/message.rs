//! Message and event marker traits.

use crate::context::Lookup;
use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// A marker trait for values that travel through the pipeline.
///
/// Messages must be `Send + Sync + 'static` to be safe for async use.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "All values moved across an Interject pipeline must be thread-safe and static."
)]
pub trait Message: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Message for T {}

/// Type-erasure helpers every [`Event`] gets for free.
///
/// Implemented for all sized `Send + Sync + 'static` types; callers never
/// implement it by hand.
pub trait AsAnyEvent: Any + Send + Sync {
    /// Borrow as `dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Convert a shared event into a shared `dyn Any`.
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// The concrete type name, used in diagnostics.
    fn event_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> AsAnyEvent for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn event_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// An event that can be published on a pipeline and awaited by a waiter.
///
/// Besides being a [`Message`], an event may offer typed values to context
/// resolution through [`Event::provide`].
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug)]
/// struct Ping {
///     user: u64,
/// }
///
/// impl Event for Ping {
///     fn provide(&self, lookup: &mut Lookup) {
///         lookup.provide(UserId(self.user));
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Event`",
    label = "missing `Event` implementation",
    note = "Add `impl Event for {Self} {{}}` (optionally overriding `provide`)."
)]
pub trait Event: AsAnyEvent + Message + fmt::Debug {
    /// Offer values carried by this event to a pending lookup.
    ///
    /// Called after the waiter's own context providers had their turn.
    fn provide(&self, lookup: &mut Lookup) {
        let _ = lookup;
    }
}

/// Identifier of an event type.
///
/// Equality and hashing only consider the underlying [`TypeId`].
#[derive(Clone, Copy)]
pub struct EventKind {
    id: TypeId,
    name: &'static str,
}

impl EventKind {
    /// The kind of event type `E`.
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
        }
    }

    /// The kind of a type-erased event instance.
    pub fn of_val(event: &dyn Event) -> Self {
        Self {
            id: event.as_any().type_id(),
            name: event.event_name(),
        }
    }

    /// The type id of the event type.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The type name of the event type.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventKind {}

impl Hash for EventKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
