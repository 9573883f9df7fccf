//! # interject - One-Shot Event Waiters
//!
//! `interject` lets a task suspend until the next occurrence of an event that
//! satisfies a set of predicates, optionally pulling a typed value out of it,
//! with an optional timeout and fallback.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use interject::prelude::*;
//!
//! let pipeline = Broadcast::new();
//!
//! // Somewhere else, events are published:
//! // pipeline.publish(Ping { user: 42, count: 3 }).await?;
//!
//! let count: Option<Count> = AnnotationWaiter::<Count>::for_event::<Ping>()
//!     .validator_for(|user: Option<UserId>| user == Some(UserId(42)))
//!     .wait_on(&pipeline)
//!     .wait_timeout(Duration::from_secs(5))
//!     .await?;
//! ```
//!
//! ## Waiters
//!
//! | waiter               | resolves with                         |
//! |----------------------|---------------------------------------|
//! | [`FunctionWaiter`]   | whatever the async function returns   |
//! | [`EventWaiter`]      | the published event itself            |
//! | [`AnnotationWaiter`] | a typed value resolved from the event |
//!
//! Any [`Pipeline`] can host a wait; [`Broadcast`] is the in-process one.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use interject_core::{
    // Message
    AsAnyEvent,
    // Error types
    BoxError,
    ConfigError,
    // Context
    ContextProvider,
    DEFAULT_PRIORITY,
    Decorator,
    DispatchContext,
    // Pipeline boundary
    DynListener,
    Event,
    EventKind,
    HeadlessDecorator,
    Listener,
    ListenerSpec,
    Lookup,
    // Outcomes
    MatchOutcome,
    Message,
    Occurrence,
    Pipeline,
    Propagation,
    Providers,
    RegistrationHandle,
    ResolveError,
    WaitError,
    // Waiter
    Waiter,
    WaiterConfig,
};

pub use interject_std::{
    broadcast::{Broadcast, DispatchReport},
    controller::{WaitController, WaitExt},
    validator::{Validator, ValidatorChain},
    waiters::{AnnotationWaiter, EventWaiter, FunctionWaiter},
};

/// Testing utilities.
pub mod testing {
    pub use interject_std::testing::{CountingPredicate, OrderLog, RecordingListener, SpyPipeline};
}

/// Prelude module - common imports for Interject.
///
/// # Usage
///
/// ```rust,ignore
/// use interject::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Waiters
        AnnotationWaiter,
        // Errors
        BoxError,
        // Pipeline
        Broadcast,
        ConfigError,
        DispatchContext,
        // Core traits
        Event,
        EventKind,
        EventWaiter,
        FunctionWaiter,
        Lookup,
        MatchOutcome,
        Occurrence,
        Pipeline,
        WaitError,
        // Waiting
        WaitExt,
        Waiter,
        WaiterConfig,
    };
    pub use std::time::Duration;
}
