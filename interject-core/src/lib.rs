//! # interject-core
//!
//! Core traits for the Interject one-shot event waiter framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! pipelines and extensions that don't need the full `interject-std`
//! implementation.
//!
//! # Three Seams
//!
//! ## Context ([`DispatchContext`])
//!
//! Type-directed value lookup for one occurrence. Waiter-level
//! [`ContextProvider`]s are consulted first, then the event's own
//! [`Event::provide`].
//!
//! ## Waiter ([`Waiter`])
//!
//! A one-shot listener specification: a [`WaiterConfig`] (event types,
//! providers, headless decorators, priority, propagation blocking) plus a
//! match routine returning a [`MatchOutcome`].
//!
//! ## Pipeline ([`Pipeline`])
//!
//! The external event pipeline. Waiters reach it as [`DynListener`]s and are
//! tracked through a [`RegistrationHandle`].
//!
//! # Error Types
//!
//! - [`ConfigError`] - Malformed construction
//! - [`ResolveError`] - Context resolution failures
//! - [`WaitError`] - Failures surfaced through a wait

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod error;
mod message;
mod outcome;
mod pipeline;
mod waiter;

// Re-exports
pub use context::{
    ContextProvider, Decorator, DispatchContext, HeadlessDecorator, Lookup, Occurrence, Providers,
};
pub use error::{BoxError, ConfigError, ResolveError, WaitError};
pub use message::{AsAnyEvent, Event, EventKind, Message};
pub use outcome::{MatchOutcome, Propagation};
pub use pipeline::{DynListener, Listener, ListenerSpec, Pipeline, RegistrationHandle};
pub use waiter::{DEFAULT_PRIORITY, Waiter, WaiterConfig};
