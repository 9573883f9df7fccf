//! Error types for Interject.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`ConfigError`] - Malformed waiter construction, raised eagerly
//! - [`ResolveError`] - Context resolution failures
//! - [`WaitError`] - Failures surfaced through a suspended wait
//!
//! Rejecting an occurrence is *not* an error; see [`MatchOutcome`].
//! Neither is a timeout, which yields the caller's default value.
//!
//! [`MatchOutcome`]: crate::MatchOutcome

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while constructing a waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A waiter must listen to at least one event type.
    #[error("a waiter needs at least one event type to listen to")]
    EmptyEventSet,

    /// A validator or waiter refers to an event type the waiter does not
    /// listen to.
    #[error("event `{event}` is not in the waiter's event set")]
    UnlistedEvent {
        /// Name of the offending event type.
        event: &'static str,
    },
}

/// Errors raised while resolving a typed value from a dispatch context.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Nothing offered a value of the requested type.
    #[error("no value of type `{target}` could be resolved from `{event}`")]
    Unresolved {
        /// Requested type.
        target: &'static str,
        /// Event type of the occurrence.
        event: &'static str,
    },

    /// A context provider failed.
    #[error("context provider failed")]
    Provider(#[source] BoxError),

    /// The post-processing decorator failed.
    #[error("decorator rejected the resolved value")]
    Decorator(#[source] BoxError),
}

/// Errors surfaced through a suspended wait.
#[derive(Error, Debug)]
pub enum WaitError {
    /// The occurrence passed every validator but the awaited value could not
    /// be extracted from it.
    #[error("failed to extract the awaited value: {0}")]
    Extraction(#[from] ResolveError),

    /// A headless decorator failed while inspecting an occurrence.
    #[error("headless decorator failed")]
    Decorator(#[source] BoxError),

    /// The pipeline dropped the listener before it settled.
    #[error("event pipeline closed before the wait settled")]
    PipelineClosed,
}
