//! # interject-std
//!
//! Standard implementations for the Interject one-shot waiter framework.
//!
//! This crate provides:
//! - **Waiters**: [`FunctionWaiter`], [`EventWaiter`], [`AnnotationWaiter`]
//! - **Validator chains**: [`ValidatorChain`]
//! - **Waiting**: [`WaitController`] and the [`WaitExt`] shorthand
//! - **Reference pipeline**: [`Broadcast`]
//! - **Testing**: spies and recorders in [`testing`]
//!
//! [`FunctionWaiter`]: waiters::FunctionWaiter
//! [`EventWaiter`]: waiters::EventWaiter
//! [`AnnotationWaiter`]: waiters::AnnotationWaiter
//! [`ValidatorChain`]: validator::ValidatorChain
//! [`WaitController`]: controller::WaitController
//! [`WaitExt`]: controller::WaitExt
//! [`Broadcast`]: broadcast::Broadcast

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use interject_core;

// Modules
pub mod broadcast;
pub mod controller;
mod gate;
pub mod testing;
pub mod validator;
pub mod waiters;
