//! Typed-extraction waiter.
//!
//! Resolves with one value of a target type pulled out of the occurrence
//! through the context-provider mechanism, after every validator in its
//! chain has accepted the occurrence.
//!
//! ```rust,ignore
//! let waiter = AnnotationWaiter::<Count>::for_event::<Ping>()
//!     .validator(|ping: &Ping| ping.user == 42)?
//!     .validator_for(|user: Option<UserId>| user.is_some());
//! let count = waiter.wait_on(&pipeline).wait().await?;
//! ```
//!
//! A validator whose type cannot be resolved still runs, with `None`. A
//! failing final extraction fails the wait.

use super::config_builders;
use crate::validator::{EventValidator, FallibleValidator, TypedValidator, ValidatorChain};
use interject_core::{
    BoxError, ConfigError, Decorator, DispatchContext, Event, EventKind, MatchOutcome, WaitError,
    Waiter, WaiterConfig,
};
use std::{fmt, marker::PhantomData};

/// A waiter resolving with a value of type `T` extracted from the occurrence.
pub struct AnnotationWaiter<T> {
    config: WaiterConfig,
    chain: ValidatorChain,
    decorator: Option<Box<dyn Decorator<T>>>,
    _target: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> AnnotationWaiter<T> {
    /// Create a waiter listening to `events`.
    pub fn new<I>(events: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = EventKind>,
    {
        Ok(Self::with_config(WaiterConfig::new(events)?))
    }

    /// Create a waiter listening to the single event type `E`.
    pub fn for_event<E: Event>() -> Self {
        Self::with_config(WaiterConfig::for_event::<E>())
    }

    /// Create a waiter from a prepared configuration.
    pub fn with_config(config: WaiterConfig) -> Self {
        Self {
            config,
            chain: ValidatorChain::new(),
            decorator: None,
            _target: PhantomData,
        }
    }

    /// Post-process the extracted value. Replaces any previous decorator.
    pub fn decorate_with<D: Decorator<T>>(mut self, decorator: D) -> Self {
        self.decorator = Some(Box::new(decorator));
        self
    }

    /// Append a predicate over the event itself.
    ///
    /// Fails if `E` is not one of the kinds this waiter listens to. An
    /// occurrence of another listed kind never passes this validator.
    pub fn validator<E, F>(mut self, predicate: F) -> Result<Self, ConfigError>
    where
        E: Event,
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        if !self.config.listens_to(EventKind::of::<E>()) {
            return Err(ConfigError::UnlistedEvent {
                event: std::any::type_name::<E>(),
            });
        }
        self.chain.push(EventValidator::<E, F>::new(predicate));
        Ok(self)
    }

    /// Append a predicate over a value of type `V` resolved from the context.
    pub fn validator_for<V, F>(mut self, predicate: F) -> Self
    where
        V: Send + 'static,
        F: Fn(Option<V>) -> bool + Send + Sync + 'static,
    {
        self.chain.push(TypedValidator::<V, F>::new(predicate));
        self
    }

    /// Append a fallible predicate; an error counts as a rejection.
    pub fn try_validator_for<V, F>(mut self, predicate: F) -> Self
    where
        V: Send + 'static,
        F: Fn(Option<V>) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        self.chain.push(FallibleValidator::<V, F>::new(predicate));
        self
    }

    /// The validator chain.
    pub fn chain(&self) -> &ValidatorChain {
        &self.chain
    }

    config_builders!();

    fn extract(&self, context: &DispatchContext) -> Result<T, WaitError> {
        let value = match &self.decorator {
            Some(decorator) => context.resolve_with::<T>(decorator.as_ref())?,
            None => context.resolve::<T>()?,
        };
        Ok(value)
    }
}

impl<T: Send + 'static> Waiter for AnnotationWaiter<T> {
    type Output = T;

    fn config(&self) -> &WaiterConfig {
        &self.config
    }

    async fn detect(&self, context: &DispatchContext) -> Result<MatchOutcome<T>, WaitError> {
        if !self.chain.accepts(context) {
            return Ok(MatchOutcome::Rejected);
        }
        self.extract(context).map(MatchOutcome::Resolved)
    }
}

impl<T> fmt::Debug for AnnotationWaiter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationWaiter")
            .field("target", &std::any::type_name::<T>())
            .field("config", &self.config)
            .field("chain", &self.chain)
            .field("decorated", &self.decorator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingPredicate;
    use interject_core::{Lookup, Occurrence, ResolveError};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct UserId(u64);

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Count(u32);

    #[derive(Debug)]
    struct Ping {
        user: u64,
        count: u32,
    }

    impl Event for Ping {
        fn provide(&self, lookup: &mut Lookup) {
            lookup.provide(UserId(self.user)).provide(Count(self.count));
        }
    }

    #[derive(Debug)]
    struct Pong;
    impl Event for Pong {}

    async fn detect<T: Send + 'static>(
        waiter: &AnnotationWaiter<T>,
        event: impl Event,
    ) -> Result<MatchOutcome<T>, WaitError> {
        let context = waiter.config().context(&Occurrence::new(event));
        waiter.detect(&context).await
    }

    #[tokio::test]
    async fn test_empty_chain_extracts() {
        let waiter = AnnotationWaiter::<Count>::for_event::<Ping>();
        let outcome = detect(&waiter, Ping { user: 1, count: 3 }).await.unwrap();
        assert_eq!(outcome, MatchOutcome::Resolved(Count(3)));
    }

    #[tokio::test]
    async fn test_chain_rejection_keeps_waiting() {
        let waiter = AnnotationWaiter::<Count>::for_event::<Ping>()
            .validator_for(|user: Option<UserId>| user == Some(UserId(42)));
        let outcome = detect(&waiter, Ping { user: 7, count: 3 }).await.unwrap();
        assert_eq!(outcome, MatchOutcome::Rejected);
    }

    #[tokio::test]
    async fn test_final_extraction_failure_is_hard_error() {
        let waiter = AnnotationWaiter::<String>::for_event::<Ping>();
        let result = detect(&waiter, Ping { user: 1, count: 1 }).await;
        assert!(matches!(
            result,
            Err(WaitError::Extraction(ResolveError::Unresolved { .. }))
        ));
    }

    #[tokio::test]
    async fn test_decorator_post_processes() {
        let waiter = AnnotationWaiter::<Count>::for_event::<Ping>()
            .decorate_with(|count: Count| -> Result<Count, BoxError> { Ok(Count(count.0 + 1)) });
        let outcome = detect(&waiter, Ping { user: 1, count: 3 }).await.unwrap();
        assert_eq!(outcome, MatchOutcome::Resolved(Count(4)));
    }

    #[tokio::test]
    async fn test_decorator_failure_is_extraction_error() {
        let waiter = AnnotationWaiter::<Count>::for_event::<Ping>()
            .decorate_with(|_: Count| -> Result<Count, BoxError> { Err("too small".into()) });
        let result = detect(&waiter, Ping { user: 1, count: 3 }).await;
        assert!(matches!(
            result,
            Err(WaitError::Extraction(ResolveError::Decorator(_)))
        ));
    }

    #[tokio::test]
    async fn test_short_circuit_skips_later_validators() {
        let later = CountingPredicate::new();
        let waiter = AnnotationWaiter::<Count>::for_event::<Ping>()
            .validator(|ping: &Ping| ping.user == 42)
            .unwrap()
            .validator_for(later.accepting::<UserId>());

        detect(&waiter, Ping { user: 1, count: 1 }).await.unwrap();
        assert_eq!(later.count(), 0);

        detect(&waiter, Ping { user: 42, count: 1 }).await.unwrap();
        assert_eq!(later.count(), 1);
    }

    #[tokio::test]
    async fn test_event_validator_rejects_other_kind() {
        let config = WaiterConfig::new([EventKind::of::<Ping>(), EventKind::of::<Pong>()]).unwrap();
        let waiter = AnnotationWaiter::<Count>::with_config(config)
            .validator(|_: &Ping| true)
            .unwrap();
        assert_eq!(detect(&waiter, Pong).await.unwrap(), MatchOutcome::Rejected);
    }

    #[test]
    fn test_validator_for_unlisted_event() {
        let result = AnnotationWaiter::<Count>::for_event::<Ping>().validator(|_: &Pong| true);
        assert!(matches!(result, Err(ConfigError::UnlistedEvent { .. })));
    }
}
