//! Raw-event waiter.

use super::config_builders;
use interject_core::{
    ConfigError, DispatchContext, Event, EventKind, MatchOutcome, WaitError, Waiter, WaiterConfig,
};
use std::{fmt, sync::Arc};

type EventPredicate<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

/// A waiter that resolves with the occurrence itself.
///
/// The resolved `Arc<E>` is the very instance that was published. An
/// optional extra predicate narrows which occurrences qualify; an occurrence
/// it refuses is rejected with [`MatchOutcome::RejectedStopPropagation`].
pub struct EventWaiter<E> {
    config: WaiterConfig,
    predicate: Option<EventPredicate<E>>,
}

impl<E: Event> EventWaiter<E> {
    /// Create a waiter listening to `E` only.
    pub fn new() -> Self {
        Self {
            config: WaiterConfig::for_event::<E>(),
            predicate: None,
        }
    }

    /// Create a waiter from a prepared configuration.
    ///
    /// The configuration may list several kinds, but it must include `E`;
    /// occurrences of the other kinds are always rejected.
    pub fn from_config(config: WaiterConfig) -> Result<Self, ConfigError> {
        if !config.listens_to(EventKind::of::<E>()) {
            return Err(ConfigError::UnlistedEvent {
                event: std::any::type_name::<E>(),
            });
        }
        Ok(Self {
            config,
            predicate: None,
        })
    }

    /// Set the extra predicate, replacing any previous one.
    pub fn with_validator<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    config_builders!();
}

impl<E: Event> Default for EventWaiter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> Waiter for EventWaiter<E> {
    type Output = Arc<E>;

    fn config(&self) -> &WaiterConfig {
        &self.config
    }

    async fn detect(&self, context: &DispatchContext) -> Result<MatchOutcome<Arc<E>>, WaitError> {
        let Some(event) = context.occurrence().downcast::<E>() else {
            return Ok(MatchOutcome::Rejected);
        };
        if self.predicate.as_ref().is_some_and(|predicate| !predicate(&event)) {
            return Ok(MatchOutcome::RejectedStopPropagation);
        }
        Ok(MatchOutcome::Resolved(event))
    }
}

impl<E> fmt::Debug for EventWaiter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventWaiter")
            .field("event", &std::any::type_name::<E>())
            .field("config", &self.config)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}
