//! Direct-function waiter.

use super::config_builders;
use futures::future::{BoxFuture, FutureExt};
use interject_core::{
    ConfigError, DispatchContext, EventKind, MatchOutcome, WaitError, Waiter, WaiterConfig,
};
use std::{fmt, future::Future};

type MatchFn<T> = Box<dyn Fn(DispatchContext) -> BoxFuture<'static, Option<T>> + Send + Sync>;

/// A waiter driven by a caller-supplied async function.
///
/// The function is called once per candidate occurrence. `Some(value)`
/// resolves the wait; `None` keeps it outstanding.
///
/// # Example
///
/// ```rust,ignore
/// let waiter = FunctionWaiter::new([EventKind::of::<Message>()], |ctx| async move {
///     let text: Text = ctx.resolve().ok()?;
///     text.0.starts_with("yes").then_some(true)
/// })?;
/// ```
pub struct FunctionWaiter<T> {
    config: WaiterConfig,
    func: MatchFn<T>,
}

impl<T: Send + 'static> FunctionWaiter<T> {
    /// Create a waiter listening to `events`.
    pub fn new<I, F, Fut>(events: I, func: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = EventKind>,
        F: Fn(DispatchContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        Ok(Self::with_config(WaiterConfig::new(events)?, func))
    }

    /// Create a waiter from a prepared configuration.
    pub fn with_config<F, Fut>(config: WaiterConfig, func: F) -> Self
    where
        F: Fn(DispatchContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        Self {
            config,
            func: Box::new(move |context| func(context).boxed()),
        }
    }

    config_builders!();
}

impl<T: Send + 'static> Waiter for FunctionWaiter<T> {
    type Output = T;

    fn config(&self) -> &WaiterConfig {
        &self.config
    }

    async fn detect(&self, context: &DispatchContext) -> Result<MatchOutcome<T>, WaitError> {
        Ok((self.func)(context.clone()).await.into())
    }
}

impl<T> fmt::Debug for FunctionWaiter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionWaiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
