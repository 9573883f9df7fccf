//! Standard waiter variants.
//!
//! - [`FunctionWaiter`] - resolves with whatever a caller-supplied async
//!   function returns
//! - [`EventWaiter`] - resolves with the event occurrence itself
//! - [`AnnotationWaiter`] - resolves with a typed value extracted from the
//!   occurrence after a chain of validators passes
//!
//! All three expose the same builder surface for their [`WaiterConfig`]:
//! priority, propagation blocking, context providers and headless
//! decorators.
//!
//! [`WaiterConfig`]: interject_core::WaiterConfig

/// Builder methods delegating to the waiter's `config` field.
macro_rules! config_builders {
    () => {
        /// Set priority (lower = offered occurrences earlier).
        pub fn with_priority(mut self, priority: i32) -> Self {
            self.config = self.config.with_priority(priority);
            self
        }

        /// Set whether an accepted occurrence stops at this waiter.
        pub fn with_block_propagation(mut self, block: bool) -> Self {
            self.config = self.config.with_block_propagation(block);
            self
        }

        /// Append a context provider.
        pub fn with_provider<P: interject_core::ContextProvider>(mut self, provider: P) -> Self {
            self.config = self.config.with_provider(provider);
            self
        }

        /// Append a headless decorator.
        pub fn with_decorator<D: interject_core::HeadlessDecorator>(mut self, decorator: D) -> Self {
            self.config = self.config.with_decorator(decorator);
            self
        }
    };
}

pub(crate) use config_builders;

mod annotation;
mod event;
mod function;

pub use annotation::AnnotationWaiter;
pub use event::EventWaiter;
pub use function::FunctionWaiter;
