#![allow(dead_code)]

use interject::{BoxError, Event, Lookup, Occurrence};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Test Event Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count(pub u32);

/// Never offered by any event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel(pub u64);

#[derive(Debug, Clone)]
pub struct Ping {
    pub user: u64,
    pub count: u32,
}

impl Event for Ping {
    fn provide(&self, lookup: &mut Lookup) {
        lookup.provide(UserId(self.user)).provide(Count(self.count));
    }
}

#[derive(Debug, Clone)]
pub struct Pong {
    pub user: u64,
}

impl Event for Pong {
    fn provide(&self, lookup: &mut Lookup) {
        lookup.provide(UserId(self.user));
    }
}

pub fn ping(user: u64, count: u32) -> Ping {
    Ping { user, count }
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// A provider that only counts the `Count` lookups it sees.
pub fn count_lookups(
    counter: interject::testing::CountingPredicate,
) -> impl Fn(&Occurrence, &mut Lookup) -> Result<(), BoxError> + Send + Sync + 'static {
    move |_: &Occurrence, lookup: &mut Lookup| -> Result<(), BoxError> {
        if lookup.wants::<Count>() {
            counter.hit();
        }
        Ok(())
    }
}

/// Run with `RUST_LOG=interject_std=trace cargo test -- --nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
