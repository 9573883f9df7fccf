use interject::{
    ResolveError,
    prelude::*,
    testing::{CountingPredicate, SpyPipeline},
};
use std::sync::Arc;

mod common;
use common::{Channel, Count, Ping, Pong, UserId, count_lookups, init_tracing, ms, ping};

#[tokio::test(start_paused = true)]
async fn test_blocking_waiter_suppresses_lower_priority() {
    init_tracing();
    let pipeline = Broadcast::new();
    let first = EventWaiter::<Ping>::new()
        .with_priority(5)
        .with_block_propagation(true)
        .wait_on(&pipeline)
        .wait_timeout(ms(100));
    let second = EventWaiter::<Ping>::new()
        .with_priority(10)
        .wait_on(&pipeline)
        .wait_timeout(ms(100));
    let publish = async {
        tokio::task::yield_now().await;
        pipeline.publish(ping(1, 1)).await.unwrap()
    };

    let (first, second, report) = tokio::join!(first, second, publish);
    assert_eq!(first.unwrap().unwrap().user, 1);
    assert!(second.unwrap().is_none());
    assert!(report.stopped);
    assert_eq!(report.delivered, 1);
}

#[tokio::test]
async fn test_non_blocking_waiters_both_resolve() {
    let pipeline = Broadcast::new();
    let first = EventWaiter::<Ping>::new().with_priority(5).wait_on(&pipeline).wait();
    let second = EventWaiter::<Ping>::new().with_priority(10).wait_on(&pipeline).wait();
    let publish = async {
        tokio::task::yield_now().await;
        pipeline.publish(ping(3, 1)).await.unwrap()
    };

    let (first, second, report) = tokio::join!(first, second, publish);
    assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
    assert_eq!(report.delivered, 2);
}

#[tokio::test(start_paused = true)]
async fn test_refusing_blocking_waiter_stops_occurrence() {
    let pipeline = Broadcast::new();
    let picky = EventWaiter::<Ping>::new()
        .with_validator(|ping| ping.user == 99)
        .with_priority(5)
        .with_block_propagation(true)
        .wait_on(&pipeline)
        .wait_timeout(ms(50));
    let other = EventWaiter::<Ping>::new()
        .with_priority(10)
        .wait_on(&pipeline)
        .wait_timeout(ms(50));
    let publish = async {
        tokio::task::yield_now().await;
        pipeline.publish(ping(1, 1)).await.unwrap()
    };

    let (picky, other, report) = tokio::join!(picky, other, publish);
    assert!(picky.unwrap().is_none());
    assert!(other.unwrap().is_none());
    assert!(report.stopped);
}

#[tokio::test]
async fn test_event_waiter_returns_published_instance() {
    let pipeline = Broadcast::new();
    let event = Arc::new(ping(5, 5));
    let wait = EventWaiter::<Ping>::new().wait_on(&pipeline).wait();
    let publish = async {
        tokio::task::yield_now().await;
        pipeline
            .publish_occurrence(&Occurrence::from_arc(Arc::clone(&event)))
            .await
            .unwrap();
    };

    let (received, ()) = tokio::join!(wait, publish);
    assert!(Arc::ptr_eq(&received.unwrap(), &event));
}

#[tokio::test]
async fn test_typed_extraction_end_to_end() {
    init_tracing();
    let pipeline = SpyPipeline::default();
    let lookups = CountingPredicate::new();
    let wait = AnnotationWaiter::<Count>::for_event::<Ping>()
        .with_provider(count_lookups(lookups.clone()))
        .validator_for(|user: Option<UserId>| user == Some(UserId(42)))
        .wait_on(&pipeline)
        .wait();
    let publish = async {
        tokio::task::yield_now().await;
        pipeline.publish(ping(7, 1)).await.unwrap();
        assert_eq!(lookups.count(), 0);
        pipeline.publish(ping(42, 3)).await.unwrap();
    };

    let (count, ()) = tokio::join!(wait, publish);
    assert_eq!(count.unwrap(), Count(3));
    assert_eq!(lookups.count(), 1);
    assert_eq!(pipeline.active(), 0);
}

#[tokio::test]
async fn test_chain_short_circuits() {
    let pipeline = Broadcast::new();
    let first = CountingPredicate::new();
    let second = CountingPredicate::new();
    let wait = AnnotationWaiter::<Count>::for_event::<Ping>()
        .validator_for(first.rejecting::<UserId>())
        .validator_for(second.accepting::<Count>())
        .wait_on(&pipeline)
        .wait_timeout(ms(20));
    let publish = async {
        tokio::task::yield_now().await;
        pipeline.publish(ping(1, 1)).await.unwrap();
        pipeline.publish(ping(2, 2)).await.unwrap();
    };

    let (result, ()) = tokio::join!(wait, publish);
    assert!(result.unwrap().is_none());
    assert_eq!(first.count(), 2);
    assert_eq!(second.count(), 0);
}

#[tokio::test]
async fn test_unresolvable_validator_sees_none() {
    let pipeline = Broadcast::new();
    let calls = CountingPredicate::new();
    let seen = calls.clone();
    let wait = AnnotationWaiter::<UserId>::for_event::<Ping>()
        .validator_for(move |channel: Option<Channel>| {
            seen.hit();
            channel.is_none()
        })
        .wait_on(&pipeline)
        .wait();
    let publish = async {
        tokio::task::yield_now().await;
        pipeline.publish(ping(8, 1)).await.unwrap();
    };

    let (user, ()) = tokio::join!(wait, publish);
    assert_eq!(user.unwrap(), UserId(8));
    assert_eq!(calls.count(), 1);
}

/// Fails every lookup for `T` and stays silent for every other type.
fn failing_provider<T: 'static>(
) -> impl Fn(&Occurrence, &mut Lookup) -> Result<(), BoxError> + Send + Sync + 'static {
    |_: &Occurrence, lookup: &mut Lookup| -> Result<(), BoxError> {
        if lookup.wants::<T>() {
            return Err("directory offline".into());
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_provider_error_in_chain_sees_none() {
    let pipeline = SpyPipeline::default();
    let calls = CountingPredicate::new();
    let seen = calls.clone();
    let wait = AnnotationWaiter::<Count>::for_event::<Ping>()
        .with_provider(failing_provider::<Channel>())
        .validator_for(move |channel: Option<Channel>| {
            seen.hit();
            channel.is_none()
        })
        .wait_on(&pipeline)
        .wait();
    let publish = async {
        tokio::task::yield_now().await;
        pipeline.publish(ping(2, 6)).await.unwrap();
    };

    let (count, ()) = tokio::join!(wait, publish);
    assert_eq!(count.unwrap(), Count(6));
    assert_eq!(calls.count(), 1);
    assert_eq!(pipeline.active(), 0);
}

#[tokio::test]
async fn test_provider_error_on_target_fails_wait() {
    let pipeline = SpyPipeline::default();
    let wait = AnnotationWaiter::<Count>::for_event::<Ping>()
        .with_provider(failing_provider::<Count>())
        .validator_for(|user: Option<UserId>| user.is_some())
        .wait_on(&pipeline)
        .wait();
    let publish = async {
        tokio::task::yield_now().await;
        pipeline.publish(ping(2, 6)).await.unwrap();
    };

    let (result, ()) = tokio::join!(wait, publish);
    assert!(matches!(
        result,
        Err(WaitError::Extraction(ResolveError::Provider(_)))
    ));
    assert_eq!(pipeline.registered(), 1);
    assert_eq!(pipeline.active(), 0);
}

#[tokio::test]
async fn test_fallible_validator_error_keeps_waiting() {
    let pipeline = Broadcast::new();
    let wait = AnnotationWaiter::<Count>::for_event::<Ping>()
        .try_validator_for(|user: Option<UserId>| -> Result<bool, BoxError> {
            match user {
                Some(UserId(0)) => Err("anonymous user".into()),
                _ => Ok(true),
            }
        })
        .wait_on(&pipeline)
        .wait();
    let publish = async {
        tokio::task::yield_now().await;
        pipeline.publish(ping(0, 1)).await.unwrap();
        pipeline.publish(ping(5, 2)).await.unwrap();
    };

    let (count, ()) = tokio::join!(wait, publish);
    assert_eq!(count.unwrap(), Count(2));
}

#[tokio::test]
async fn test_function_waiter_over_several_kinds() {
    let pipeline = Broadcast::new();
    let waiter = FunctionWaiter::new(
        [EventKind::of::<Ping>(), EventKind::of::<Pong>()],
        |ctx: DispatchContext| async move {
            ctx.event::<Pong>()?;
            ctx.resolve::<UserId>().ok()
        },
    )
    .unwrap();
    let wait = waiter.wait_on(&pipeline).wait();
    let publish = async {
        tokio::task::yield_now().await;
        pipeline.publish(ping(1, 1)).await.unwrap();
        pipeline.publish(Pong { user: 9 }).await.unwrap();
    };

    let (user, ()) = tokio::join!(wait, publish);
    assert_eq!(user.unwrap(), UserId(9));
}

#[tokio::test]
async fn test_provider_overrides_event_values() {
    let pipeline = Broadcast::new();
    let wait = AnnotationWaiter::<UserId>::for_event::<Pong>()
        .with_provider(|occurrence: &Occurrence, lookup: &mut Lookup| -> Result<(), BoxError> {
            if let Some(pong) = occurrence.downcast_ref::<Pong>() {
                lookup.provide(UserId(pong.user + 1000));
            }
            Ok(())
        })
        .wait_on(&pipeline)
        .wait();
    let publish = async {
        tokio::task::yield_now().await;
        pipeline.publish(Pong { user: 1 }).await.unwrap();
    };

    let (user, ()) = tokio::join!(wait, publish);
    assert_eq!(user.unwrap(), UserId(1001));
}

#[tokio::test]
async fn test_decorated_extraction() {
    let pipeline = Broadcast::new();
    let wait = AnnotationWaiter::<Count>::for_event::<Ping>()
        .decorate_with(|count: Count| -> Result<Count, BoxError> {
            if count.0 > 100 {
                return Err("count out of range".into());
            }
            Ok(Count(count.0 * 10))
        })
        .wait_on(&pipeline)
        .wait();
    let publish = async {
        tokio::task::yield_now().await;
        pipeline.publish(ping(1, 4)).await.unwrap();
    };

    let (count, ()) = tokio::join!(wait, publish);
    assert_eq!(count.unwrap(), Count(40));
}

#[test]
fn test_configuration_errors() {
    assert_eq!(
        AnnotationWaiter::<Count>::new(Vec::<EventKind>::new()).unwrap_err(),
        ConfigError::EmptyEventSet
    );
    assert!(matches!(
        AnnotationWaiter::<Count>::for_event::<Ping>().validator(|_: &Pong| true),
        Err(ConfigError::UnlistedEvent { .. })
    ));
    assert!(EventWaiter::<Pong>::from_config(WaiterConfig::for_event::<Ping>()).is_err());
}
