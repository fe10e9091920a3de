#![cfg(feature = "stream")]

use first_non_empty::flow::{source, Publisher};
use first_non_empty::prelude::*;
use first_non_empty::stream::from_stream;
use first_non_empty::vec::FirstNonEmpty;
use first_non_empty::{BoxError, Error};
use futures_lite::future::block_on;
use futures_lite::prelude::*;
use rand::Rng;

use std::ops::RangeInclusive;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tokio::time::timeout;

type Source = Box<dyn Publisher<Item = u32, Error = BoxError>>;

fn boxed<P>(publisher: P) -> Source
where
    P: Publisher<Item = u32, Error = BoxError> + 'static,
{
    Box::new(publisher)
}

/// A source which emits `range` from its own thread, pausing randomly
/// between items.
fn jittery(range: RangeInclusive<u32>) -> Source {
    boxed(from_stream(move || {
        futures_lite::stream::iter(range.clone()).map(|n| {
            let pause = rand::thread_rng().gen_range(0..200);
            thread::sleep(Duration::from_micros(pause));
            Ok::<u32, BoxError>(n)
        })
    }))
}

fn collect(publisher: impl Publisher<Item = u32, Error = BoxError>) -> Vec<u32> {
    block_on(
        publisher
            .into_stream()
            .map(|item| item.expect("no failure"))
            .collect(),
    )
}

#[test]
fn one_of_two_concurrent_ranges() {
    let first: Vec<u32> = (1..=10).collect();
    let second: Vec<u32> = (11..=20).collect();

    for _ in 0..50 {
        let race = vec![jittery(1..=10), jittery(11..=20)].first_non_empty();
        let items = collect(race);
        assert!(
            items == first || items == second,
            "items were interleaved: {items:?}"
        );
    }
}

/// An endless source of `value`, which only starts emitting once every
/// other party reached `barrier`.
fn endless(value: u32, barrier: Arc<Barrier>) -> Source {
    boxed(from_stream(move || {
        let barrier = barrier.clone();
        futures_lite::stream::repeat(value)
            .enumerate()
            .map(move |(i, n)| {
                if i == 0 {
                    barrier.wait();
                }
                Ok::<u32, BoxError>(n)
            })
    }))
}

#[test]
fn first_to_emit_wins_between_endless_sources() {
    for _ in 0..20 {
        let barrier = Arc::new(Barrier::new(2));
        let race = vec![endless(1, barrier.clone()), endless(2, barrier)].first_non_empty();

        let items: Vec<u32> = block_on(
            race.into_stream()
                .take(200)
                .map(|item| item.expect("no failure"))
                .collect(),
        );
        assert_eq!(items.len(), 200);
        assert!(
            items.iter().all(|n| *n == items[0]),
            "items were interleaved: {items:?}"
        );
    }
}

#[test]
fn empty_sources_drop_out() {
    let race = vec![
        boxed(source::empty()),
        jittery(1..=3),
        boxed(source::empty()),
    ]
    .first_non_empty();
    assert_eq!(collect(race), vec![1, 2, 3]);
}

#[test]
fn all_empty_completes_empty() {
    let race = vec![
        boxed(source::empty()),
        boxed(from_stream(futures_lite::stream::empty::<Result<u32, BoxError>>)),
        boxed(source::from_iter(Vec::new())),
    ]
    .first_non_empty();
    assert_eq!(collect(race), Vec::<u32>::new());
}

#[test]
fn single_source_is_forwarded() {
    let race = vec![boxed(source::from_iter(vec![7, 8, 9]))].first_non_empty();
    assert_eq!(collect(race), vec![7, 8, 9]);
}

#[test]
fn failure_wins_the_race() {
    let failing = from_stream(|| futures_lite::stream::once(Err::<u32, BoxError>("boom".into())));
    let race = vec![boxed(source::never()), boxed(failing)].first_non_empty();
    block_on(async {
        let mut stream = race.into_stream();
        let error = stream.next().await.expect("a signal").unwrap_err();
        assert_eq!(error.to_string(), "boom");
        assert!(stream.next().await.is_none());
    })
}

#[test]
fn absent_source_fails_the_race() {
    let race = FirstNonEmpty::try_from_sources(Some(vec![Some(boxed(source::never())), None]))
        .expect("the collection is present");
    block_on(async {
        let mut stream = race.into_stream();
        let error = stream.next().await.expect("a signal").unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::MissingSource { index: 1 })
        ));
        assert!(stream.next().await.is_none());
    })
}

#[test]
fn absent_collection_is_rejected() {
    let race = FirstNonEmpty::<Source>::try_from_sources(None);
    assert!(matches!(race, Err(Error::MissingSources)));
}

#[tokio::test]
async fn never_and_empty_stay_pending() {
    let race = vec![boxed(source::never()), boxed(source::empty())].first_non_empty();
    let mut stream = race.into_stream();
    let next = timeout(Duration::from_millis(50), stream.next()).await;
    assert!(next.is_err(), "the race should not have terminated");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn race_on_a_multi_threaded_runtime() {
    let mut handles = vec![];
    for _ in 0..8 {
        handles.push(tokio::spawn(async {
            let race = vec![jittery(1..=5), jittery(6..=10), boxed(source::empty())]
                .first_non_empty();
            race.into_stream()
                .map(|item| item.expect("no failure"))
                .collect::<Vec<_>>()
                .await
        }));
    }

    for handle in handles {
        let items = handle.await.expect("task panicked");
        assert!(items == vec![1, 2, 3, 4, 5] || items == vec![6, 7, 8, 9, 10]);
    }
}
