use criterion::{black_box, criterion_group, criterion_main, Criterion};
use first_non_empty::flow::{source, Publisher, Subscriber, Subscription, UNBOUNDED};
use first_non_empty::prelude::*;
use first_non_empty::BoxError;
use futures_lite::future::block_on;
use futures_lite::prelude::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Source = source::FromIter<Vec<u64>, BoxError>;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("first_non_empty 10", |b| b.iter(|| race_test(black_box(10))));
    c.bench_function("first_non_empty 100", |b| b.iter(|| race_test(black_box(100))));
    c.bench_function("first_non_empty 1000", |b| b.iter(|| race_test(black_box(1000))));

    c.bench_function("first_non_empty stream 10", |b| {
        b.iter(|| race_stream_test(black_box(10)))
    });
    c.bench_function("first_non_empty stream 100", |b| {
        b.iter(|| race_stream_test(black_box(100)))
    });
    c.bench_function("first_non_empty stream 1000", |b| {
        b.iter(|| race_stream_test(black_box(1000)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

/// Every source but the last is empty, so all of them have to be subscribed
/// to before the race is decided.
fn sources(max: usize) -> Vec<Source> {
    (0..max)
        .map(|n| {
            let items = if n + 1 == max { (0..100).collect() } else { vec![] };
            source::from_iter(items)
        })
        .collect()
}

fn race_test(max: usize) {
    let counter = Arc::new(Counter::default());
    sources(max).first_non_empty().subscribe(counter.clone());
    assert_eq!(counter.items.load(Ordering::Relaxed), 100);
    assert_eq!(counter.completions.load(Ordering::Relaxed), 1);
}

fn race_stream_test(max: usize) {
    block_on(async {
        let mut s = sources(max).first_non_empty().into_stream();

        let mut counter = 0;
        while s.next().await.is_some() {
            counter += 1;
        }
        assert_eq!(counter, 100);
    })
}

/// A subscriber which counts what it receives.
#[derive(Default)]
struct Counter {
    items: AtomicUsize,
    completions: AtomicUsize,
}

impl Subscriber<u64, BoxError> for Counter {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        subscription.request(UNBOUNDED);
    }

    fn on_next(&self, _item: u64) {
        self.items.fetch_add(1, Ordering::Relaxed);
    }

    fn on_error(&self, error: BoxError) {
        panic!("unexpected failure: {error}");
    }

    fn on_complete(&self) {
        self.completions.fetch_add(1, Ordering::Relaxed);
    }
}
