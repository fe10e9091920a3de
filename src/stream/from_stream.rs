use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll, Waker};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use futures_core::Stream;
use pin_project::pin_project;

use crate::flow::{Publisher, Subscriber, Subscription};
use crate::utils::Demand;
use crate::Error;

/// Creates a publisher which drives a fresh stream for every subscription.
///
/// Each subscription polls its stream on a dedicated thread, so several
/// subscriptions make progress independently of each other and of the
/// subscriber. Items are only polled for while there is outstanding demand.
///
/// # Examples
///
/// ```
/// use first_non_empty::prelude::*;
/// use first_non_empty::stream::from_stream;
/// use first_non_empty::BoxError;
/// use futures::StreamExt;
///
/// futures::executor::block_on(async {
///     let publisher = from_stream(|| futures::stream::iter(vec![Ok::<_, BoxError>(1), Ok(2)]));
///     let items: Vec<_> = publisher
///         .into_stream()
///         .map(Result::unwrap)
///         .collect()
///         .await;
///     assert_eq!(items, vec![1, 2]);
/// })
/// ```
pub fn from_stream<F, S>(factory: F) -> StreamPublisher<F>
where
    F: Fn() -> S,
    S: Stream,
{
    StreamPublisher { factory }
}

/// A publisher which drives a stream per subscription.
///
/// This `struct` is created by the [`from_stream`] function. See its
/// documentation for more.
#[must_use = "publishers do nothing unless subscribed to"]
#[derive(Clone)]
pub struct StreamPublisher<F> {
    factory: F,
}

impl<F> fmt::Debug for StreamPublisher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamPublisher").finish_non_exhaustive()
    }
}

impl<F, S, T, E> Publisher for StreamPublisher<F>
where
    F: Fn() -> S + Send + Sync,
    S: Stream<Item = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: From<Error> + Send + 'static,
{
    type Item = T;
    type Error = E;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T, E>>) {
        let shared = Arc::new(Shared {
            demand: Demand::new(),
            cancelled: AtomicBool::new(false),
            waker: Mutex::new(None),
        });
        subscriber.on_subscribe(Arc::new(StreamSubscription {
            shared: shared.clone(),
        }));
        if shared.is_cancelled() {
            return;
        }

        let drive = Drive {
            stream: (self.factory)(),
            subscriber: subscriber.clone(),
            shared,
        };
        let spawned = thread::Builder::new()
            .name("first-non-empty-stream".into())
            .spawn(move || futures_lite::future::block_on(drive));
        if let Err(err) = spawned {
            tracing::warn!(%err, "failed to spawn a stream driver");
            subscriber.on_error(Error::Spawn(err).into());
        }
    }
}

struct Shared {
    demand: Demand,
    cancelled: AtomicBool,
    waker: Mutex<Option<Waker>>,
}

impl Shared {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn register(&self, waker: &Waker) {
        let mut slot = self.waker.lock().unwrap_or_else(PoisonError::into_inner);
        if !slot.as_ref().is_some_and(|w| w.will_wake(waker)) {
            *slot = Some(waker.clone());
        }
    }

    fn wake(&self) {
        let waker = self
            .waker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

struct StreamSubscription {
    shared: Arc<Shared>,
}

impl Subscription for StreamSubscription {
    fn request(&self, n: u64) {
        if n == 0 {
            tracing::debug!("ignoring a request for zero items");
            return;
        }
        self.shared.demand.add(n);
        self.shared.wake();
    }

    fn cancel(&self) {
        if !self.shared.cancelled.swap(true, Ordering::AcqRel) {
            self.shared.wake();
        }
    }
}

/// Polls the stream whenever there is demand, until it terminates or the
/// subscription is cancelled.
#[pin_project]
struct Drive<S, T, E> {
    #[pin]
    stream: S,
    subscriber: Arc<dyn Subscriber<T, E>>,
    shared: Arc<Shared>,
}

impl<S, T, E> Future for Drive<S, T, E>
where
    S: Stream<Item = Result<T, E>>,
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        loop {
            if this.shared.is_cancelled() {
                return Poll::Ready(());
            }

            if this.shared.demand.get() == 0 {
                this.shared.register(cx.waker());
                // A request may have raced the registration.
                if this.shared.demand.get() == 0 && !this.shared.is_cancelled() {
                    return Poll::Pending;
                }
                continue;
            }

            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(item))) => {
                    this.shared.demand.produced(1);
                    this.subscriber.on_next(item);
                }
                Poll::Ready(Some(Err(err))) => {
                    this.subscriber.on_error(err);
                    return Poll::Ready(());
                }
                Poll::Ready(None) => {
                    this.subscriber.on_complete();
                    return Poll::Ready(());
                }
                Poll::Pending => {
                    // Cancellation must be able to wake us while the stream
                    // is idle too.
                    this.shared.register(cx.waker());
                    if this.shared.is_cancelled() {
                        return Poll::Ready(());
                    }
                    return Poll::Pending;
                }
            }
        }
    }
}
