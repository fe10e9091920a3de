use core::fmt;
use core::num::NonZeroUsize;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use futures_core::Stream;

use crate::flow::{Publisher, Subscriber, Subscription};
use crate::hooks;

/// The number of items a [`SubscriberStream`] requests up front.
pub const DEFAULT_PREFETCH: NonZeroUsize = match NonZeroUsize::new(32) {
    Some(n) => n,
    None => unreachable!(),
};

/// A stream over the signals of a publisher.
///
/// Items arrive as `Ok`, a failure as a final `Err`. The stream requests
/// `prefetch` items when created and tops the demand up again once three
/// quarters of it have been consumed. Dropping the stream cancels the
/// subscription; failures which can no longer be yielded, including those
/// still queued, go to [`hooks::on_error_dropped`].
///
/// This `struct` is created by the [`into_stream`] method on the
/// [`PublisherExt`] trait. See its documentation for more.
///
/// [`into_stream`]: super::PublisherExt::into_stream
/// [`PublisherExt`]: super::PublisherExt
#[must_use = "streams do nothing unless polled"]
pub struct SubscriberStream<T, E> {
    shared: Arc<Shared<T, E>>,
    limit: usize,
    consumed: usize,
    done: bool,
}

struct Shared<T, E> {
    prefetch: NonZeroUsize,
    on_dropped: fn(&E),
    subscription: OnceLock<Arc<dyn Subscription>>,
    state: Mutex<State<T, E>>,
}

struct State<T, E> {
    queue: VecDeque<Result<T, E>>,
    terminated: bool,
    // The stream itself was dropped.
    closed: bool,
    waker: Option<Waker>,
}

impl<T, E> SubscriberStream<T, E>
where
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    /// Subscribe to `publisher` right away.
    pub(crate) fn new<P>(publisher: &P, prefetch: NonZeroUsize) -> Self
    where
        P: Publisher<Item = T, Error = E> + ?Sized,
    {
        let shared = Arc::new(Shared {
            prefetch,
            on_dropped: hooks::on_error_dropped::<E>,
            subscription: OnceLock::new(),
            state: Mutex::new(State {
                queue: VecDeque::with_capacity(prefetch.get()),
                terminated: false,
                closed: false,
                waker: None,
            }),
        });
        publisher.subscribe(shared.clone());

        let prefetch = prefetch.get();
        Self {
            shared,
            limit: prefetch - (prefetch >> 2),
            consumed: 0,
            done: false,
        }
    }
}

impl<T, E> Shared<T, E> {
    fn state(&self) -> MutexGuard<'_, State<T, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, signal: Option<Result<T, E>>) {
        let waker = {
            let mut state = self.state();
            if state.terminated || state.closed {
                drop(state);
                if let Some(Err(error)) = signal {
                    (self.on_dropped)(&error);
                }
                return;
            }
            match signal {
                Some(signal) => {
                    state.terminated = signal.is_err();
                    state.queue.push_back(signal);
                }
                None => state.terminated = true,
            }
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    fn request(&self, n: usize) {
        if let Some(subscription) = self.subscription.get() {
            subscription.request(n as u64);
        }
    }
}

impl<T, E> Subscriber<T, E> for Shared<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        if self.subscription.set(subscription.clone()).is_err() {
            subscription.cancel();
            return;
        }
        subscription.request(self.prefetch.get() as u64);
    }

    fn on_next(&self, item: T) {
        self.push(Some(Ok(item)));
    }

    fn on_error(&self, error: E) {
        self.push(Some(Err(error)));
    }

    fn on_complete(&self) {
        self.push(None);
    }
}

impl<T, E> Stream for SubscriberStream<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Item = Result<T, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        let next = {
            let mut state = self.shared.state();
            match state.queue.pop_front() {
                Some(next) => next,
                None if state.terminated => {
                    drop(state);
                    self.done = true;
                    return Poll::Ready(None);
                }
                None => {
                    let registered = state.waker.as_ref();
                    if !registered.is_some_and(|waker| waker.will_wake(cx.waker())) {
                        state.waker = Some(cx.waker().clone());
                    }
                    return Poll::Pending;
                }
            }
        };

        if next.is_err() {
            self.done = true;
        } else {
            self.consumed += 1;
            if self.consumed == self.limit {
                let consumed = std::mem::take(&mut self.consumed);
                self.shared.request(consumed);
            }
        }
        Poll::Ready(Some(next))
    }
}

impl<T, E> Drop for SubscriberStream<T, E> {
    fn drop(&mut self) {
        if let Some(subscription) = self.shared.subscription.get() {
            subscription.cancel();
        }
        let queue = {
            let mut state = self.shared.state();
            state.closed = true;
            state.waker = None;
            std::mem::take(&mut state.queue)
        };
        for error in queue.into_iter().filter_map(Result::err) {
            (self.shared.on_dropped)(&error);
        }
    }
}

impl<T, E> fmt::Debug for SubscriberStream<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberStream")
            .field("prefetch", &self.shared.prefetch)
            .field("consumed", &self.consumed)
            .field("done", &self.done)
            .finish()
    }
}
