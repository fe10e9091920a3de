//! Elementary publishers.

use core::fmt;
use core::iter::Peekable;
use core::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{NoopSubscription, Publisher, Subscriber, Subscription};
use crate::utils::Demand;

/// Creates a publisher which completes without emitting any items.
pub fn empty<T, E>() -> Empty<T, E> {
    Empty {
        _marker: PhantomData,
    }
}

/// A publisher which completes without emitting any items.
///
/// This `struct` is created by the [`empty`] function. See its documentation
/// for more.
pub struct Empty<T, E> {
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<T, E> fmt::Debug for Empty<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Empty").finish()
    }
}

impl<T, E> Clone for Empty<T, E> {
    fn clone(&self) -> Self {
        empty()
    }
}

impl<T, E> Publisher for Empty<T, E> {
    type Item = T;
    type Error = E;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T, E>>) {
        subscriber.on_subscribe(Arc::new(NoopSubscription));
        subscriber.on_complete();
    }
}

/// Creates a publisher which never signals anything beyond `on_subscribe`.
pub fn never<T, E>() -> Never<T, E> {
    Never {
        _marker: PhantomData,
    }
}

/// A publisher which never emits and never terminates.
///
/// This `struct` is created by the [`never`] function. See its documentation
/// for more.
pub struct Never<T, E> {
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<T, E> fmt::Debug for Never<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Never").finish()
    }
}

impl<T, E> Clone for Never<T, E> {
    fn clone(&self) -> Self {
        never()
    }
}

impl<T, E> Publisher for Never<T, E> {
    type Item = T;
    type Error = E;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T, E>>) {
        subscriber.on_subscribe(Arc::new(NoopSubscription));
    }
}

/// Creates a publisher which fails immediately with `error`.
///
/// Every subscription receives its own clone of the error.
pub fn fail<T, E>(error: E) -> Fail<T, E>
where
    E: Clone,
{
    Fail {
        error,
        _marker: PhantomData,
    }
}

/// A publisher which fails immediately.
///
/// This `struct` is created by the [`fail`] function. See its documentation
/// for more.
pub struct Fail<T, E> {
    error: E,
    _marker: PhantomData<fn() -> T>,
}

impl<T, E: fmt::Debug> fmt::Debug for Fail<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fail").field("error", &self.error).finish()
    }
}

impl<T, E> Publisher for Fail<T, E>
where
    E: Clone + Send + Sync,
{
    type Item = T;
    type Error = E;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T, E>>) {
        subscriber.on_subscribe(Arc::new(NoopSubscription));
        subscriber.on_error(self.error.clone());
    }
}

/// Creates a publisher which emits the items of an iterable.
///
/// Items are emitted on whichever thread requests them, never more than were
/// requested. Each subscription iterates over its own clone of `iter`.
///
/// # Examples
///
/// ```
/// use first_non_empty::flow::source;
/// use first_non_empty::prelude::*;
/// use futures::StreamExt;
///
/// futures::executor::block_on(async {
///     let items: Vec<_> = source::from_iter::<_, ()>(1..=3)
///         .into_stream()
///         .map(Result::unwrap)
///         .collect()
///         .await;
///     assert_eq!(items, vec![1, 2, 3]);
/// })
/// ```
pub fn from_iter<I, E>(iter: I) -> FromIter<I, E>
where
    I: IntoIterator + Clone,
{
    FromIter {
        iter,
        _marker: PhantomData,
    }
}

/// A publisher which emits the items of an iterable.
///
/// This `struct` is created by the [`from_iter`] function. See its
/// documentation for more.
pub struct FromIter<I, E> {
    iter: I,
    _marker: PhantomData<fn() -> E>,
}

impl<I: fmt::Debug, E> fmt::Debug for FromIter<I, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromIter").field("iter", &self.iter).finish()
    }
}

impl<I: Clone, E> Clone for FromIter<I, E> {
    fn clone(&self) -> Self {
        FromIter {
            iter: self.iter.clone(),
            _marker: PhantomData,
        }
    }
}

impl<I, E> Publisher for FromIter<I, E>
where
    I: IntoIterator + Clone + Send + Sync,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
    E: Send + 'static,
{
    type Item = I::Item;
    type Error = E;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<I::Item, E>>) {
        let mut iter = self.iter.clone().into_iter().peekable();
        if iter.peek().is_none() {
            subscriber.on_subscribe(Arc::new(NoopSubscription));
            subscriber.on_complete();
            return;
        }

        let subscription = Arc::new(IterSubscription {
            iter: Mutex::new(iter),
            subscriber: Mutex::new(Some(subscriber.clone())),
            demand: Demand::new(),
            cancelled: AtomicBool::new(false),
        });
        subscriber.on_subscribe(subscription);
    }
}

struct IterSubscription<It, E>
where
    It: Iterator,
{
    iter: Mutex<Peekable<It>>,
    subscriber: Mutex<Option<Arc<dyn Subscriber<It::Item, E>>>>,
    demand: Demand,
    cancelled: AtomicBool,
}

impl<It, E> IterSubscription<It, E>
where
    It: Iterator + Send,
    It::Item: Send + 'static,
    E: Send + 'static,
{
    fn next(&self) -> Option<It::Item> {
        self.iter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next()
    }

    fn is_exhausted(&self) -> bool {
        self.iter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .peek()
            .is_none()
    }

    fn release(&self) -> Option<Arc<dyn Subscriber<It::Item, E>>> {
        self.subscriber
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Emit as many items as there is demand for.
    ///
    /// Only the caller which raised the demand from zero runs this loop, so
    /// emission is serialized even when requests arrive concurrently.
    fn drain(&self) {
        let subscriber = self
            .subscriber
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(subscriber) = subscriber else {
            return;
        };

        let mut emitted = 0;
        loop {
            let requested = self.demand.get();
            while emitted != requested {
                if self.cancelled.load(Ordering::Acquire) {
                    return;
                }
                let Some(item) = self.next() else {
                    break;
                };
                subscriber.on_next(item);
                emitted += 1;

                if self.is_exhausted() {
                    if !self.cancelled.load(Ordering::Acquire) && self.release().is_some() {
                        subscriber.on_complete();
                    }
                    return;
                }
            }

            if self.cancelled.load(Ordering::Acquire) {
                return;
            }
            if self.demand.produced(emitted) == 0 {
                return;
            }
            emitted = 0;
        }
    }
}

impl<It, E> Subscription for IterSubscription<It, E>
where
    It: Iterator + Send,
    It::Item: Send + 'static,
    E: Send + 'static,
{
    fn request(&self, n: u64) {
        if n == 0 {
            tracing::debug!("ignoring a request for zero items");
            return;
        }
        if self.demand.add(n) == 0 {
            self.drain();
        }
    }

    fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            self.release();
        }
    }
}
