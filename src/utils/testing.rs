//! Test doubles for both ends of a subscription.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::flow::{Publisher, Subscriber, Subscription};

/// A publisher whose signals are emitted by hand, from any thread.
///
/// It records the demand it receives and whether it was cancelled, but
/// enforces neither: tests decide what to emit.
pub(crate) struct TestPublisher<T, E> {
    inner: Arc<Inner<T, E>>,
}

struct Inner<T, E> {
    subscriber: Mutex<Option<Arc<dyn Subscriber<T, E>>>>,
    requested: AtomicU64,
    cancelled: AtomicBool,
    subscriptions: AtomicUsize,
}

impl<T, E> Clone for TestPublisher<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> TestPublisher<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                subscriber: Mutex::new(None),
                requested: AtomicU64::new(0),
                cancelled: AtomicBool::new(false),
                subscriptions: AtomicUsize::new(0),
            }),
        }
    }

    fn subscriber(&self) -> Option<Arc<dyn Subscriber<T, E>>> {
        self.inner.subscriber.lock().unwrap().clone()
    }

    pub(crate) fn next(&self, item: T) {
        if let Some(subscriber) = self.subscriber() {
            subscriber.on_next(item);
        }
    }

    pub(crate) fn error(&self, error: E) {
        let subscriber = self.inner.subscriber.lock().unwrap().take();
        if let Some(subscriber) = subscriber {
            subscriber.on_error(error);
        }
    }

    pub(crate) fn complete(&self) {
        let subscriber = self.inner.subscriber.lock().unwrap().take();
        if let Some(subscriber) = subscriber {
            subscriber.on_complete();
        }
    }

    /// Total demand received so far.
    pub(crate) fn requested(&self) -> u64 {
        self.inner.requested.load(Ordering::SeqCst)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn subscriptions(&self) -> usize {
        self.inner.subscriptions.load(Ordering::SeqCst)
    }
}

impl<T, E> Publisher for TestPublisher<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Item = T;
    type Error = E;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T, E>>) {
        self.inner.subscriptions.fetch_add(1, Ordering::SeqCst);
        *self.inner.subscriber.lock().unwrap() = Some(subscriber.clone());
        subscriber.on_subscribe(Arc::new(TestSubscription {
            inner: self.inner.clone(),
        }));
    }
}

struct TestSubscription<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Subscription for TestSubscription<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn request(&self, n: u64) {
        let _ = self
            .inner
            .requested
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |r| {
                Some(r.saturating_add(n))
            });
    }

    // Keeps the subscriber so tests can deliver signals which were already
    // in flight when the cancellation arrived.
    fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }
}

/// A subscriber which records every signal it receives.
pub(crate) struct TestSubscriber<T, E> {
    initial_request: u64,
    subscription: Mutex<Option<Arc<dyn Subscription>>>,
    items: Mutex<Vec<T>>,
    errors: Mutex<Vec<E>>,
    completions: AtomicUsize,
}

impl<T, E> TestSubscriber<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create a subscriber which requests `initial_request` items on subscribe.
    pub(crate) fn new(initial_request: u64) -> Arc<Self> {
        Arc::new(Self {
            initial_request,
            subscription: Mutex::new(None),
            items: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            completions: AtomicUsize::new(0),
        })
    }

    pub(crate) fn request(&self, n: u64) {
        let subscription = self.subscription.lock().unwrap().clone();
        if let Some(subscription) = subscription {
            subscription.request(n);
        }
    }

    pub(crate) fn cancel(&self) {
        let subscription = self.subscription.lock().unwrap().clone();
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        self.subscription.lock().unwrap().is_some()
    }

    pub(crate) fn errors(&self) -> usize {
        self.errors.lock().unwrap().len()
    }

    pub(crate) fn take_errors(&self) -> Vec<E> {
        std::mem::take(&mut *self.errors.lock().unwrap())
    }

    pub(crate) fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }

    pub(crate) fn terminations(&self) -> usize {
        self.errors() + self.completions()
    }
}

impl<T, E> TestSubscriber<T, E>
where
    T: Clone + Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn items(&self) -> Vec<T> {
        self.items.lock().unwrap().clone()
    }
}

impl<T, E> Subscriber<T, E> for TestSubscriber<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        *self.subscription.lock().unwrap() = Some(subscription.clone());
        if self.initial_request > 0 {
            subscription.request(self.initial_request);
        }
    }

    fn on_next(&self, item: T) {
        self.items.lock().unwrap().push(item);
    }

    fn on_error(&self, error: E) {
        self.errors.lock().unwrap().push(error);
    }

    fn on_complete(&self) {
        self.completions.fetch_add(1, Ordering::SeqCst);
    }
}
