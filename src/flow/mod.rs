//! A push-based, backpressure-aware streaming contract.
//!
//! A [`Publisher`] produces a sequence of items for every [`Subscriber`] that
//! subscribes to it. The subscriber first receives a [`Subscription`] through
//! which it requests more items or cancels delivery. Signals for a single
//! subscription are delivered in strict sequence: zero or more items,
//! followed by at most one terminal signal.
//!
//! | Signal         | When is it delivered?                       |
//! | ---            | ---                                         |
//! | `on_subscribe` | Exactly once, before anything else          |
//! | `on_next`      | At most as many times as items requested    |
//! | `on_error`     | At most once, terminal                      |
//! | `on_complete`  | At most once, terminal                      |
//!
//! Signals may arrive on any thread, which is why all three traits are
//! `Send + Sync` and take `&self`.
//!
//! # Examples
//!
//! ```
//! use first_non_empty::flow::{source, Publisher, Subscriber, Subscription, UNBOUNDED};
//! use std::sync::{Arc, Mutex};
//!
//! struct Collect(Mutex<Vec<u8>>);
//!
//! impl Subscriber<u8, ()> for Collect {
//!     fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
//!         subscription.request(UNBOUNDED);
//!     }
//!     fn on_next(&self, item: u8) {
//!         self.0.lock().unwrap().push(item);
//!     }
//!     fn on_error(&self, _error: ()) {}
//!     fn on_complete(&self) {}
//! }
//!
//! let collect = Arc::new(Collect(Mutex::new(vec![])));
//! source::from_iter::<_, ()>(vec![1, 2, 3]).subscribe(collect.clone());
//! assert_eq!(*collect.0.lock().unwrap(), vec![1, 2, 3]);
//! ```

use std::sync::Arc;

pub mod source;

/// Requesting this many items lifts backpressure entirely.
pub const UNBOUNDED: u64 = u64::MAX;

/// The upstream control handle a [`Subscriber`] receives from a [`Publisher`].
pub trait Subscription: Send + Sync {
    /// Allow up to `n` more items to be delivered.
    ///
    /// Requests accumulate, saturating at [`UNBOUNDED`]. A request of zero
    /// items has no effect.
    fn request(&self, n: u64);

    /// Stop delivery and release resources.
    ///
    /// Cancelling more than once has no additional effect.
    fn cancel(&self);
}

/// The receiving end of a sequence.
pub trait Subscriber<T, E>: Send + Sync {
    /// Receive the handle used to request items or cancel.
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>);

    /// Receive the next item.
    fn on_next(&self, item: T);

    /// Receive the terminal failure.
    fn on_error(&self, error: E);

    /// Receive the terminal completion.
    fn on_complete(&self);
}

/// A producer of an asynchronous sequence of items.
pub trait Publisher: Send + Sync {
    /// The type of the elements being produced.
    type Item;

    /// The type of the terminal failure.
    type Error;

    /// Start delivering the sequence to `subscriber`.
    ///
    /// Every call starts an independent subscription.
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Item, Self::Error>>);
}

impl<P> Publisher for &P
where
    P: Publisher + ?Sized,
{
    type Item = P::Item;
    type Error = P::Error;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Item, Self::Error>>) {
        (**self).subscribe(subscriber)
    }
}

impl<P> Publisher for Box<P>
where
    P: Publisher + ?Sized,
{
    type Item = P::Item;
    type Error = P::Error;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Item, Self::Error>>) {
        (**self).subscribe(subscriber)
    }
}

impl<P> Publisher for Arc<P>
where
    P: Publisher + ?Sized,
{
    type Item = P::Item;
    type Error = P::Error;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Item, Self::Error>>) {
        (**self).subscribe(subscriber)
    }
}

/// A subscription with nothing behind it.
///
/// Handed out by sequences which terminate (or never signal) without ever
/// producing an item.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NoopSubscription;

impl Subscription for NoopSubscription {
    fn request(&self, _n: u64) {}

    fn cancel(&self) {}
}
