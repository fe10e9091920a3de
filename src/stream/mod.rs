//! Bridges between publishers and asynchronous streams.
//!
//! [`PublisherExt::into_stream`] consumes a publisher as a [`Stream`] of
//! `Result`s, and [`from_stream`] turns a stream factory into a publisher.
//!
//! [`Stream`]: futures_core::Stream

use core::fmt;
use core::num::NonZeroUsize;

use crate::flow::Publisher;

mod from_stream;
mod subscriber_stream;

pub use from_stream::{from_stream, StreamPublisher};
pub use subscriber_stream::{SubscriberStream, DEFAULT_PREFETCH};

/// Extend [`Publisher`] with stream conversions.
pub trait PublisherExt: Publisher {
    /// Subscribe to the publisher and return its signals as a stream,
    /// requesting [`DEFAULT_PREFETCH`] items at a time.
    ///
    /// The subscription happens right away, not on first poll.
    fn into_stream(self) -> SubscriberStream<Self::Item, Self::Error>
    where
        Self: Sized,
        Self::Item: Send + 'static,
        Self::Error: fmt::Debug + Send + 'static,
    {
        self.into_stream_with_prefetch(DEFAULT_PREFETCH)
    }

    /// Like [`into_stream`](PublisherExt::into_stream), requesting
    /// `prefetch` items at a time.
    fn into_stream_with_prefetch(
        self,
        prefetch: NonZeroUsize,
    ) -> SubscriberStream<Self::Item, Self::Error>
    where
        Self: Sized,
        Self::Item: Send + 'static,
        Self::Error: fmt::Debug + Send + 'static,
    {
        SubscriberStream::new(&self, prefetch)
    }
}

impl<P> PublisherExt for P where P: Publisher + ?Sized {}
