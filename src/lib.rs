//! Race push-based sequences and keep the first one that isn't empty.
//!
//! A [`Publisher`][flow::Publisher] produces items for the subscribers that
//! ask for them, honoring their demand. This library combines a collection of
//! publishers into one: all of them are subscribed to concurrently, and the
//! first to produce an item or a failure wins. Its signals are forwarded
//! unmodified while every other publisher is cancelled. Publishers which
//! complete without producing anything drop out of the race, and if all of
//! them do, the combined sequence completes empty.
//!
//! See the [`flow`] module for the streaming contract, and the [`stream`]
//! module to consume a publisher as a `Stream`.
//!
//! # Operations
//!
//! This library provides the following operations on arrays, vecs, and lazy
//! iterators of publishers:
//!
//! - [`FirstNonEmpty`]: Forward the first publisher to produce an item or a failure.
//! - [`iter::FirstNonEmptyIter`]: Like [`FirstNonEmpty`], resolving the
//!   publishers anew for every subscription.
//!
//! # Examples
//!
//! Race a slow source against one which finishes without producing anything:
//! ```rust
//! use first_non_empty::flow::Publisher;
//! use first_non_empty::prelude::*;
//! use first_non_empty::stream::from_stream;
//! use first_non_empty::BoxError;
//! use futures::StreamExt;
//!
//! type Source = Box<dyn Publisher<Item = u8, Error = BoxError>>;
//!
//! futures::executor::block_on(async {
//!     let empty = from_stream(|| futures::stream::empty::<Result<u8, BoxError>>());
//!     let slow = from_stream(|| futures::stream::iter(1..=3).map(Ok::<u8, BoxError>));
//!
//!     let sources: Vec<Source> = vec![Box::new(empty), Box::new(slow)];
//!     let items: Vec<_> = sources
//!         .first_non_empty()
//!         .into_stream()
//!         .map(Result::unwrap)
//!         .collect()
//!         .await;
//!     assert_eq!(items, vec![1, 2, 3]);
//! })
//! ```
//!
//! # Errors
//!
//! Absent sources and failures to iterate over the sources are reported as
//! [`Error`]s. Since they are delivered through the combined sequence, the
//! error type of the sources must implement `From<Error>`; [`BoxError`] does.
//! Failures which can no longer be delivered are handed to
//! [`hooks::on_error_dropped`].

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod error;
mod first_non_empty;
mod utils;

pub mod flow;
pub mod hooks;
#[cfg(feature = "stream")]
pub mod stream;

pub use error::{BoxError, Error};
pub use first_non_empty::FirstNonEmpty;

/// The first-non-empty prelude.
pub mod prelude {
    pub use super::flow::Publisher as _;
    pub use super::FirstNonEmpty as _;

    #[cfg(feature = "stream")]
    pub use super::stream::PublisherExt as _;
}

/// The publisher returned when racing a `Vec` or an array of publishers.
pub mod vec {
    pub use crate::first_non_empty::vec::FirstNonEmpty;
}

/// Helper functions and types for lazily iterated collections.
pub mod iter {
    pub use crate::first_non_empty::iter::FirstNonEmptyIter;
}
