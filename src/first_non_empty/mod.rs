use crate::flow::Publisher;

pub(crate) mod array;
mod competitor;
mod coordinator;
mod decision;
pub(crate) mod iter;
pub(crate) mod vec;

/// Forward the first publisher to produce an item or a failure.
///
/// All publishers are subscribed to concurrently. The first one to emit an
/// item, or to fail, wins: its signals are forwarded unmodified and in their
/// original order, and every other publisher is cancelled. Publishers which
/// complete without emitting anything drop out of the race; if they all do,
/// the combined sequence completes empty, exactly once.
///
/// | Sources | Behavior                                  |
/// | ---     | ---                                       |
/// | 0       | Completes immediately                     |
/// | 1       | Subscribes to the source directly         |
/// | N       | Races the sources, forwards the winner    |
///
/// # Backpressure
///
/// While nobody has won yet, every request is passed on to every publisher,
/// since any of them may turn out to be the winner. Afterwards requests only
/// reach the winner.
///
/// # Examples
///
/// ```
/// use first_non_empty::flow::source;
/// use first_non_empty::prelude::*;
/// use first_non_empty::BoxError;
/// use futures::StreamExt;
///
/// futures::executor::block_on(async {
///     let a = source::from_iter::<_, BoxError>(Vec::<u8>::new());
///     let b = source::from_iter::<_, BoxError>(vec![1, 2, 3]);
///     let c = source::from_iter::<_, BoxError>(vec![4, 5, 6]);
///
///     let items: Vec<_> = vec![a, b, c]
///         .first_non_empty()
///         .into_stream()
///         .map(Result::unwrap)
///         .collect()
///         .await;
///     assert_eq!(items, vec![1, 2, 3]);
/// })
/// ```
pub trait FirstNonEmpty {
    /// The resulting item type.
    type Item;

    /// The resulting error type.
    type Error;

    /// The publisher type.
    type Publisher: Publisher<Item = Self::Item, Error = Self::Error>;

    /// Race multiple publishers against each other.
    fn first_non_empty(self) -> Self::Publisher;
}
