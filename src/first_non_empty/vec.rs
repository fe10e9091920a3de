use core::fmt;
use std::sync::Arc;

use super::coordinator::RaceCoordinator;
use super::FirstNonEmpty as FirstNonEmptyTrait;
use crate::flow::{NoopSubscription, Publisher, Subscriber};
use crate::Error;

/// A publisher which forwards the first of its sources to emit.
///
/// This `struct` is created by the [`first_non_empty`] method on the
/// [`FirstNonEmpty`] trait, or by [`FirstNonEmpty::try_from_sources`] when
/// the collection or some of its sources may be absent. See the trait's
/// documentation for more.
///
/// [`first_non_empty`]: crate::FirstNonEmpty::first_non_empty
/// [`FirstNonEmpty`]: crate::FirstNonEmpty
#[must_use = "publishers do nothing unless subscribed to"]
pub struct FirstNonEmpty<P> {
    sources: Vec<Option<P>>,
}

impl<P> FirstNonEmpty<P> {
    /// Race `sources` against each other.
    pub fn new(sources: Vec<P>) -> Self {
        Self {
            sources: sources.into_iter().map(Some).collect(),
        }
    }

    /// Race `sources`, some of which may be absent.
    ///
    /// An absent collection is rejected right away. An absent source is only
    /// reported once the race is subscribed to, as the failure of the
    /// combined sequence, unless another source already won by then.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSources`] when `sources` is `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use first_non_empty::flow::source::{self, Empty};
    /// use first_non_empty::vec::FirstNonEmpty;
    /// use first_non_empty::{BoxError, Error};
    ///
    /// let race = FirstNonEmpty::try_from_sources(Some(vec![
    ///     Some(source::empty::<u8, BoxError>()),
    ///     None,
    /// ]));
    /// assert!(race.is_ok());
    ///
    /// let race = FirstNonEmpty::<Empty<u8, BoxError>>::try_from_sources(None);
    /// assert!(matches!(race, Err(Error::MissingSources)));
    /// ```
    pub fn try_from_sources(sources: Option<Vec<Option<P>>>) -> Result<Self, Error> {
        sources
            .map(|sources| Self { sources })
            .ok_or(Error::MissingSources)
    }

    /// The number of sources, absent ones included.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether there are no sources at all.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl<P> fmt::Debug for FirstNonEmpty<P>
where
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.sources.iter()).finish()
    }
}

impl<P> Publisher for FirstNonEmpty<P>
where
    P: Publisher,
    P::Item: Send + 'static,
    P::Error: From<Error> + fmt::Debug + Send + 'static,
{
    type Item = P::Item;
    type Error = P::Error;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Item, Self::Error>>) {
        subscribe_sources(&self.sources, subscriber);
    }
}

/// Subscribe `subscriber` to the race between `sources`.
///
/// Zero sources complete right away and a single source is subscribed to
/// directly; only two or more sources pay for a coordinator.
pub(super) fn subscribe_sources<P>(
    sources: &[Option<P>],
    subscriber: Arc<dyn Subscriber<P::Item, P::Error>>,
) where
    P: Publisher,
    P::Item: Send + 'static,
    P::Error: From<Error> + fmt::Debug + Send + 'static,
{
    match sources {
        [] => {
            subscriber.on_subscribe(Arc::new(NoopSubscription));
            subscriber.on_complete();
        }
        [Some(source)] => source.subscribe(subscriber),
        [None] => {
            subscriber.on_subscribe(Arc::new(NoopSubscription));
            subscriber.on_error(Error::MissingSource { index: 0 }.into());
        }
        sources => RaceCoordinator::new(subscriber, sources.len()).subscribe(sources),
    }
}

impl<P> FirstNonEmptyTrait for Vec<P>
where
    P: Publisher,
    P::Item: Send + 'static,
    P::Error: From<Error> + fmt::Debug + Send + 'static,
{
    type Item = P::Item;
    type Error = P::Error;
    type Publisher = FirstNonEmpty<P>;

    fn first_non_empty(self) -> Self::Publisher {
        FirstNonEmpty::new(self)
    }
}
