use core::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::vec::subscribe_sources;
use crate::flow::{NoopSubscription, Publisher, Subscriber};
use crate::{BoxError, Error};

/// A publisher which races a lazily iterated collection of sources.
///
/// `sources` is called anew for every subscription and the iterable it
/// returns is consumed before anything is subscribed to. Each element is
/// either a source, an absent source (`Ok(None)`), or a failure to produce
/// the next element (`Err`). A failure, or a panic while producing or
/// iterating the collection, becomes the failure of the combined sequence.
///
/// # Examples
///
/// ```
/// use first_non_empty::flow::source::{self, FromIter};
/// use first_non_empty::iter::FirstNonEmptyIter;
/// use first_non_empty::prelude::*;
/// use first_non_empty::BoxError;
/// use futures::StreamExt;
///
/// type Source = FromIter<Vec<u8>, BoxError>;
///
/// futures::executor::block_on(async {
///     let race = FirstNonEmptyIter::new(|| -> Vec<Result<Option<Source>, BoxError>> {
///         vec![
///             Ok(Some(source::from_iter(vec![]))),
///             Ok(Some(source::from_iter(vec![1, 2]))),
///         ]
///     });
///     let items: Vec<_> = race
///         .into_stream()
///         .map(Result::unwrap)
///         .collect()
///         .await;
///     assert_eq!(items, vec![1, 2]);
/// })
/// ```
#[must_use = "publishers do nothing unless subscribed to"]
#[derive(Clone)]
pub struct FirstNonEmptyIter<F> {
    sources: F,
}

impl<F> FirstNonEmptyIter<F> {
    /// Race the sources produced by iterating over what `sources` returns.
    pub fn new(sources: F) -> Self {
        Self { sources }
    }

    /// Race the sources produced by `sources`, which may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSources`] when `sources` is `None`.
    pub fn try_from_iter(sources: Option<F>) -> Result<Self, Error> {
        sources.map(Self::new).ok_or(Error::MissingSources)
    }
}

impl<F, I, P, X> FirstNonEmptyIter<F>
where
    F: Fn() -> I,
    I: IntoIterator<Item = Result<Option<P>, X>>,
    X: Into<BoxError>,
{
    /// Resolve the sources of one subscription.
    fn resolve(&self) -> Result<Vec<Option<P>>, Error> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            (self.sources)()
                .into_iter()
                .map(|source| source.map_err(|err| Error::Iteration(err.into())))
                .collect::<Result<Vec<_>, _>>()
        }))
        .unwrap_or_else(|payload| Err(Error::from_panic(payload)))
    }
}

impl<F> fmt::Debug for FirstNonEmptyIter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstNonEmptyIter").finish_non_exhaustive()
    }
}

impl<F, I, P, X> Publisher for FirstNonEmptyIter<F>
where
    F: Fn() -> I + Send + Sync,
    I: IntoIterator<Item = Result<Option<P>, X>>,
    X: Into<BoxError>,
    P: Publisher,
    P::Item: Send + 'static,
    P::Error: From<Error> + fmt::Debug + Send + 'static,
{
    type Item = P::Item;
    type Error = P::Error;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Item, Self::Error>>) {
        match self.resolve() {
            Ok(sources) => subscribe_sources(&sources, subscriber),
            Err(error) => {
                tracing::debug!(%error, "failed to resolve the sources of a race");
                subscriber.on_subscribe(Arc::new(NoopSubscription));
                subscriber.on_error(error.into());
            }
        }
    }
}
