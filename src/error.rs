use std::any::Any;

/// A type-erased error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the combinators of this crate.
///
/// Only [`Error::MissingSources`] is returned synchronously. Every other
/// variant is delivered as the failure signal of a sequence, which is why the
/// error type of the raced sources must implement `From<Error>`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The collection of sources itself was absent.
    #[error("the collection of sources is absent")]
    MissingSources,

    /// The source at `index` was absent.
    #[error("the source at index {index} is absent")]
    MissingSource {
        /// Position of the absent source in the collection.
        index: usize,
    },

    /// Iterating over a lazily provided collection of sources failed.
    #[error("failed to iterate over the sources")]
    Iteration(#[source] BoxError),

    /// A driver thread for a stream could not be started.
    #[error("failed to spawn a thread to drive the stream")]
    Spawn(#[source] std::io::Error),
}

impl Error {
    /// Convert a caught panic payload into an [`Error::Iteration`].
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "iterator panicked".to_owned()
        };
        Error::Iteration(message.into())
    }
}
