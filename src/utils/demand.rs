use core::sync::atomic::{AtomicU64, Ordering};

use crate::flow::UNBOUNDED;

/// Add two demands, saturating at [`UNBOUNDED`].
#[inline]
pub(crate) fn add_cap(a: u64, b: u64) -> u64 {
    a.saturating_add(b)
}

/// Outstanding demand of a single subscription.
///
/// Once the demand reaches [`UNBOUNDED`] it is never decremented again.
#[derive(Debug, Default)]
pub(crate) struct Demand {
    requested: AtomicU64,
}

impl Demand {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add `n` to the demand. Returns the demand before the addition.
    ///
    /// Sequentially consistent, so it is totally ordered with the state
    /// transitions of [`UpstreamSlot`](super::UpstreamSlot).
    pub(crate) fn add(&self, n: u64) -> u64 {
        let prev = self
            .requested
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |r| {
                Some(add_cap(r, n))
            });
        // The closure never returns `None`.
        match prev {
            Ok(r) | Err(r) => r,
        }
    }

    /// Subtract `n` delivered items from the demand. Returns the remaining
    /// demand.
    pub(crate) fn produced(&self, n: u64) -> u64 {
        let prev = self
            .requested
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| {
                if r == UNBOUNDED {
                    None
                } else {
                    Some(r.saturating_sub(n))
                }
            });
        match prev {
            Ok(r) => r.saturating_sub(n),
            Err(r) => r,
        }
    }

    /// Take the whole outstanding demand, leaving zero behind.
    pub(crate) fn take(&self) -> u64 {
        self.requested.swap(0, Ordering::SeqCst)
    }

    pub(crate) fn get(&self) -> u64 {
        self.requested.load(Ordering::Acquire)
    }
}
