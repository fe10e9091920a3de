use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::competitor::Competitor;
use super::decision::{Decision, DecisionCell};
use crate::flow::{Publisher, Subscriber, Subscription};
use crate::hooks;
use crate::utils::UpstreamSlot;
use crate::Error;

/// The shared state of a single race.
///
/// The coordinator is the single source of truth for who won. It is handed
/// to the downstream subscriber as its [`Subscription`], so it fans requests
/// and cancellation out to the competitors: to all of them while the race is
/// undecided, and to the winner only afterwards.
///
/// Competitors are addressed by index. Their upstream subscriptions live in
/// `upstreams`, so the coordinator never holds on to a competitor itself.
pub(crate) struct RaceCoordinator<T, E> {
    downstream: Arc<dyn Subscriber<T, E>>,
    decision: DecisionCell,
    remaining: AtomicUsize,
    cancelled: AtomicBool,
    upstreams: Box<[UpstreamSlot]>,
}

impl<T, E> RaceCoordinator<T, E>
where
    T: Send + 'static,
    E: From<Error> + fmt::Debug + Send + 'static,
{
    pub(crate) fn new(downstream: Arc<dyn Subscriber<T, E>>, len: usize) -> Arc<Self> {
        Arc::new(Self {
            downstream,
            decision: DecisionCell::new(),
            remaining: AtomicUsize::new(len),
            cancelled: AtomicBool::new(false),
            upstreams: (0..len).map(|_| UpstreamSlot::new()).collect(),
        })
    }

    /// Hand ourselves to the downstream, then subscribe a competitor to each
    /// source in order.
    ///
    /// Subscribing stops as soon as the race is decided or cancelled: a
    /// synchronous source may win before the later sources are reached.
    pub(crate) fn subscribe<P>(self: &Arc<Self>, sources: &[Option<P>])
    where
        P: Publisher<Item = T, Error = E>,
    {
        debug_assert_eq!(sources.len(), self.upstreams.len());
        self.downstream.on_subscribe(self.clone());

        for (index, source) in sources.iter().enumerate() {
            if self.is_cancelled() || self.decision.load() != Decision::Undecided {
                return;
            }
            match source {
                Some(source) => source.subscribe(Arc::new(Competitor::new(index, self.clone()))),
                None => {
                    self.misconfigure(index);
                    return;
                }
            }
        }
    }

    fn misconfigure(&self, index: usize) {
        if !self.decision.try_misconfigure() {
            // Somebody won in the meantime; the absent source is irrelevant.
            return;
        }
        tracing::debug!(index, "absent source, abandoning the race");
        self.cancel_all();
        self.forward_error(Error::MissingSource { index }.into());
    }

    pub(crate) fn set_upstream(&self, index: usize, subscription: Arc<dyn Subscription>) {
        self.upstreams[index].set(subscription);
    }

    /// Whether somebody other than `index` already won, or the race was
    /// abandoned.
    pub(crate) fn has_lost(&self, index: usize) -> bool {
        match self.decision.load() {
            Decision::Undecided => false,
            Decision::Won(winner) => winner != index,
            Decision::Misconfigured => true,
        }
    }

    /// Try to become the winner.
    ///
    /// Returns `true` to exactly one competitor. The winner's rivals are
    /// cancelled before this returns.
    pub(crate) fn try_win(&self, index: usize) -> bool {
        if !self.decision.try_win(index) {
            return false;
        }
        tracing::trace!(index, "competitor won the race");
        for (i, upstream) in self.upstreams.iter().enumerate() {
            if i != index {
                upstream.cancel();
            }
        }
        true
    }

    /// Record that a competitor completed without emitting anything.
    ///
    /// Returns the number of competitors still racing. Exactly one caller
    /// observes zero.
    pub(crate) fn resign(&self) -> usize {
        // A competitor resigns at most once, so the counter never underflows
        // unless a source signals completion twice.
        self.remaining.fetch_sub(1, Ordering::AcqRel).wrapping_sub(1)
    }

    /// Complete the downstream after every competitor resigned.
    pub(crate) fn complete_exhausted(&self) {
        if self.decision.load() != Decision::Undecided || self.is_cancelled() {
            return;
        }
        tracing::debug!(
            competitors = self.upstreams.len(),
            "every source completed empty"
        );
        self.downstream.on_complete();
    }

    pub(crate) fn forward_next(&self, item: T) {
        if !self.is_cancelled() {
            self.downstream.on_next(item);
        }
    }

    pub(crate) fn forward_error(&self, error: E) {
        if self.is_cancelled() {
            hooks::on_error_dropped(&error);
        } else {
            self.downstream.on_error(error);
        }
    }

    pub(crate) fn forward_complete(&self) {
        if !self.is_cancelled() {
            self.downstream.on_complete();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn cancel_all(&self) {
        for upstream in self.upstreams.iter() {
            upstream.cancel();
        }
    }
}

impl<T, E> Subscription for RaceCoordinator<T, E>
where
    T: Send + 'static,
    E: From<Error> + fmt::Debug + Send + 'static,
{
    fn request(&self, n: u64) {
        match self.decision.load() {
            Decision::Won(winner) => self.upstreams[winner].request(n),
            // Nobody knows who will win yet, so everybody must be allowed to
            // produce enough to win.
            Decision::Undecided => {
                for upstream in self.upstreams.iter() {
                    upstream.request(n);
                }
            }
            Decision::Misconfigured => {}
        }
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        // A concurrent `try_win` cancels everybody but the winner, so both
        // orders leave every upstream cancelled.
        match self.decision.load() {
            Decision::Won(winner) => self.upstreams[winner].cancel(),
            Decision::Undecided | Decision::Misconfigured => self.cancel_all(),
        }
    }
}

impl<T, E> fmt::Debug for RaceCoordinator<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaceCoordinator")
            .field("decision", &self.decision.load())
            .field("remaining", &self.remaining.load(Ordering::Relaxed))
            .field("cancelled", &self.cancelled.load(Ordering::Relaxed))
            .field("upstreams", &self.upstreams)
            .finish()
    }
}
