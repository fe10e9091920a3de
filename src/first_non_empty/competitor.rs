use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::coordinator::RaceCoordinator;
use crate::flow::{Subscriber, Subscription};
use crate::hooks;
use crate::Error;

/// Subscribes to one source on behalf of the race.
///
/// ```text
///            first item or error, try_win() = true
///   Racing ──────────────────────────────────────► Won ──► forwarding
///     │
///     └──────────────────────────────────────────► Lost (silent)
///            first item or error, try_win() = false
/// ```
pub(crate) struct Competitor<T, E> {
    index: usize,
    coordinator: Arc<RaceCoordinator<T, E>>,
    // Only touched by the thread currently delivering this source's signals,
    // which the source serializes.
    won: AtomicBool,
}

impl<T, E> Competitor<T, E>
where
    T: Send + 'static,
    E: From<Error> + fmt::Debug + Send + 'static,
{
    pub(crate) fn new(index: usize, coordinator: Arc<RaceCoordinator<T, E>>) -> Self {
        Self {
            index,
            coordinator,
            won: AtomicBool::new(false),
        }
    }

    /// Whether the signal being delivered may be forwarded downstream.
    fn enter(&self) -> bool {
        if self.won.load(Ordering::Relaxed) {
            return true;
        }
        if self.coordinator.has_lost(self.index) {
            return false;
        }
        if self.coordinator.try_win(self.index) {
            self.won.store(true, Ordering::Relaxed);
            return true;
        }
        // Lost. The winner's cancellation sweep reaches our upstream.
        false
    }
}

impl<T, E> Subscriber<T, E> for Competitor<T, E>
where
    T: Send + 'static,
    E: From<Error> + fmt::Debug + Send + 'static,
{
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        self.coordinator.set_upstream(self.index, subscription);
    }

    fn on_next(&self, item: T) {
        if self.enter() {
            self.coordinator.forward_next(item);
        }
    }

    fn on_error(&self, error: E) {
        if self.enter() {
            self.coordinator.forward_error(error);
        } else {
            hooks::on_error_dropped(&error);
        }
    }

    fn on_complete(&self) {
        if self.won.load(Ordering::Relaxed) {
            self.coordinator.forward_complete();
        } else if self.coordinator.resign() == 0 {
            self.coordinator.complete_exhausted();
        }
    }
}

impl<T, E> fmt::Debug for Competitor<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Competitor")
            .field("index", &self.index)
            .field("won", &self.won.load(Ordering::Relaxed))
            .finish()
    }
}
