use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use super::Demand;
use crate::flow::Subscription;

const EMPTY: u8 = 0;
const SET: u8 = 1;
const CANCELLED: u8 = 2;

/// A set-once cell for an upstream [`Subscription`].
///
/// Demand requested before the subscription arrives is accumulated and
/// handed over as soon as it is set. Cancelling before the subscription
/// arrives makes the slot cancel it on arrival.
///
/// ```text
///            set            cancel
///   EMPTY ────────► SET ────────────► CANCELLED
///     │                                  ▲
///     └──────────────────────────────────┘
///                    cancel
/// ```
pub(crate) struct UpstreamSlot {
    state: AtomicU8,
    handle: OnceLock<Arc<dyn Subscription>>,
    deferred: Demand,
}

impl UpstreamSlot {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            handle: OnceLock::new(),
            deferred: Demand::new(),
        }
    }

    /// Store the upstream subscription.
    ///
    /// Returns `false` if the slot was already cancelled or already held a
    /// subscription, in which case `subscription` has been cancelled.
    pub(crate) fn set(&self, subscription: Arc<dyn Subscription>) -> bool {
        if self.handle.set(subscription.clone()).is_err() {
            subscription.cancel();
            return false;
        }

        match self
            .state
            .compare_exchange(EMPTY, SET, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => {
                let missed = self.deferred.take();
                if missed > 0 {
                    subscription.request(missed);
                }
                true
            }
            Err(_) => {
                subscription.cancel();
                false
            }
        }
    }

    /// Forward a request upstream, or defer it until the subscription arrives.
    pub(crate) fn request(&self, n: u64) {
        if n == 0 {
            return;
        }
        match self.state.load(Ordering::SeqCst) {
            SET => {
                if let Some(handle) = self.handle.get() {
                    handle.request(n);
                }
            }
            CANCELLED => {}
            _ => {
                self.deferred.add(n);
                // `set` may have completed in between; whoever takes the
                // deferred demand forwards it.
                if self.state.load(Ordering::SeqCst) == SET {
                    let missed = self.deferred.take();
                    if missed > 0 {
                        if let Some(handle) = self.handle.get() {
                            handle.request(missed);
                        }
                    }
                }
            }
        }
    }

    /// Cancel the upstream subscription, now or as soon as it arrives.
    pub(crate) fn cancel(&self) {
        if self.state.swap(CANCELLED, Ordering::SeqCst) == SET {
            if let Some(handle) = self.handle.get() {
                handle.cancel();
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }
}

impl fmt::Debug for UpstreamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state.load(Ordering::Relaxed) {
            EMPTY => "empty",
            SET => "set",
            _ => "cancelled",
        };
        f.debug_struct("UpstreamSlot")
            .field("state", &state)
            .field("deferred", &self.deferred.get())
            .finish()
    }
}
