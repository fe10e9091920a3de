//! Process-wide hooks.
//!
//! A failure must never disappear silently. When a sequence can no longer
//! deliver an error downstream (it already terminated, was cancelled, or the
//! error lost a race), the error is handed to the dropped-error hook instead.
//! Without an installed hook the error is logged at `ERROR` level through
//! [`tracing`].
//!
//! # Examples
//!
//! ```
//! use first_non_empty::hooks;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let dropped = Arc::new(AtomicUsize::new(0));
//! let counter = dropped.clone();
//! hooks::set_on_error_dropped(move |_error| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! hooks::on_error_dropped(&"late failure");
//! assert_eq!(dropped.load(Ordering::SeqCst), 1);
//!
//! hooks::reset_on_error_dropped();
//! ```

use core::fmt;
use std::sync::{Arc, PoisonError, RwLock};

type Hook = Arc<dyn Fn(&dyn fmt::Debug) + Send + Sync + 'static>;

static ON_ERROR_DROPPED: RwLock<Option<Hook>> = RwLock::new(None);

/// Install the process-wide dropped-error hook, replacing any previous one.
pub fn set_on_error_dropped<F>(hook: F)
where
    F: Fn(&dyn fmt::Debug) + Send + Sync + 'static,
{
    let mut slot = ON_ERROR_DROPPED
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *slot = Some(Arc::new(hook));
}

/// Remove the installed dropped-error hook, restoring the logging default.
pub fn reset_on_error_dropped() {
    let mut slot = ON_ERROR_DROPPED
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *slot = None;
}

/// Report an error which could not be delivered downstream.
pub fn on_error_dropped<E>(error: &E)
where
    E: fmt::Debug + ?Sized,
{
    // Clone the hook out so it runs without holding the lock.
    let hook = ON_ERROR_DROPPED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match hook {
        Some(hook) => hook(&error),
        None => tracing::error!(?error, "error dropped"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    static SERIAL: Mutex<()> = Mutex::new(());

    /// Captures dropped errors as their `Debug` rendering while alive.
    ///
    /// The hook is process-wide, so captures are serialized.
    pub(crate) struct Capture {
        dropped: Arc<Mutex<Vec<String>>>,
        _serial: MutexGuard<'static, ()>,
    }

    impl Capture {
        pub(crate) fn install() -> Self {
            let serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
            let dropped = Arc::new(Mutex::new(Vec::new()));
            let sink = dropped.clone();
            set_on_error_dropped(move |error| sink.lock().unwrap().push(format!("{error:?}")));
            Self {
                dropped,
                _serial: serial,
            }
        }

        pub(crate) fn dropped(&self) -> Vec<String> {
            self.dropped.lock().unwrap().clone()
        }
    }

    impl Drop for Capture {
        fn drop(&mut self) {
            reset_on_error_dropped();
        }
    }

    #[test]
    fn hook_receives_errors() {
        let capture = Capture::install();
        on_error_dropped(&"oh no");
        on_error_dropped(&String::from("again"));
        assert_eq!(capture.dropped(), vec!["\"oh no\"", "\"again\""]);
    }

    #[test]
    fn default_does_not_panic() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        reset_on_error_dropped();
        on_error_dropped(&42);
    }
}
