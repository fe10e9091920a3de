use core::sync::atomic::{AtomicUsize, Ordering};

/// The outcome of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Nobody produced a qualifying signal yet.
    Undecided,
    /// The competitor at this index is the permanent winner.
    Won(usize),
    /// An absent source was found before anybody won.
    Misconfigured,
}

impl Decision {
    const UNDECIDED: usize = 0;
    const MISCONFIGURED: usize = 1;
    const WON_OFFSET: usize = 2;

    // A `Vec` never holds more than `isize::MAX` elements, so adding the
    // offset to an index cannot overflow.
    fn encode(self) -> usize {
        match self {
            Decision::Undecided => Self::UNDECIDED,
            Decision::Misconfigured => Self::MISCONFIGURED,
            Decision::Won(index) => index + Self::WON_OFFSET,
        }
    }

    fn decode(raw: usize) -> Self {
        match raw {
            Self::UNDECIDED => Decision::Undecided,
            Self::MISCONFIGURED => Decision::Misconfigured,
            index => Decision::Won(index - Self::WON_OFFSET),
        }
    }
}

/// A [`Decision`] which moves away from `Undecided` at most once.
#[derive(Debug)]
pub(crate) struct DecisionCell {
    raw: AtomicUsize,
}

impl DecisionCell {
    pub(crate) fn new() -> Self {
        Self {
            raw: AtomicUsize::new(Decision::Undecided.encode()),
        }
    }

    pub(crate) fn load(&self) -> Decision {
        Decision::decode(self.raw.load(Ordering::Acquire))
    }

    /// Move from `Undecided` to `decision`.
    ///
    /// Returns the decision that was already made on failure.
    fn decide(&self, decision: Decision) -> Result<(), Decision> {
        self.raw
            .compare_exchange(
                Decision::Undecided.encode(),
                decision.encode(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(drop)
            .map_err(Decision::decode)
    }

    /// Returns `true` to exactly one caller across all threads, and only if
    /// the race was not misconfigured first.
    pub(crate) fn try_win(&self, index: usize) -> bool {
        self.decide(Decision::Won(index)).is_ok()
    }

    pub(crate) fn try_misconfigure(&self) -> bool {
        self.decide(Decision::Misconfigured).is_ok()
    }
}
