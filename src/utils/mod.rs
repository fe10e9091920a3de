//! Building blocks shared by the publishers of this crate.

mod demand;
mod upstream;

pub(crate) use demand::Demand;
pub(crate) use upstream::UpstreamSlot;

#[cfg(test)]
mod testing;
#[cfg(test)]
pub(crate) use testing::{TestPublisher, TestSubscriber};
