use std::num::NonZeroU8;
use std::time::Duration;

use futures::Future;

use crate::Scheduler;

/// A `Runner` feeds aircraft requests to a provided `Scheduler` and relays its clearances.
/// It returns a `Response` future, which may be polled to drive its operation
/// until every request has been resolved.
pub trait Runner<S: Scheduler> {
    type Response: Future<Output = Result<Self::Success, Self::Error>>;
    type Success;
    type Error;

    /// Initialize the `Runner` to resolve its requests using the provided `Scheduler`.
    fn run(&self, scheduler: S) -> Self::Response;
}

/// Allows pacing a live run in fast-forward or slow-motion instead of real-time
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speed {
    #[default]
    RealTime,
    /// Speed up the runner by the provided multiplier (e.g. `2` gives double speed)
    FastForward(NonZeroU8),
    /// Slow down the runner by the provided multiplier (e.g. `2` gives half speed)
    SlowMotion(NonZeroU8),
}

impl Speed {
    pub fn fast_forward(rate: u8) -> Option<Self> {
        NonZeroU8::new(rate).map(Self::FastForward)
    }

    pub fn slow_motion(rate: u8) -> Option<Self> {
        NonZeroU8::new(rate).map(Self::SlowMotion)
    }

    pub fn adjust_duration(&self, duration: Duration) -> Duration {
        match self {
            Self::RealTime => duration,
            Self::FastForward(x) => duration / x.get() as u32,
            Self::SlowMotion(x) => duration * x.get() as u32,
        }
    }
}
