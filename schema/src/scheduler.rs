use crate::{AircraftRequest, ControlAction};

/// A tower scheduler which turns incoming aircraft requests into clearances
pub trait Scheduler {
    /// Clearances produced while draining this scheduler
    type Drain<'a>: Iterator<Item = ControlAction>
    where
        Self: 'a;

    /// Accept a request from an aircraft. Landing & takeoff requests are queued,
    /// withdrawals remove whatever the aircraft still has pending.
    fn submit(&mut self, request: AircraftRequest);

    /// Issue the next clearance, if anything is pending
    fn next_action(&mut self) -> Option<ControlAction>;

    /// Issue clearances until nothing is pending
    fn drain<'a>(&'a mut self) -> Self::Drain<'a>;

    /// Returns true once both queues are empty
    fn is_idle(&self) -> bool;
}
