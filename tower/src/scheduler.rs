use std::{
    cmp::Ordering,
    collections::{BinaryHeap, VecDeque},
};

use schema::{AircraftRequest, CallSign, ControlAction, Priority, RequestKind, Scheduler};

/// A scheduler with one runway and two queues: landings ordered by priority
/// and takeoffs in order of arrival.
/// Landings always preempt takeoffs, so a steady stream of landing requests
/// will starve the takeoff queue. That is the policy, not a bug.
#[derive(Debug, Default)]
pub struct DualQueueScheduler {
    /// Pending landings, emergencies first
    landings: BinaryHeap<LandingEntry>,
    /// Pending takeoffs, oldest first
    takeoffs: VecDeque<TakeoffEntry>,
    /// Arrival counter used to break ties between landings of equal priority
    next_sequence: u64,
    /// Takeoffs dropped because the aircraft was cleared to land first
    cancelled_takeoffs: usize,
}

#[derive(Debug)]
struct LandingEntry {
    priority: Priority,
    sequence: u64,
    flight_number: u16,
    call_sign: CallSign,
}

// `BinaryHeap` is a max-heap, so the entry which should land first compares greatest
impl Ord for LandingEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for LandingEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for LandingEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LandingEntry {}

#[derive(Debug)]
struct TakeoffEntry {
    flight_number: u16,
    call_sign: CallSign,
}

impl TakeoffEntry {
    fn is_aircraft(&self, flight_number: u16, call_sign: &CallSign) -> bool {
        self.flight_number == flight_number && &self.call_sign == call_sign
    }
}

impl DualQueueScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_landings(&self) -> usize {
        self.landings.len()
    }

    pub fn pending_takeoffs(&self) -> usize {
        self.takeoffs.len()
    }

    pub fn cancelled_takeoffs(&self) -> usize {
        self.cancelled_takeoffs
    }

    fn queue_landing(&mut self, priority: Priority, flight_number: u16, call_sign: CallSign) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.landings.push(LandingEntry {
            priority,
            sequence,
            flight_number,
            call_sign,
        });
    }

    /// Remove everything the aircraft has pending in either queue, returning how many entries went
    fn withdraw(&mut self, flight_number: u16, call_sign: &CallSign) -> usize {
        let pending = self.landings.len() + self.takeoffs.len();

        self.landings
            .retain(|entry| !(entry.flight_number == flight_number && &entry.call_sign == call_sign));
        self.takeoffs
            .retain(|entry| !entry.is_aircraft(flight_number, call_sign));

        pending - (self.landings.len() + self.takeoffs.len())
    }

    /// Drop the oldest pending takeoff for an aircraft which has just been cleared to land
    fn cancel_takeoff(&mut self, flight_number: u16, call_sign: &CallSign) {
        let Some(index) = self
            .takeoffs
            .iter()
            .position(|entry| entry.is_aircraft(flight_number, call_sign))
        else {
            return;
        };

        self.takeoffs.remove(index);
        self.cancelled_takeoffs += 1;
        log::debug!(
            "cancelled pending takeoff for {} ({}), cleared to land first",
            flight_number,
            call_sign
        );
    }
}

impl Scheduler for DualQueueScheduler {
    type Drain<'a> = Drain<'a>;

    fn submit(&mut self, request: AircraftRequest) {
        let AircraftRequest {
            kind,
            flight_number,
            call_sign,
        } = request;

        log::debug!("accepted {:?} from {} ({})", kind, flight_number, call_sign);

        match kind {
            RequestKind::Takeoff => self.takeoffs.push_back(TakeoffEntry {
                flight_number,
                call_sign,
            }),
            RequestKind::EmergencyLanding => {
                self.queue_landing(Priority::Emergency, flight_number, call_sign)
            }
            RequestKind::Landing => self.queue_landing(Priority::Routine, flight_number, call_sign),
            RequestKind::Withdraw => {
                let removed = self.withdraw(flight_number, &call_sign);
                log::debug!(
                    "withdrew {} pending entries for {} ({})",
                    removed,
                    flight_number,
                    call_sign
                );
            }
        }
    }

    fn next_action(&mut self) -> Option<ControlAction> {
        if let Some(landing) = self.landings.pop() {
            self.cancel_takeoff(landing.flight_number, &landing.call_sign);

            return Some(ControlAction::land(
                landing.flight_number,
                landing.call_sign,
                landing.priority,
            ));
        }

        self.takeoffs
            .pop_front()
            .map(|takeoff| ControlAction::takeoff(takeoff.flight_number, takeoff.call_sign))
    }

    fn drain(&mut self) -> Drain<'_> {
        Drain { scheduler: self }
    }

    fn is_idle(&self) -> bool {
        self.landings.is_empty() && self.takeoffs.is_empty()
    }
}

/// Lazily issues clearances from a `DualQueueScheduler` until both queues are empty
#[derive(Debug)]
pub struct Drain<'a> {
    scheduler: &'a mut DualQueueScheduler,
}

impl Iterator for Drain<'_> {
    type Item = ControlAction;

    fn next(&mut self) -> Option<ControlAction> {
        self.scheduler.next_action()
    }
}
