use std::{future::Future, pin::Pin, time::Duration};

use futures::{channel::mpsc, Stream};
use itertools::Itertools;
use schema::{
    Action, AircraftRequest, ControlAction, RequestKind, RequestSource, Runner, ScheduleError,
    Scheduler, Speed, TowerEvent,
};

use crate::DualQueueScheduler;

type Success = <SimulationRunner as Runner<DualQueueScheduler>>::Success;
type Error = <SimulationRunner as Runner<DualQueueScheduler>>::Error;
type Response = Pin<Box<dyn Future<Output = Result<Success, Error>>>>;

/// How the runner interleaves submissions and clearances
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Submit every request, then drain the scheduler once
    #[default]
    Batch,
    /// One arrival per tick and one clearance every other tick, paced by `Speed`
    Live,
}

/// Totals for a completed run
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub accepted: usize,
    pub landings: usize,
    pub emergency_landings: usize,
    pub takeoffs: usize,
    pub cancelled_takeoffs: usize,
    pub withdrawn: usize,
}

impl RunSummary {
    fn record(&mut self, actions: &[ControlAction]) {
        let counts = actions
            .iter()
            .counts_by(|action| (action.action, action.emergency));

        let count = |key| counts.get(&key).copied().unwrap_or_default();
        self.emergency_landings += count((Action::Land, true));
        self.landings += count((Action::Land, true)) + count((Action::Land, false));
        self.takeoffs += count((Action::Takeoff, false));
    }
}

/// Simulation runner which exercises a `Scheduler` with a fixed list of aircraft requests
pub struct SimulationRunner {
    speed: Speed,
    mode: RunMode,
    requests: Vec<AircraftRequest>,
    events_sender: mpsc::UnboundedSender<TowerEvent>,
    events_receiver: Option<mpsc::UnboundedReceiver<TowerEvent>>,
}

impl SimulationRunner {
    const TICK: Duration = Duration::from_secs(1);
    const TICKS_PER_CLEARANCE: u64 = 2;

    pub fn new(requests: Vec<AircraftRequest>) -> Self {
        let (tx, rx) = mpsc::unbounded();

        Self {
            speed: Default::default(),
            mode: Default::default(),
            requests,
            events_sender: tx,
            events_receiver: Some(rx),
        }
    }

    /// Draw `count` requests from the provided source
    pub fn from_source(source: &mut impl RequestSource, count: usize) -> Self {
        Self::new((0..count).map(|_| source.next_request()).collect())
    }

    /// Replay the requests listed in a request script
    pub fn from_script_path(path: impl AsRef<std::path::Path>) -> Result<Self, ScheduleError> {
        Ok(Self::new(AircraftRequest::from_script_path(path)?))
    }

    /// Pace a live run with the provided `Speed`
    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn requests(&self) -> &[AircraftRequest] {
        &self.requests
    }

    /// Returns a stream of tower events, only the first call gets it
    pub fn stream_events(&mut self) -> Option<impl Stream<Item = TowerEvent>> {
        self.events_receiver.take()
    }

    /// Run with a fresh `DualQueueScheduler`
    pub fn run_with_defaults(&self) -> Response {
        self.run(DualQueueScheduler::new())
    }

    fn publish(events: &mut mpsc::UnboundedSender<TowerEvent>, event: TowerEvent) {
        // Nobody listening is fine, events are advisory
        let _ = events.unbounded_send(event);
    }

    fn accept(
        scheduler: &mut DualQueueScheduler,
        events: &mut mpsc::UnboundedSender<TowerEvent>,
        summary: &mut RunSummary,
        request: AircraftRequest,
    ) {
        summary.accepted += 1;
        if request.kind == RequestKind::Withdraw {
            summary.withdrawn += 1;
        }

        scheduler.submit(request.clone());
        Self::publish(events, TowerEvent::Accepted(request));
    }

    fn clear(
        events: &mut mpsc::UnboundedSender<TowerEvent>,
        summary: &mut RunSummary,
        actions: Vec<ControlAction>,
    ) {
        summary.record(&actions);
        for action in actions {
            Self::publish(events, TowerEvent::Control(action));
        }
    }

    async fn run_inner(
        mode: RunMode,
        speed: Speed,
        mut events: mpsc::UnboundedSender<TowerEvent>,
        requests: Vec<AircraftRequest>,
        mut scheduler: DualQueueScheduler,
    ) -> Result<Success, Error> {
        log::info!("running {} requests in {:?} mode", requests.len(), mode);
        let mut summary = RunSummary::default();

        match mode {
            RunMode::Batch => {
                for request in requests {
                    Self::accept(&mut scheduler, &mut events, &mut summary, request);
                }

                let actions = scheduler.drain().collect::<Vec<_>>();
                Self::clear(&mut events, &mut summary, actions);
            }

            RunMode::Live => {
                let tick = speed.adjust_duration(Self::TICK);
                let mut arrivals = requests.into_iter();

                for current_tick in 0.. {
                    match arrivals.next() {
                        Some(request) => {
                            Self::accept(&mut scheduler, &mut events, &mut summary, request)
                        }
                        None if scheduler.is_idle() => break,
                        None => {}
                    }

                    // The runway is busy between clearances
                    if current_tick % Self::TICKS_PER_CLEARANCE == Self::TICKS_PER_CLEARANCE - 1 {
                        let actions = scheduler.next_action().into_iter().collect();
                        Self::clear(&mut events, &mut summary, actions);
                    }

                    tokio::time::sleep(tick).await;
                }
            }
        }

        summary.cancelled_takeoffs = scheduler.cancelled_takeoffs();
        log::info!("run complete: {:?}", summary);

        Ok(summary)
    }
}

impl Runner<DualQueueScheduler> for SimulationRunner {
    type Response = Response;
    /// Totals of what the tower accepted & cleared
    type Success = RunSummary;
    type Error = ScheduleError;

    fn run(&self, scheduler: DualQueueScheduler) -> Self::Response {
        let requests = self.requests.clone();
        let mode = self.mode;
        let speed = self.speed;
        let events = self.events_sender.clone();
        Box::pin(async move { Self::run_inner(mode, speed, events, requests, scheduler).await })
    }
}

#[cfg(test)]
mod test {
    use futures::StreamExt;
    use schema::Priority;

    use super::*;
    use crate::RandomRequestSource;

    const REQUESTS_PATH: &'static str = "../test_data/requests.txt";

    fn reference_requests() -> Vec<AircraftRequest> {
        vec![
            AircraftRequest::landing(101, "AAAAA"),
            AircraftRequest::takeoff(202, "BBB1234"),
            AircraftRequest::emergency_landing(303, "CCCCC"),
        ]
    }

    #[tokio::test]
    async fn test_batch_event_order() -> Result<(), Box<dyn std::error::Error>> {
        let mut runner = SimulationRunner::new(reference_requests());
        let events = runner.stream_events().expect("event stream");
        assert!(runner.stream_events().is_none());

        let summary = runner.run_with_defaults().await?;
        drop(runner);

        let lines = events.map(|event| event.to_string()).collect::<Vec<_>>().await;
        assert_eq!(
            lines,
            vec![
                "Flight 101 (AAAAA) requests landing",
                "Flight 202 (BBB1234) requests takeoff",
                "Flight 303 (CCCCC) requests emergency landing",
                "CONTROL: 303 (CCCCC) land (Emergency)",
                "CONTROL: 101 (AAAAA) land",
                "CONTROL: 202 (BBB1234) takeoff",
            ]
        );
        assert_eq!(
            summary,
            RunSummary {
                accepted: 3,
                landings: 2,
                emergency_landings: 1,
                takeoffs: 1,
                cancelled_takeoffs: 0,
                withdrawn: 0,
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_batch_cancels_takeoff() -> Result<(), Box<dyn std::error::Error>> {
        let runner = SimulationRunner::new(vec![
            AircraftRequest::emergency_landing(42, "ABC123"),
            AircraftRequest::takeoff(42, "ABC123"),
        ]);

        let summary = runner.run_with_defaults().await?;

        assert_eq!(summary.landings, 1);
        assert_eq!(summary.takeoffs, 0);
        assert_eq!(summary.cancelled_takeoffs, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_random_batch_resolves_every_request() -> Result<(), Box<dyn std::error::Error>> {
        let mut source = RandomRequestSource::seeded(2024);
        let runner = SimulationRunner::from_source(&mut source, 10);
        assert_eq!(runner.requests().len(), 10);

        let summary = runner.run_with_defaults().await?;

        assert_eq!(summary.accepted, 10);
        assert_eq!(
            summary.landings + summary.takeoffs + summary.cancelled_takeoffs,
            10
        );

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_run() -> Result<(), Box<dyn std::error::Error>> {
        let mut runner = SimulationRunner::new(vec![
            AircraftRequest::takeoff(1, "DEPRT"),
            AircraftRequest::takeoff(2, "LATER"),
            AircraftRequest::emergency_landing(3, "MAYDY"),
        ])
        .with_mode(RunMode::Live)
        .with_speed(Speed::fast_forward(10).expect("speed"));
        let events = runner.stream_events().expect("event stream");

        let summary = runner.run_with_defaults().await?;
        drop(runner);

        let controls = events
            .filter_map(|event| async move {
                match event {
                    TowerEvent::Control(action) => Some(action),
                    TowerEvent::Accepted(_) => None,
                }
            })
            .collect::<Vec<_>>()
            .await;

        // Takeoff 1 leaves before the emergency arrives, which then jumps ahead of takeoff 2
        assert_eq!(
            controls,
            vec![
                ControlAction::takeoff(1, "DEPRT".into()),
                ControlAction::land(3, "MAYDY".into(), Priority::Emergency),
                ControlAction::takeoff(2, "LATER".into()),
            ]
        );
        assert_eq!(summary.accepted, 3);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_landing_jumps_queue() -> Result<(), Box<dyn std::error::Error>> {
        let mut runner = SimulationRunner::new(vec![
            AircraftRequest::takeoff(1, "DEPRT"),
            AircraftRequest::takeoff(2, "LATER"),
            AircraftRequest::takeoff(3, "LAST1"),
            AircraftRequest::landing(4, "INBND"),
        ])
        .with_mode(RunMode::Live);
        let events = runner.stream_events().expect("event stream");

        runner.run_with_defaults().await?;
        drop(runner);

        let cleared = events
            .filter_map(|event| async move {
                match event {
                    TowerEvent::Control(action) => Some(action.flight_number),
                    TowerEvent::Accepted(_) => None,
                }
            })
            .collect::<Vec<_>>()
            .await;

        assert_eq!(cleared, vec![1, 4, 2, 3]);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_clears_every_other_tick() -> Result<(), Box<dyn std::error::Error>> {
        let runner = SimulationRunner::new(vec![
            AircraftRequest::takeoff(1, "DEPRT"),
            AircraftRequest::takeoff(2, "LATER"),
            AircraftRequest::emergency_landing(3, "MAYDY"),
        ])
        .with_mode(RunMode::Live);

        let start = tokio::time::Instant::now();
        let summary = runner.run_with_defaults().await?;

        // Arrivals on ticks 0-2, clearances on ticks 1, 3 & 5, idle on tick 6
        assert_eq!(start.elapsed(), Duration::from_secs(6));
        assert_eq!(summary.takeoffs + summary.landings, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_sample_script() -> Result<(), Box<dyn std::error::Error>> {
        let runner = SimulationRunner::from_script_path(REQUESTS_PATH)?;
        let summary = runner.run_with_defaults().await?;

        assert_eq!(summary.accepted, runner.requests().len());
        assert_eq!(summary.withdrawn, 1);
        assert_eq!(summary.cancelled_takeoffs, 1);

        Ok(())
    }
}
