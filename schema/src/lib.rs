mod entities;
mod error;
mod runner;
mod scheduler;
mod source;

pub use entities::{
    Action, AircraftRequest, CallSign, ControlAction, Priority, RequestKind, TowerEvent,
};
pub use error::ScheduleError;
pub use runner::{Runner, Speed};
pub use scheduler::Scheduler;
pub use source::RequestSource;
