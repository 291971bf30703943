mod config;
mod runner;
mod scheduler;
mod source;

pub use config::TowerConfig;
pub use runner::{RunMode, RunSummary, SimulationRunner};
pub use scheduler::{Drain, DualQueueScheduler};
pub use source::{KindWeights, RandomRequestSource};
