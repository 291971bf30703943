use std::path::PathBuf;

use clap::Parser;
use schema::Speed;

use crate::RunMode;

/// Simulates a control tower resolving landing & takeoff requests
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "tower", version)]
pub struct TowerConfig {
    /// Number of random requests to generate
    #[arg(long, env = "REQUEST_COUNT", default_value_t = 10)]
    pub count: usize,

    /// Seed for the request generator, omit for a different run every time
    #[arg(long, env = "RNG_SEED")]
    pub seed: Option<u64>,

    /// Replay requests from a script instead of generating them
    #[arg(long, env = "REQUEST_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Interleave arrivals & clearances on a clock instead of draining once
    #[arg(long, env = "TOWER_LIVE")]
    pub live: bool,

    /// Speed up a live run by this factor
    #[arg(long, conflicts_with = "slow_motion", value_parser = clap::value_parser!(u8).range(1..))]
    pub fast_forward: Option<u8>,

    /// Slow down a live run by this factor
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..))]
    pub slow_motion: Option<u8>,
}

impl TowerConfig {
    pub fn mode(&self) -> RunMode {
        if self.live {
            RunMode::Live
        } else {
            RunMode::Batch
        }
    }

    /// Pacing for live runs
    pub fn speed(&self) -> Speed {
        self.fast_forward
            .and_then(Speed::fast_forward)
            .or_else(|| self.slow_motion.and_then(Speed::slow_motion))
            .unwrap_or_default()
    }
}
