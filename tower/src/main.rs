use clap::Parser;
use futures::StreamExt;

use tower::{RandomRequestSource, SimulationRunner, TowerConfig};

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = TowerConfig::parse();
    log::debug!("starting tower with {:?}", config);

    let runner = match &config.script {
        Some(path) => SimulationRunner::from_script_path(path)?,
        None => {
            let mut source = match config.seed {
                Some(seed) => RandomRequestSource::seeded(seed),
                None => RandomRequestSource::from_entropy(),
            };
            SimulationRunner::from_source(&mut source, config.count)
        }
    };
    let mut runner = runner.with_mode(config.mode()).with_speed(config.speed());

    let events = runner.stream_events().expect("event stream");
    let response = runner.run_with_defaults();
    drop(runner);

    // Print each event as it happens while the run is driven to completion
    let sink = events.for_each(|event| {
        println!("{}", event);
        futures::future::ready(())
    });
    let (summary, ()) = futures::join!(response, sink);
    let summary = summary?;

    log::info!(
        "{} requests: {} landings ({} emergency), {} takeoffs, {} takeoffs cancelled, {} withdrawals",
        summary.accepted,
        summary.landings,
        summary.emergency_landings,
        summary.takeoffs,
        summary.cancelled_takeoffs,
        summary.withdrawn
    );

    Ok(())
}
