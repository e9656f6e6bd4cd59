mod scenario;

use anyhow::Result;
use scenario::Scenario;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runner=info,sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Scenario path from the first argument, then the environment
    let path = env::args()
        .nth(1)
        .or_else(|| env::var("BIOSIM_SCENARIO").ok())
        .map(PathBuf::from);

    let scenario = match &path {
        Some(path) => {
            tracing::info!("Loading scenario {}", path.display());
            Scenario::load(path)?
        }
        None => {
            tracing::info!("No scenario given, running the bundled demo");
            Scenario::demo()?
        }
    };

    tracing::info!(seed = scenario.seed, years = scenario.years, "Starting BioSim");
    let history = scenario.run()?;

    match history.last() {
        Some(last) => tracing::info!(
            year = last.year,
            herbivores = last.counts.herbivores,
            carnivores = last.counts.carnivores,
            "Simulation finished"
        ),
        None => tracing::info!("Simulation finished without simulating any years"),
    }

    Ok(())
}
