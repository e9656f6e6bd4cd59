pub mod animal;
pub mod cell;
pub mod error;
pub mod island;
pub mod random;
pub mod simulation;

pub use animal::Animal;
pub use cell::{Cell, Loc};
pub use error::{MapError, SimError};
pub use island::Island;
pub use random::{ConstantStream, RandomStream};
pub use simulation::{validate_map, Simulation};

use shared::{Placement, YearRecord};

/// Run a complete island simulation and return the yearly population history
pub fn run_simulation(
    map: &str,
    population: &[Placement],
    seed: u64,
    years: u32,
) -> Result<Vec<YearRecord>, SimError> {
    let mut sim = Simulation::new(map, seed)?;
    sim.add_population(population)?;
    sim.simulate(years);

    Ok(sim.history().to_vec())
}
