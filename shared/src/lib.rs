pub mod params;
pub mod records;

pub use params::*;
pub use records::*;

/// Seed used when a simulation is created without one
pub const DEFAULT_SEED: u64 = 12;
