use crate::animal::Animal;
use crate::error::{MapError, SimError};
use crate::island::Island;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shared::{
    Landscape, Parameters, Placement, Species, SpeciesCounts, TraitSamples, YearRecord,
    DEFAULT_SEED,
};
use std::collections::HashMap;

/// Check that a map is non-empty, uses only known landscape codes, is
/// rectangular and is surrounded by water.
pub fn validate_map(map: &str) -> Result<(), MapError> {
    let lines: Vec<&str> = map.split_whitespace().collect();
    let Some(first) = lines.first() else {
        return Err(MapError::Empty);
    };
    let width = first.chars().count();
    let height = lines.len();

    for (r, line) in lines.iter().enumerate() {
        let row = r + 1;
        let found = line.chars().count();
        if found != width {
            return Err(MapError::UnevenRows {
                row,
                expected: width,
                found,
            });
        }

        for (c, code) in line.chars().enumerate() {
            let col = c + 1;
            let kind =
                Landscape::from_code(code).map_err(|_| MapError::InvalidCode { code, row, col })?;
            let on_border = row == 1 || row == height || col == 1 || col == width;
            if on_border && kind != Landscape::Water {
                return Err(MapError::OpenBorder { row, col });
            }
        }
    }

    Ok(())
}

/// A seeded island simulation with its population history
pub struct Simulation {
    island: Island,
    rng: ChaCha8Rng,
    history: Vec<YearRecord>,
}

impl Simulation {
    pub fn new(map: &str, seed: u64) -> Result<Self, SimError> {
        Self::with_params(map, seed, Parameters::default())
    }

    /// Simulation with a prepared parameter bundle. Any negative coefficient
    /// is rejected.
    pub fn with_params(map: &str, seed: u64, params: Parameters) -> Result<Self, SimError> {
        validate_map(map)?;
        let island = Island::new(map, params)?;

        Ok(Self {
            island,
            rng: ChaCha8Rng::seed_from_u64(seed),
            history: Vec::new(),
        })
    }

    /// Simulation on the given map with the default seed
    pub fn from_map(map: &str) -> Result<Self, SimError> {
        Self::new(map, DEFAULT_SEED)
    }

    /// Override coefficients of one species, by species name
    pub fn set_animal_parameters(
        &mut self,
        species: &str,
        overrides: &HashMap<String, f64>,
    ) -> Result<(), SimError> {
        let species: Species = species.parse()?;
        self.island.set_species_params(species, overrides)?;
        Ok(())
    }

    /// Override the fodder capacity of one landscape, by landscape code.
    /// Takes effect at the next yearly regrowth.
    pub fn set_landscape_parameters(
        &mut self,
        code: char,
        overrides: &HashMap<String, f64>,
    ) -> Result<(), SimError> {
        let kind = Landscape::from_code(code)?;
        self.island.set_landscape_params(kind, overrides)?;
        Ok(())
    }

    /// Add animals to the island. Every placement is checked before any
    /// animal is placed.
    pub fn add_population(&mut self, placements: &[Placement]) -> Result<(), SimError> {
        let mut staged = Vec::with_capacity(placements.len());

        for placement in placements {
            let (row, col) = placement.loc;
            let cell = self
                .island
                .cell(placement.loc)
                .ok_or(SimError::OutsideIsland { row, col })?;
            if !cell.is_passable() {
                return Err(SimError::Impassable { row, col });
            }

            let animals = placement
                .pop
                .iter()
                .map(|spec| -> Result<Animal, SimError> {
                    let species = spec.species()?;
                    let params = self.island.params().species(species);
                    Ok(Animal::new(species, spec.age, spec.weight, params))
                })
                .collect::<Result<Vec<_>, _>>()?;
            staged.push((placement.loc, animals));
        }

        for (loc, animals) in staged {
            self.island.add_animals(loc, animals)?;
        }
        Ok(())
    }

    /// Run `years` annual cycles
    pub fn simulate(&mut self, years: u32) {
        for _ in 0..years {
            self.island.annual_cycle(&mut self.rng);

            let counts = self.island.counts();
            self.history.push(YearRecord {
                year: self.island.year,
                counts,
            });

            tracing::info!(
                year = self.island.year,
                herbivores = counts.herbivores,
                carnivores = counts.carnivores,
                "simulated year"
            );
        }
    }

    /// Number of years simulated so far
    pub fn year(&self) -> u32 {
        self.island.year
    }

    pub fn num_animals(&self) -> usize {
        self.island.counts().total()
    }

    pub fn num_animals_per_species(&self) -> SpeciesCounts {
        self.island.counts()
    }

    pub fn history(&self) -> &[YearRecord] {
        &self.history
    }

    pub fn density_map(&self, species: Species) -> Vec<Vec<usize>> {
        self.island.density_map(species)
    }

    pub fn trait_samples(&self, species: Species) -> TraitSamples {
        self.island.trait_samples(species)
    }

    pub fn island(&self) -> &Island {
        &self.island
    }

    pub fn params(&self) -> &Parameters {
        self.island.params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{AnimalSpec, ParamError};

    const MAP: &str = "WWWWWW
                       WLLHHW
                       WLDDLW
                       WWWWWW";

    fn herbivores(loc: (usize, usize), n: usize) -> Placement {
        Placement {
            loc,
            pop: (0..n)
                .map(|_| AnimalSpec::new(Species::Herbivore, 5, 20.0))
                .collect(),
        }
    }

    fn carnivores(loc: (usize, usize), n: usize) -> Placement {
        Placement {
            loc,
            pop: (0..n)
                .map(|_| AnimalSpec::new(Species::Carnivore, 5, 20.0))
                .collect(),
        }
    }

    fn overrides(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_validate_map() {
        assert_eq!(validate_map(MAP), Ok(()));
        assert_eq!(validate_map("  \n "), Err(MapError::Empty));
        assert_eq!(
            validate_map("WWW WXW WWW"),
            Err(MapError::InvalidCode {
                code: 'X',
                row: 2,
                col: 2
            })
        );
        assert_eq!(
            validate_map("WWW WLLW WWW"),
            Err(MapError::UnevenRows {
                row: 2,
                expected: 3,
                found: 4
            })
        );
        assert_eq!(
            validate_map("WWW WLL WWW"),
            Err(MapError::OpenBorder { row: 2, col: 3 })
        );
        assert_eq!(
            validate_map("WLW WLW WWW"),
            Err(MapError::OpenBorder { row: 1, col: 2 })
        );
    }

    #[test]
    fn test_new_rejects_bad_map() {
        assert!(matches!(
            Simulation::from_map("WWW WLL WWW"),
            Err(SimError::Map(MapError::OpenBorder { .. }))
        ));
    }

    #[test]
    fn test_with_params_rejects_negative_coefficients() {
        let mut params = Parameters::default();
        params.herbivore.weight_loss_rate = -1.0;
        params.herbivore.meal_cap = -5.0;

        assert!(matches!(
            Simulation::with_params(MAP, 1, params),
            Err(SimError::Param(ParamError::Negative { .. }))
        ));

        let mut params = Parameters::default();
        params.landscape.lowland_fodder = -10.0;
        assert!(Simulation::with_params(MAP, 1, params).is_err());
    }

    #[test]
    fn test_add_population() {
        let mut sim = Simulation::from_map(MAP).unwrap();
        sim.add_population(&[herbivores((2, 2), 10), carnivores((3, 5), 3)])
            .unwrap();

        assert_eq!(sim.num_animals(), 13);
        assert_eq!(sim.num_animals_per_species().herbivores, 10);
        assert_eq!(sim.num_animals_per_species().carnivores, 3);
        assert_eq!(sim.density_map(Species::Carnivore)[2][4], 3);
    }

    #[test]
    fn test_add_population_is_all_or_nothing() {
        let mut sim = Simulation::from_map(MAP).unwrap();
        let bad_species = Placement {
            loc: (2, 3),
            pop: vec![AnimalSpec {
                species: "Unicorn".to_string(),
                age: 1,
                weight: 5.0,
            }],
        };

        assert_eq!(
            sim.add_population(&[herbivores((2, 2), 5), bad_species]),
            Err(SimError::Param(ParamError::UnknownSpecies(
                "Unicorn".to_string()
            )))
        );
        assert_eq!(
            sim.add_population(&[herbivores((2, 2), 5), herbivores((1, 1), 1)]),
            Err(SimError::Impassable { row: 1, col: 1 })
        );
        assert_eq!(
            sim.add_population(&[herbivores((10, 2), 1)]),
            Err(SimError::OutsideIsland { row: 10, col: 2 })
        );
        assert_eq!(sim.num_animals(), 0);
    }

    #[test]
    fn test_set_parameters() {
        let mut sim = Simulation::from_map(MAP).unwrap();
        sim.set_animal_parameters("Herbivore", &overrides(&[("F", 15.0)]))
            .unwrap();
        sim.set_landscape_parameters('L', &overrides(&[("f_max", 700.0)]))
            .unwrap();

        assert_eq!(sim.params().herbivore.meal_cap, 15.0);
        assert_eq!(sim.params().landscape.lowland_fodder, 700.0);

        assert!(matches!(
            sim.set_animal_parameters("Dragon", &overrides(&[("F", 1.0)])),
            Err(SimError::Param(ParamError::UnknownSpecies(_)))
        ));
        assert!(sim
            .set_animal_parameters("Carnivore", &overrides(&[("beta", 0.2), ("gamma", -1.0)]))
            .is_err());
        assert_eq!(sim.params().carnivore.feeding_efficiency, 0.75);
        assert!(sim
            .set_landscape_parameters('Q', &overrides(&[("f_max", 1.0)]))
            .is_err());
    }

    #[test]
    fn test_landscape_override_applies_at_next_regrowth() {
        let mut sim = Simulation::from_map("WWW WLW WWW").unwrap();
        sim.set_landscape_parameters('L', &overrides(&[("f_max", 25.0)]))
            .unwrap();
        sim.add_population(&[herbivores((2, 2), 3)]).unwrap();

        sim.simulate(1);

        let cell = sim.island().cell((2, 2)).unwrap();
        assert_eq!(cell.fodder, 0.0);
    }

    #[test]
    fn test_simulate_records_history() {
        let mut sim = Simulation::new(MAP, 7).unwrap();
        sim.add_population(&[herbivores((2, 2), 40), carnivores((2, 3), 5)])
            .unwrap();

        sim.simulate(5);
        sim.simulate(5);

        assert_eq!(sim.year(), 10);
        assert_eq!(sim.history().len(), 10);
        assert_eq!(sim.history()[9].year, 10);
        assert_eq!(sim.history()[9].counts, sim.num_animals_per_species());
        assert_eq!(
            sim.trait_samples(Species::Herbivore).len(),
            sim.num_animals_per_species().herbivores
        );
    }

    #[test]
    fn test_same_seed_same_history() {
        let run = |seed| {
            let mut sim = Simulation::new(MAP, seed).unwrap();
            sim.add_population(&[herbivores((2, 2), 40), carnivores((2, 3), 5)])
                .unwrap();
            sim.simulate(15);
            sim.history().to_vec()
        };

        assert_eq!(run(42), run(42));
    }
}
