use crate::animal::Animal;
use crate::cell::{Cell, Loc};
use crate::error::SimError;
use crate::random::RandomStream;
use shared::{Landscape, ParamError, Parameters, Species, SpeciesCounts, TraitSamples};
use std::collections::HashMap;

/// The grid of cells and the yearly cycle that runs over it
#[derive(Debug, Clone)]
pub struct Island {
    params: Parameters,
    cells: Vec<Vec<Cell>>,
    /// Number of completed years
    pub year: u32,
}

impl Island {
    /// Build the island from whitespace separated rows of landscape codes.
    ///
    /// Shape and water border are not checked here; see
    /// [`crate::simulation::validate_map`].
    pub fn new(map: &str, params: Parameters) -> Result<Self, ParamError> {
        params.validate()?;

        let cells = map
            .split_whitespace()
            .enumerate()
            .map(|(r, line)| {
                line.chars()
                    .enumerate()
                    .map(|(c, code)| {
                        Landscape::from_code(code)
                            .map(|kind| Cell::new(kind, (r + 1, c + 1), &params.landscape))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            params,
            cells,
            year: 0,
        })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Override coefficients of one species; rejected overrides change nothing
    pub fn set_species_params(
        &mut self,
        species: Species,
        overrides: &HashMap<String, f64>,
    ) -> Result<(), ParamError> {
        self.params.set_species(species, overrides)
    }

    /// Override the fodder capacity of one landscape kind
    pub fn set_landscape_params(
        &mut self,
        kind: Landscape,
        overrides: &HashMap<String, f64>,
    ) -> Result<(), ParamError> {
        self.params.set_landscape(kind, overrides)
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, loc: Loc) -> Option<&Cell> {
        let (row, col) = loc;
        self.cells.get(row.checked_sub(1)?)?.get(col.checked_sub(1)?)
    }

    pub fn cell_mut(&mut self, loc: Loc) -> Option<&mut Cell> {
        let (row, col) = loc;
        self.cells
            .get_mut(row.checked_sub(1)?)?
            .get_mut(col.checked_sub(1)?)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    fn is_passable(&self, loc: Loc) -> bool {
        self.cell(loc).is_some_and(Cell::is_passable)
    }

    /// Place animals in the cell at `loc`
    pub fn add_animals(&mut self, loc: Loc, animals: Vec<Animal>) -> Result<(), SimError> {
        let (row, col) = loc;
        let cell = self
            .cell_mut(loc)
            .ok_or(SimError::OutsideIsland { row, col })?;
        if !cell.is_passable() {
            return Err(SimError::Impassable { row, col });
        }
        cell.add_animals(animals);
        Ok(())
    }

    /// Fodder regrowth, feeding, predation and births, cell by cell
    pub fn yearly_cycle_phase_1<R: RandomStream>(&mut self, rng: &mut R) {
        for cell in self.cells.iter_mut().flatten() {
            cell.update_fodder_year(&self.params.landscape);
            cell.herbivores_eat(&self.params.herbivore);
            cell.carnivores_eat(&self.params, rng);
            cell.add_newborns(&self.params, rng);
        }
    }

    /// Move every animal of `species` that wants to leave to a random
    /// neighbour. Migrants aiming at water or off the map stay home.
    ///
    /// Departures are decided for every cell before any arrival is delivered,
    /// so an animal is offered at most once per pass.
    pub fn migration<R: RandomStream>(&mut self, species: Species, rng: &mut R) {
        let params = self.params.species(species);
        let mut moves: Vec<(Loc, Loc, Animal)> = Vec::new();

        for cell in self.cells.iter_mut().flatten() {
            let origin = cell.loc;
            for animal in cell.take_migrants(species, params, rng) {
                let target = Cell::get_target_destination(origin, rng);
                moves.push((origin, target, animal));
            }
        }

        let mut blocked = 0;
        let attempted = moves.len();
        for (origin, target, animal) in moves {
            let destination = if self.is_passable(target) {
                target
            } else {
                blocked += 1;
                origin
            };
            self.cells[destination.0 - 1][destination.1 - 1].add_animal(animal);
        }

        tracing::debug!(%species, attempted, blocked, "migration");
    }

    /// Aging, weight loss and random death, cell by cell
    pub fn yearly_cycle_phase_2<R: RandomStream>(&mut self, rng: &mut R) {
        for cell in self.cells.iter_mut().flatten() {
            cell.updating_age_for_entire_population(&self.params);
            cell.updating_weight_loss_for_entire_population(&self.params);
            cell.check_for_random_death(&self.params, rng);
        }
    }

    /// Clear the per-year flags of every animal
    pub fn yearly_cycle_phase_3(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            cell.reset_attributes();
        }
    }

    /// Advance the island by one year
    pub fn annual_cycle<R: RandomStream>(&mut self, rng: &mut R) {
        self.yearly_cycle_phase_1(rng);

        self.migration(Species::Herbivore, rng);
        self.migration(Species::Carnivore, rng);

        self.yearly_cycle_phase_2(rng);
        self.yearly_cycle_phase_3();

        self.year += 1;

        let counts = self.counts();
        tracing::debug!(
            year = self.year,
            herbivores = counts.herbivores,
            carnivores = counts.carnivores,
            "year complete"
        );
    }

    pub fn counts(&self) -> SpeciesCounts {
        self.cells()
            .map(Cell::counts)
            .fold(SpeciesCounts::default(), |acc, c| acc + c)
    }

    /// Animals of one species per cell, indexed `[row - 1][col - 1]`
    pub fn density_map(&self, species: Species) -> Vec<Vec<usize>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.population(species).len()).collect())
            .collect()
    }

    pub fn trait_samples(&self, species: Species) -> TraitSamples {
        let mut samples = TraitSamples::default();
        for snapshot in self.cells().flat_map(|cell| cell.snapshots(species)) {
            samples.push(&snapshot);
        }
        samples
    }
}
