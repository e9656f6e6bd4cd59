use crate::{ParamError, Species};
use serde::{Deserialize, Serialize};

/// One animal in an initial population or introduction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalSpec {
    /// Species name, checked when the animal is placed
    pub species: String,
    pub age: u32,
    pub weight: f64,
}

impl AnimalSpec {
    pub fn new(species: Species, age: u32, weight: f64) -> Self {
        Self {
            species: species.to_string(),
            age,
            weight,
        }
    }

    pub fn species(&self) -> Result<Species, ParamError> {
        self.species.parse()
    }
}

/// A group of animals to place in one cell, addressed as 1-based (row, col)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Placement {
    pub loc: (usize, usize),
    pub pop: Vec<AnimalSpec>,
}

/// Number of animals per species
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeciesCounts {
    pub herbivores: usize,
    pub carnivores: usize,
}

impl SpeciesCounts {
    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }

    pub fn get(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }
}

impl std::ops::Add for SpeciesCounts {
    type Output = SpeciesCounts;

    fn add(self, other: SpeciesCounts) -> SpeciesCounts {
        SpeciesCounts {
            herbivores: self.herbivores + other.herbivores,
            carnivores: self.carnivores + other.carnivores,
        }
    }
}

/// Island-wide population at the end of a simulated year
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearRecord {
    pub year: u32,
    pub counts: SpeciesCounts,
}

/// Age, weight and fitness of every animal of one species, for histograms
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TraitSamples {
    pub age: Vec<u32>,
    pub weight: Vec<f64>,
    pub fitness: Vec<f64>,
}

impl TraitSamples {
    pub fn len(&self) -> usize {
        self.age.len()
    }

    pub fn is_empty(&self) -> bool {
        self.age.is_empty()
    }

    pub fn push(&mut self, snapshot: &AnimalSnapshot) {
        self.age.push(snapshot.age);
        self.weight.push(snapshot.weight);
        self.fitness.push(snapshot.fitness);
    }
}

/// Read-only view of a single animal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AnimalSnapshot {
    pub species: Species,
    pub age: u32,
    pub weight: f64,
    pub fitness: f64,
}
