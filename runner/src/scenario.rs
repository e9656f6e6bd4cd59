use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shared::{Placement, YearRecord, DEFAULT_SEED};
use sim::Simulation;
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

const DEMO: &str = include_str!("../scenarios/demo.json");

/// Animals added to the island once the simulation reaches `year`
#[derive(Debug, Clone, Deserialize)]
pub struct Introduction {
    pub year: u32,
    pub population: Vec<Placement>,
}

/// A complete simulation run described in JSON
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub map: String,
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub years: u32,
    #[serde(default)]
    pub initial_population: Vec<Placement>,
    #[serde(default)]
    pub species_params: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    pub landscape_params: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    pub introductions: Vec<Introduction>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse scenario JSON")
    }

    /// The bundled demo: herbivores first, carnivores introduced later
    pub fn demo() -> Result<Self> {
        Self::parse(DEMO)
    }

    /// Build the simulation, apply overrides and place the initial animals
    pub fn build(&self) -> Result<Simulation> {
        let mut sim = Simulation::new(&self.map, self.seed).context("Failed to build island")?;

        for (species, overrides) in &self.species_params {
            sim.set_animal_parameters(species, overrides)
                .with_context(|| format!("Invalid parameters for {species}"))?;
        }

        for (key, overrides) in &self.landscape_params {
            let mut chars = key.chars();
            let (Some(code), None) = (chars.next(), chars.next()) else {
                bail!("Landscape key must be a single character, got {key:?}");
            };
            sim.set_landscape_parameters(code, overrides)
                .with_context(|| format!("Invalid parameters for landscape {code}"))?;
        }

        sim.add_population(&self.initial_population)
            .context("Failed to place initial population")?;

        Ok(sim)
    }

    /// Run the whole scenario and return the yearly history
    pub fn run(&self) -> Result<Vec<YearRecord>> {
        let mut sim = self.build()?;

        let mut introductions: Vec<&Introduction> = self.introductions.iter().collect();
        introductions.sort_by_key(|intro| intro.year);

        for intro in introductions {
            if intro.year > self.years {
                tracing::debug!(year = intro.year, "introduction after final year, skipped");
                continue;
            }
            if intro.year > sim.year() {
                sim.simulate(intro.year - sim.year());
            }
            sim.add_population(&intro.population)
                .with_context(|| format!("Failed to introduce animals in year {}", intro.year))?;
            tracing::info!(
                year = intro.year,
                animals = sim.num_animals(),
                "introduced animals"
            );
        }

        if self.years > sim.year() {
            sim.simulate(self.years - sim.year());
        }

        let history = sim.history().to_vec();
        if let Some(path) = &self.log_file {
            write_log(path, &history)?;
            tracing::info!(path = %path.display(), "wrote population log");
        }

        Ok(history)
    }
}

/// Population counts as `Year,Herbivore,Carnivore` rows. Each row carries the
/// number of completed years, so the first simulated year is written as 1.
pub fn format_log(history: &[YearRecord]) -> Result<String, fmt::Error> {
    let mut out = String::from("Year,Herbivore,Carnivore\n");
    for record in history {
        writeln!(
            out,
            "{},{},{}",
            record.year, record.counts.herbivores, record.counts.carnivores
        )?;
    }
    Ok(out)
}

fn write_log(path: &Path, history: &[YearRecord]) -> Result<()> {
    let log = format_log(history).context("Failed to format population log")?;
    fs::write(path, log)
        .with_context(|| format!("Failed to write log {}", path.display()))
}
