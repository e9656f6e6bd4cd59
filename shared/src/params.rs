use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while configuring species or landscapes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParamError {
    #[error("parameter {key} cannot be negative (got {value})")]
    Negative { key: String, value: f64 },

    #[error("unknown parameter {key} for {owner}")]
    Unknown { key: String, owner: String },

    #[error("unknown species: {0}")]
    UnknownSpecies(String),

    #[error("unknown landscape code: {0:?}")]
    UnknownLandscape(char),

    #[error("landscape {0} has no fodder capacity to configure")]
    FixedLandscape(Landscape),
}

/// The two species living on the island. Carnivores prey on herbivores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Herbivore, Species::Carnivore];

    pub fn name(&self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Herbivore" => Ok(Species::Herbivore),
            "Carnivore" => Ok(Species::Carnivore),
            other => Err(ParamError::UnknownSpecies(other.to_string())),
        }
    }
}

/// Terrain kind of a single cell
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Landscape {
    #[serde(rename = "W")]
    Water,
    #[serde(rename = "L")]
    Lowland,
    #[serde(rename = "H")]
    Highland,
    #[serde(rename = "D")]
    Desert,
}

impl Landscape {
    pub const ALL: [Landscape; 4] = [
        Landscape::Water,
        Landscape::Lowland,
        Landscape::Highland,
        Landscape::Desert,
    ];

    pub fn from_code(code: char) -> Result<Self, ParamError> {
        match code {
            'W' => Ok(Landscape::Water),
            'L' => Ok(Landscape::Lowland),
            'H' => Ok(Landscape::Highland),
            'D' => Ok(Landscape::Desert),
            other => Err(ParamError::UnknownLandscape(other)),
        }
    }

    pub fn code(&self) -> char {
        match self {
            Landscape::Water => 'W',
            Landscape::Lowland => 'L',
            Landscape::Highland => 'H',
            Landscape::Desert => 'D',
        }
    }

    /// Animals may enter every landscape except water
    pub fn is_passable(&self) -> bool {
        !matches!(self, Landscape::Water)
    }

    /// Only lowland and highland grow fodder
    pub fn regenerates(&self) -> bool {
        matches!(self, Landscape::Lowland | Landscape::Highland)
    }
}

impl fmt::Display for Landscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Coefficients shared by every animal of one species.
///
/// Field names describe the role of each coefficient; the serialized keys are
/// the short symbols used in parameter files and override maps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeciesParams {
    /// Fraction of body weight lost each year
    #[serde(rename = "eta")]
    pub weight_loss_rate: f64,

    /// Weight gained per unit of food eaten
    #[serde(rename = "beta")]
    pub feeding_efficiency: f64,

    #[serde(rename = "phi_age")]
    pub age_steepness: f64,

    #[serde(rename = "phi_weight")]
    pub weight_steepness: f64,

    #[serde(rename = "a_half")]
    pub age_midpoint: f64,

    #[serde(rename = "w_half")]
    pub weight_midpoint: f64,

    /// Scales fitness into a yearly migration probability
    #[serde(rename = "mu")]
    pub migration_propensity: f64,

    /// Scales unfitness into a yearly death probability
    #[serde(rename = "omega")]
    pub death_rate: f64,

    /// Parents must weigh more than `zeta * (w_birth + sigma_birth)`
    #[serde(rename = "zeta")]
    pub birth_eligibility: f64,

    #[serde(rename = "w_birth")]
    pub birth_weight_mean: f64,

    #[serde(rename = "sigma_birth")]
    pub birth_weight_sd: f64,

    /// Litter coefficient in the birth probability
    #[serde(rename = "gamma")]
    pub litter_coefficient: f64,

    /// Parent loses `xi` times the newborn's weight
    #[serde(rename = "xi")]
    pub birth_weight_loss: f64,

    /// Most food an animal can eat in one year
    #[serde(rename = "F")]
    pub meal_cap: f64,

    /// Fitness gap at which a kill is certain. Predators only.
    #[serde(rename = "DeltaPhiMax", default, skip_serializing_if = "Option::is_none")]
    pub max_fitness_gap: Option<f64>,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            weight_loss_rate: 0.05,
            feeding_efficiency: 0.9,
            age_steepness: 0.6,
            weight_steepness: 0.1,
            age_midpoint: 40.0,
            weight_midpoint: 10.0,
            migration_propensity: 0.25,
            death_rate: 0.4,
            birth_eligibility: 3.5,
            birth_weight_mean: 8.0,
            birth_weight_sd: 1.5,
            litter_coefficient: 0.2,
            birth_weight_loss: 1.2,
            meal_cap: 10.0,
            max_fitness_gap: None,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            weight_loss_rate: 0.125,
            feeding_efficiency: 0.75,
            age_steepness: 0.3,
            weight_steepness: 0.4,
            age_midpoint: 40.0,
            weight_midpoint: 4.0,
            migration_propensity: 0.4,
            death_rate: 0.8,
            birth_eligibility: 3.5,
            birth_weight_mean: 6.0,
            birth_weight_sd: 1.0,
            litter_coefficient: 0.8,
            birth_weight_loss: 1.1,
            meal_cap: 50.0,
            max_fitness_gap: Some(10.0),
        }
    }

    /// Minimum weight a parent must exceed before it may give birth
    pub fn birth_threshold(&self) -> f64 {
        self.birth_eligibility * (self.birth_weight_mean + self.birth_weight_sd)
    }

    /// Every configured coefficient with its symbol key
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        let mut entries = vec![
            ("eta", self.weight_loss_rate),
            ("beta", self.feeding_efficiency),
            ("phi_age", self.age_steepness),
            ("phi_weight", self.weight_steepness),
            ("a_half", self.age_midpoint),
            ("w_half", self.weight_midpoint),
            ("mu", self.migration_propensity),
            ("omega", self.death_rate),
            ("zeta", self.birth_eligibility),
            ("w_birth", self.birth_weight_mean),
            ("sigma_birth", self.birth_weight_sd),
            ("gamma", self.litter_coefficient),
            ("xi", self.birth_weight_loss),
            ("F", self.meal_cap),
        ];
        if let Some(gap) = self.max_fitness_gap {
            entries.push(("DeltaPhiMax", gap));
        }
        entries
    }

    /// Reject any negative coefficient
    pub fn validate(&self) -> Result<(), ParamError> {
        self.entries()
            .into_iter()
            .try_for_each(|(key, value)| check_non_negative(key, value))
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut f64> {
        match key {
            "eta" => Some(&mut self.weight_loss_rate),
            "beta" => Some(&mut self.feeding_efficiency),
            "phi_age" => Some(&mut self.age_steepness),
            "phi_weight" => Some(&mut self.weight_steepness),
            "a_half" => Some(&mut self.age_midpoint),
            "w_half" => Some(&mut self.weight_midpoint),
            "mu" => Some(&mut self.migration_propensity),
            "omega" => Some(&mut self.death_rate),
            "zeta" => Some(&mut self.birth_eligibility),
            "w_birth" => Some(&mut self.birth_weight_mean),
            "sigma_birth" => Some(&mut self.birth_weight_sd),
            "gamma" => Some(&mut self.litter_coefficient),
            "xi" => Some(&mut self.birth_weight_loss),
            "F" => Some(&mut self.meal_cap),
            "DeltaPhiMax" => self.max_fitness_gap.as_mut(),
            _ => None,
        }
    }

    /// Apply a set of named overrides.
    ///
    /// Every entry is checked before anything is written, so a rejected call
    /// leaves all coefficients as they were.
    pub fn apply_overrides(
        &mut self,
        owner: Species,
        overrides: &HashMap<String, f64>,
    ) -> Result<(), ParamError> {
        let mut staged = self.clone();

        for (key, &value) in overrides {
            check_non_negative(key, value)?;
            match staged.slot_mut(key) {
                Some(slot) => *slot = value,
                None => {
                    return Err(ParamError::Unknown {
                        key: key.clone(),
                        owner: owner.to_string(),
                    })
                }
            }
        }

        *self = staged;
        Ok(())
    }
}

fn check_non_negative(key: &str, value: f64) -> Result<(), ParamError> {
    if value < 0.0 || value.is_nan() {
        return Err(ParamError::Negative {
            key: key.to_string(),
            value,
        });
    }
    Ok(())
}

/// Yearly fodder capacity per landscape kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandscapeParams {
    pub lowland_fodder: f64,
    pub highland_fodder: f64,
}

impl Default for LandscapeParams {
    fn default() -> Self {
        Self {
            lowland_fodder: 800.0,
            highland_fodder: 300.0,
        }
    }
}

impl LandscapeParams {
    /// Fodder a cell of this kind holds right after the yearly regrowth
    pub fn capacity(&self, kind: Landscape) -> f64 {
        match kind {
            Landscape::Lowland => self.lowland_fodder,
            Landscape::Highland => self.highland_fodder,
            Landscape::Desert | Landscape::Water => 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        check_non_negative("f_max", self.lowland_fodder)?;
        check_non_negative("f_max", self.highland_fodder)
    }

    /// Override the capacity of a regenerating landscape. Accepts `f_max` only.
    pub fn apply_overrides(
        &mut self,
        kind: Landscape,
        overrides: &HashMap<String, f64>,
    ) -> Result<(), ParamError> {
        if !kind.regenerates() {
            return Err(ParamError::FixedLandscape(kind));
        }

        let mut capacity = self.capacity(kind);
        for (key, &value) in overrides {
            if key != "f_max" {
                return Err(ParamError::Unknown {
                    key: key.clone(),
                    owner: format!("landscape {}", kind),
                });
            }
            check_non_negative(key, value)?;
            capacity = value;
        }

        match kind {
            Landscape::Lowland => self.lowland_fodder = capacity,
            Landscape::Highland => self.highland_fodder = capacity,
            Landscape::Desert | Landscape::Water => {}
        }
        Ok(())
    }
}

/// Everything the engine needs to know about species and landscapes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameters {
    pub herbivore: SpeciesParams,
    pub carnivore: SpeciesParams,
    pub landscape: LandscapeParams,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            landscape: LandscapeParams::default(),
        }
    }
}

impl Parameters {
    /// Check a parameter bundle assembled outside the override operations
    pub fn validate(&self) -> Result<(), ParamError> {
        self.herbivore.validate()?;
        self.carnivore.validate()?;
        self.landscape.validate()
    }

    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    pub fn species_mut(&mut self, species: Species) -> &mut SpeciesParams {
        match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        }
    }

    pub fn set_species(
        &mut self,
        species: Species,
        overrides: &HashMap<String, f64>,
    ) -> Result<(), ParamError> {
        self.species_mut(species).apply_overrides(species, overrides)
    }

    pub fn set_landscape(
        &mut self,
        kind: Landscape,
        overrides: &HashMap<String, f64>,
    ) -> Result<(), ParamError> {
        self.landscape.apply_overrides(kind, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn overrides(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_species_parse() {
        assert_eq!("Herbivore".parse::<Species>(), Ok(Species::Herbivore));
        assert_eq!("Carnivore".parse::<Species>(), Ok(Species::Carnivore));
        assert_eq!(
            "Omnivore".parse::<Species>(),
            Err(ParamError::UnknownSpecies("Omnivore".to_string()))
        );
    }

    #[test]
    fn test_landscape_codes() {
        for kind in Landscape::ALL {
            assert_eq!(Landscape::from_code(kind.code()), Ok(kind));
        }
        assert!(Landscape::from_code('X').is_err());
        assert!(!Landscape::Water.is_passable());
        assert!(Landscape::Desert.is_passable());
        assert!(!Landscape::Desert.regenerates());
    }

    #[test]
    fn test_override_applies() {
        let mut params = SpeciesParams::herbivore();
        params
            .apply_overrides(Species::Herbivore, &overrides(&[("beta", 0.5), ("F", 20.0)]))
            .unwrap();

        assert_eq!(params.feeding_efficiency, 0.5);
        assert_eq!(params.meal_cap, 20.0);
        assert_eq!(params.weight_loss_rate, 0.05);
    }

    #[test]
    fn test_negative_override_is_rejected_whole() {
        let mut params = SpeciesParams::carnivore();
        let result = params.apply_overrides(
            Species::Carnivore,
            &overrides(&[("beta", 0.1), ("eta", -0.5)]),
        );

        assert!(matches!(result, Err(ParamError::Negative { .. })));
        assert_eq!(params, SpeciesParams::carnivore());
    }

    #[test]
    fn test_herbivores_have_no_kill_gap() {
        let mut params = SpeciesParams::herbivore();
        let result = params.apply_overrides(Species::Herbivore, &overrides(&[("DeltaPhiMax", 5.0)]));

        assert!(matches!(result, Err(ParamError::Unknown { .. })));

        let mut carn = SpeciesParams::carnivore();
        carn.apply_overrides(Species::Carnivore, &overrides(&[("DeltaPhiMax", 5.0)]))
            .unwrap();
        assert_eq!(carn.max_fitness_gap, Some(5.0));
    }

    #[test]
    fn test_landscape_overrides() {
        let mut landscape = LandscapeParams::default();
        landscape
            .apply_overrides(Landscape::Lowland, &overrides(&[("f_max", 500.0)]))
            .unwrap();
        assert_eq!(landscape.capacity(Landscape::Lowland), 500.0);

        assert_eq!(
            landscape.apply_overrides(Landscape::Water, &overrides(&[("f_max", 10.0)])),
            Err(ParamError::FixedLandscape(Landscape::Water))
        );
        assert!(landscape
            .apply_overrides(Landscape::Highland, &overrides(&[("f_max", -1.0)]))
            .is_err());
        assert_eq!(landscape.capacity(Landscape::Highland), 300.0);
        assert_eq!(landscape.capacity(Landscape::Desert), 0.0);
    }

    #[test]
    fn test_params_serialize_with_symbol_keys() {
        let json = serde_json::to_value(SpeciesParams::carnivore()).unwrap();
        assert_eq!(json["DeltaPhiMax"], 10.0);
        assert_eq!(json["F"], 50.0);

        let herb = serde_json::to_value(SpeciesParams::herbivore()).unwrap();
        assert!(herb.get("DeltaPhiMax").is_none());
    }

    #[test]
    fn test_validate_rejects_negative_coefficients() {
        assert_eq!(Parameters::default().validate(), Ok(()));

        let mut params = Parameters::default();
        params.herbivore.weight_loss_rate = -1.0;
        assert_eq!(
            params.validate(),
            Err(ParamError::Negative {
                key: "eta".to_string(),
                value: -1.0
            })
        );

        let mut params = Parameters::default();
        params.carnivore.max_fitness_gap = Some(-2.0);
        assert!(matches!(
            params.validate(),
            Err(ParamError::Negative { ref key, .. }) if key == "DeltaPhiMax"
        ));

        let mut params = Parameters::default();
        params.landscape.highland_fodder = f64::NAN;
        assert!(params.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_any_negative_leaves_params_untouched(
            good in 0.0f64..100.0,
            bad in -100.0f64..-0.001,
        ) {
            let mut params = SpeciesParams::herbivore();
            let result = params.apply_overrides(
                Species::Herbivore,
                &overrides(&[("mu", good), ("omega", bad), ("gamma", good)]),
            );

            prop_assert!(result.is_err());
            prop_assert_eq!(params, SpeciesParams::herbivore());
        }
    }
}
