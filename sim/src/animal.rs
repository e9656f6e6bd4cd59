use crate::random::RandomStream;
use shared::{AnimalSnapshot, Species, SpeciesParams};

/// Fitness from age and weight: a falling age curve times a rising weight
/// curve. Zero for any non-positive weight, otherwise in [0, 1].
pub fn fitness(age: u32, weight: f64, params: &SpeciesParams) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }

    let age_part =
        1.0 / (1.0 + (params.age_steepness * (age as f64 - params.age_midpoint)).exp());
    let weight_part =
        1.0 / (1.0 + (-params.weight_steepness * (weight - params.weight_midpoint)).exp());

    age_part * weight_part
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    species: Species,
    pub age: u32,
    pub weight: f64,
    /// Only as fresh as the last `fitness_update`
    pub fitness: f64,
    pub has_migrated: bool,
    pub amount_eaten: f64,
    /// Predators stop killing once they have eaten their fill
    pub hungry: bool,
}

impl Animal {
    /// Create an animal with its fitness already computed
    pub fn new(species: Species, age: u32, weight: f64, params: &SpeciesParams) -> Self {
        Self {
            species,
            age,
            weight,
            fitness: fitness(age, weight, params),
            has_migrated: false,
            amount_eaten: 0.0,
            hungry: true,
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn snapshot(&self) -> AnimalSnapshot {
        AnimalSnapshot {
            species: self.species,
            age: self.age,
            weight: self.weight,
            fitness: self.fitness,
        }
    }

    pub fn fitness_update(&mut self, params: &SpeciesParams) {
        self.fitness = fitness(self.age, self.weight, params);
    }

    pub fn age_update(&mut self, params: &SpeciesParams) {
        self.age += 1;
        self.fitness_update(params);
    }

    /// Eat `amount` of food. The caller keeps the amount within the meal cap.
    pub fn feed(&mut self, amount: f64, params: &SpeciesParams) {
        self.weight += amount * params.feeding_efficiency;
        self.amount_eaten += amount;
        self.fitness_update(params);
    }

    pub fn annual_weight_loss(&mut self, params: &SpeciesParams) {
        self.weight -= params.weight_loss_rate * self.weight;
        self.fitness_update(params);
    }

    /// One draw per call, even for animals that already moved this year
    pub fn want_to_migrate<R: RandomStream>(&mut self, params: &SpeciesParams, rng: &mut R) -> bool {
        self.fitness_update(params);
        let draw = rng.uniform();
        !self.has_migrated && params.migration_propensity * self.fitness > draw
    }

    pub fn able_to_give_birth(&self, params: &SpeciesParams) -> bool {
        self.weight > params.birth_threshold()
    }

    /// Try to give birth in a local population of `population` animals of the
    /// same species. Returns the newborn on success; on failure nothing changes.
    ///
    /// The newborn weight is always drawn. A non-positive newborn weight fails
    /// at once, and like a parent too light to pay the weight loss it then
    /// consumes no uniform draw.
    pub fn birth<R: RandomStream>(
        &mut self,
        population: usize,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Option<Animal> {
        let newborn_weight = rng.gaussian(params.birth_weight_mean, params.birth_weight_sd);
        let weight_loss = params.birth_weight_loss * newborn_weight;
        let probability =
            (params.litter_coefficient * self.fitness * (population as f64 - 1.0)).min(1.0);

        if newborn_weight > 0.0
            && self.weight > weight_loss
            && rng.uniform() < probability
            && self.able_to_give_birth(params)
        {
            self.weight -= weight_loss;
            self.fitness_update(params);
            return Some(Animal::new(self.species, 0, newborn_weight, params));
        }

        None
    }

    /// Starved animals always die; others die with probability `omega * (1 - fitness)`
    pub fn animal_dies<R: RandomStream>(&mut self, params: &SpeciesParams, rng: &mut R) -> bool {
        self.fitness_update(params);
        self.weight <= 0.0 || params.death_rate * (1.0 - self.fitness) > rng.uniform()
    }

    pub fn reset_amount(&mut self) {
        self.has_migrated = false;
        self.amount_eaten = 0.0;
        self.hungry = true;
    }

    /// Probability that this predator kills `prey`, from the fitness gap
    pub fn kill_proba(&self, prey: &Animal, params: &SpeciesParams) -> f64 {
        let Some(max_gap) = params.max_fitness_gap else {
            return 0.0;
        };

        let gap = self.fitness - prey.fitness;
        if gap <= 0.0 {
            0.0
        } else if gap >= max_gap {
            1.0
        } else {
            gap / max_gap
        }
    }

    /// Attempt to kill and eat `prey`. Returns true if the prey was killed and
    /// must be removed by the caller.
    ///
    /// The kill draw is made before hunger is checked. A predator never eats
    /// more than its meal cap in one year.
    pub fn kill<R: RandomStream>(
        &mut self,
        prey: &Animal,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> bool {
        let attempt = self.kill_proba(prey, params) > rng.uniform();
        if !attempt || !self.hungry {
            return false;
        }

        let room = (params.meal_cap - self.amount_eaten).max(0.0);
        let meal = prey.weight.clamp(0.0, room);
        self.feed(meal, params);
        if self.amount_eaten >= params.meal_cap {
            self.hungry = false;
        }

        true
    }
}
