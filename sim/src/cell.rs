use crate::animal::Animal;
use crate::random::RandomStream;
use shared::{
    AnimalSnapshot, Landscape, LandscapeParams, Parameters, Species, SpeciesCounts, SpeciesParams,
};

/// Grid location as 1-based (row, column)
pub type Loc = (usize, usize);

/// One square of the island: a landscape, its fodder and the animals on it
#[derive(Debug, Clone)]
pub struct Cell {
    pub landscape: Landscape,
    pub loc: Loc,
    pub fodder: f64,
    pub herbivores: Vec<Animal>,
    pub carnivores: Vec<Animal>,
}

impl Cell {
    pub fn new(landscape: Landscape, loc: Loc, params: &LandscapeParams) -> Self {
        Self {
            landscape,
            loc,
            fodder: params.capacity(landscape),
            herbivores: Vec::new(),
            carnivores: Vec::new(),
        }
    }

    pub fn is_passable(&self) -> bool {
        self.landscape.is_passable()
    }

    pub fn population(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    fn population_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    pub fn number_of_herbivores(&self) -> usize {
        self.herbivores.len()
    }

    pub fn number_of_carnivores(&self) -> usize {
        self.carnivores.len()
    }

    pub fn counts(&self) -> SpeciesCounts {
        SpeciesCounts {
            herbivores: self.herbivores.len(),
            carnivores: self.carnivores.len(),
        }
    }

    /// Put an animal into the collection of its own species
    pub fn add_animal(&mut self, animal: Animal) {
        self.population_mut(animal.species()).push(animal);
    }

    pub fn add_animals(&mut self, animals: impl IntoIterator<Item = Animal>) {
        for animal in animals {
            self.add_animal(animal);
        }
    }

    pub fn snapshots(&self, species: Species) -> impl Iterator<Item = AnimalSnapshot> + '_ {
        self.population(species).iter().map(Animal::snapshot)
    }

    /// Regrow fodder to the landscape's capacity
    pub fn update_fodder_year(&mut self, params: &LandscapeParams) {
        self.fodder = params.capacity(self.landscape);
    }

    fn update_fitness(population: &mut [Animal], params: &SpeciesParams) {
        for animal in population {
            animal.fitness_update(params);
        }
    }

    /// Herbivores eat in order of decreasing fitness until the fodder runs out.
    /// Ties keep their insertion order.
    pub fn herbivores_eat(&mut self, params: &SpeciesParams) {
        Self::update_fitness(&mut self.herbivores, params);
        self.herbivores.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        for herb in &mut self.herbivores {
            let portion = params.meal_cap.min(self.fodder).max(0.0);
            herb.feed(portion, params);
            self.fodder -= portion;
        }
    }

    /// Each carnivore in turn tries every remaining herbivore, weakest first
    pub fn carnivores_eat<R: RandomStream>(&mut self, params: &Parameters, rng: &mut R) {
        Self::update_fitness(&mut self.carnivores, &params.carnivore);
        Self::update_fitness(&mut self.herbivores, &params.herbivore);
        self.herbivores.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));

        let before = self.herbivores.len();
        for carn in &mut self.carnivores {
            self.herbivores.retain(|herb| !carn.kill(herb, &params.carnivore, rng));
        }

        let killed = before - self.herbivores.len();
        if killed > 0 {
            tracing::trace!(loc = ?self.loc, killed, "carnivores fed");
        }
    }

    /// Every animal gets one chance to give birth. The population size used
    /// for the birth probability is fixed before any newborn is added.
    pub fn add_newborns<R: RandomStream>(&mut self, params: &Parameters, rng: &mut R) {
        Self::update_fitness(&mut self.herbivores, &params.herbivore);
        Self::update_fitness(&mut self.carnivores, &params.carnivore);

        let loc = self.loc;
        for species in Species::ALL {
            let species_params = params.species(species);
            let population = self.population_mut(species);
            let n = population.len();

            let newborns: Vec<Animal> = population
                .iter_mut()
                .filter_map(|animal| animal.birth(n, species_params, rng))
                .collect();

            if !newborns.is_empty() {
                tracing::trace!(loc = ?loc, %species, born = newborns.len(), "newborns");
            }
            population.extend(newborns);
        }
    }

    pub fn updating_age_for_entire_population(&mut self, params: &Parameters) {
        for herb in &mut self.herbivores {
            herb.age_update(&params.herbivore);
        }
        for carn in &mut self.carnivores {
            carn.age_update(&params.carnivore);
        }
    }

    pub fn updating_weight_loss_for_entire_population(&mut self, params: &Parameters) {
        for herb in &mut self.herbivores {
            herb.annual_weight_loss(&params.herbivore);
        }
        for carn in &mut self.carnivores {
            carn.annual_weight_loss(&params.carnivore);
        }
    }

    pub fn check_for_random_death<R: RandomStream>(&mut self, params: &Parameters, rng: &mut R) {
        self.herbivores
            .retain_mut(|herb| !herb.animal_dies(&params.herbivore, rng));
        self.carnivores
            .retain_mut(|carn| !carn.animal_dies(&params.carnivore, rng));
    }

    pub fn reset_attributes(&mut self) {
        for animal in self.herbivores.iter_mut().chain(self.carnivores.iter_mut()) {
            animal.reset_amount();
        }
    }

    /// Split a population into (migrating, staying). Migrants are marked as
    /// having moved so they are not offered again this year.
    pub fn animals_to_migrate<R: RandomStream>(
        population: Vec<Animal>,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> (Vec<Animal>, Vec<Animal>) {
        let mut migrate = Vec::new();
        let mut stay = Vec::new();

        for mut animal in population {
            if animal.want_to_migrate(params, rng) {
                animal.has_migrated = true;
                migrate.push(animal);
            } else {
                stay.push(animal);
            }
        }

        (migrate, stay)
    }

    /// Remove and return the animals of one species that leave this year
    pub fn take_migrants<R: RandomStream>(
        &mut self,
        species: Species,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Vec<Animal> {
        let population = std::mem::take(self.population_mut(species));
        let (migrate, stay) = Self::animals_to_migrate(population, params, rng);
        *self.population_mut(species) = stay;
        migrate
    }

    /// Pick one of the four orthogonal neighbours at random, passable or not
    pub fn get_target_destination<R: RandomStream>(loc: Loc, rng: &mut R) -> Loc {
        let (row, col) = loc;
        let neighbours = [
            (row.saturating_sub(1), col),
            (row + 1, col),
            (row, col.saturating_sub(1)),
            (row, col + 1),
        ];
        neighbours[rng.pick(neighbours.len())]
    }
}
