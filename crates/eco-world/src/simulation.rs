//! Simulation engine: the per-tick pipeline and the `Ecosystem` entry point.

use crate::actions::{self, ActionOutcome};
use crate::grid::Grid;
use crate::populate::{populate, Newborns, Population};
use eco_core::{
    AnimalConfig, Census, EcosystemConfig, Entity, EntityKind, GridSnapshot, Position, Result,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, event, info, instrument, Level};

/// The two animal species, which share the eat/move/reproduce cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Animal {
    Herbivore,
    Carnivore,
}

impl Animal {
    fn kind(self) -> EntityKind {
        match self {
            Animal::Herbivore => EntityKind::Herbivore,
            Animal::Carnivore => EntityKind::Carnivore,
        }
    }

    fn prey(self) -> EntityKind {
        match self {
            Animal::Herbivore => EntityKind::Plant,
            Animal::Carnivore => EntityKind::Herbivore,
        }
    }
}

/// What happened during a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    /// Entities that reached the end of their lifespan
    pub expired: usize,
    pub plants_eaten: usize,
    pub herbivores_eaten: usize,
    pub moves: usize,
    /// Animals whose energy ran out after a move or reproduction
    pub starved: usize,
    pub births: usize,
    pub sprouts: usize,
    pub census: Census,
}

impl TickReport {
    fn record(&mut self, species: Animal, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::Moved { .. } => self.moves += 1,
            ActionOutcome::Starved { .. } => self.starved += 1,
            ActionOutcome::Ate { .. } => match species {
                Animal::Herbivore => self.plants_eaten += 1,
                Animal::Carnivore => self.herbivores_eaten += 1,
            },
            ActionOutcome::Reproduced { parent_died, .. } => {
                self.births += 1;
                if parent_died {
                    self.starved += 1;
                }
            }
            ActionOutcome::Grew { .. } => self.sprouts += 1,
            ActionOutcome::NoTarget | ActionOutcome::Skipped => {}
        }
    }
}

/// A predator–prey–vegetation world together with its random source.
///
/// The grid is mutated in place: every sweep scans it row-major and the
/// effect of an action is visible to every cell visited after it, within the
/// same sweep and in the sweeps that follow.
pub struct Ecosystem {
    grid: Grid,
    config: EcosystemConfig,
    rng: ChaCha8Rng,
    tick: u64,
    last_report: TickReport,
}

impl Ecosystem {
    pub fn new(config: EcosystemConfig, rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(config.grid_side);
        let census = grid.census();

        Ok(Self {
            grid,
            config,
            rng,
            tick: 0,
            last_report: TickReport {
                census,
                ..Default::default()
            },
        })
    }

    /// Seeds from `config.seed`, or from the OS when no seed is set.
    pub fn from_config(config: EcosystemConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(config, rng)
    }

    pub fn with_seed(config: EcosystemConfig, seed: u64) -> Result<Self> {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct access to the cells, for seeding hand-built scenarios.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn config(&self) -> &EcosystemConfig {
        &self.config
    }

    /// Ticks advanced since the last initialization
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn census(&self) -> Census {
        self.grid.census()
    }

    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.grid.snapshot()
    }

    /// Clear the world and place a fresh population on it.
    ///
    /// Fails with `OverCapacity` before touching the grid if the population
    /// does not fit.
    #[instrument(skip(self))]
    pub fn initialize(&mut self, population: Population) -> Result<GridSnapshot> {
        population.check_fits(self.grid.capacity())?;

        self.grid.clear();
        self.tick = 0;
        let newborns = self.newborns();
        populate(&mut self.grid, population, &newborns, &mut self.rng)?;

        let census = self.grid.census();
        self.last_report = TickReport {
            census,
            ..Default::default()
        };

        info!(
            event = "ecosystem_initialized",
            plants = census.plants,
            herbivores = census.herbivores,
            carnivores = census.carnivores,
            empty = census.empty,
            "Ecosystem initialized"
        );

        Ok(self.grid.snapshot())
    }

    /// Run exactly one tick and return the resulting grid.
    pub fn advance(&mut self) -> Result<GridSnapshot> {
        self.step()?;
        Ok(self.grid.snapshot())
    }

    /// Run `ticks` ticks, returning the report of the last one.
    #[instrument(skip(self))]
    pub fn run(&mut self, ticks: u64) -> Result<TickReport> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(self.last_report)
    }

    /// Execute one simulation step
    fn step(&mut self) -> Result<()> {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..Default::default()
        };

        report.expired = self.aging_pass();
        self.animal_passes(Animal::Carnivore, &mut report)?;
        self.animal_passes(Animal::Herbivore, &mut report)?;
        self.growth_pass(&mut report)?;

        report.census = self.grid.census();
        debug!(
            tick = report.tick,
            plants = report.census.plants,
            herbivores = report.census.herbivores,
            carnivores = report.census.carnivores,
            expired = report.expired,
            plants_eaten = report.plants_eaten,
            herbivores_eaten = report.herbivores_eaten,
            moves = report.moves,
            starved = report.starved,
            births = report.births,
            sprouts = report.sprouts,
            "Tick complete"
        );

        if self.config.log_interval > 0 && self.tick % self.config.log_interval == 0 {
            self.emit_population_metrics(&report);
        }

        self.last_report = report;
        Ok(())
    }

    /// Age every living cell by one tick; returns how many expired.
    fn aging_pass(&mut self) -> usize {
        let mut expired = 0;
        for entity in self.grid.entities_mut() {
            if entity.grow_older() {
                expired += 1;
            }
        }
        expired
    }

    /// Eat sweep, then move sweep, then reproduce sweep for one species.
    fn animal_passes(&mut self, species: Animal, report: &mut TickReport) -> Result<()> {
        let cfg: AnimalConfig = match species {
            Animal::Herbivore => self.config.herbivore.clone(),
            Animal::Carnivore => self.config.carnivore.clone(),
        };
        let kind = species.kind();
        let prey = species.prey();
        let offspring = Entity::new(kind, cfg.initial_energy, cfg.max_age);

        let eaten = sweep(
            &mut self.grid,
            &mut self.rng,
            kind,
            cfg.eat_probability,
            |grid, pos, rng| actions::eat(grid, pos, prey, cfg.eat_gain, cfg.max_energy, rng),
        )?;
        let moved = sweep(
            &mut self.grid,
            &mut self.rng,
            kind,
            cfg.move_probability,
            |grid, pos, rng| actions::move_entity(grid, pos, cfg.move_cost, rng),
        )?;
        let born = sweep(
            &mut self.grid,
            &mut self.rng,
            kind,
            cfg.reproduction_probability,
            |grid, pos, rng| {
                actions::reproduce(
                    grid,
                    pos,
                    offspring,
                    cfg.reproduction_threshold,
                    cfg.reproduce_cost,
                    rng,
                )
            },
        )?;

        for outcome in eaten.into_iter().chain(moved).chain(born) {
            report.record(species, outcome);
        }
        Ok(())
    }

    fn growth_pass(&mut self, report: &mut TickReport) -> Result<()> {
        let sprout = self.newborns().plant;
        let grown = sweep(
            &mut self.grid,
            &mut self.rng,
            EntityKind::Plant,
            self.config.plant.growth_probability,
            |grid, pos, rng| actions::grow(grid, pos, sprout, rng),
        )?;
        report.sprouts += grown.iter().filter(|o| o.is_success()).count();
        Ok(())
    }

    fn newborns(&self) -> Newborns {
        let herbivore = &self.config.herbivore;
        let carnivore = &self.config.carnivore;
        Newborns {
            plant: Entity::new(EntityKind::Plant, 0, self.config.plant.max_age),
            herbivore: Entity::new(
                EntityKind::Herbivore,
                herbivore.initial_energy,
                herbivore.max_age,
            ),
            carnivore: Entity::new(
                EntityKind::Carnivore,
                carnivore.initial_energy,
                carnivore.max_age,
            ),
        }
    }

    fn emit_population_metrics(&self, report: &TickReport) {
        info!(
            event = "population_metrics",
            tick = report.tick,
            plants = report.census.plants,
            herbivores = report.census.herbivores,
            carnivores = report.census.carnivores,
            living = report.census.living(),
            births = report.births,
            sprouts = report.sprouts,
            "Population metrics snapshot"
        );

        event!(
            Level::INFO,
            gauge_name = "population_total",
            gauge_value = report.census.living(),
            tick = report.tick,
            "Population gauge"
        );
    }
}

/// Scan the grid row-major; for every cell holding `kind`, draw once and apply
/// `action` if the draw falls below `probability`.
///
/// The kind is re-read from the live grid at each cell, so entities moved or
/// spawned earlier in the sweep are seen where they now stand.
fn sweep<F>(
    grid: &mut Grid,
    rng: &mut ChaCha8Rng,
    kind: EntityKind,
    probability: f64,
    mut action: F,
) -> Result<Vec<ActionOutcome>>
where
    F: FnMut(&mut Grid, Position, &mut ChaCha8Rng) -> Result<ActionOutcome>,
{
    let mut outcomes = Vec::new();
    let side = grid.side();

    for row in 0..side {
        for col in 0..side {
            let pos = Position::new(row, col);
            if grid.kind_at(pos)? != kind {
                continue;
            }
            if rng.gen::<f64>() >= probability {
                continue;
            }
            outcomes.push(action(grid, pos, rng)?);
        }
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> EcosystemConfig {
        let mut config = EcosystemConfig::default();
        config.plant.growth_probability = 0.0;
        for animal in [&mut config.herbivore, &mut config.carnivore] {
            animal.eat_probability = 0.0;
            animal.move_probability = 0.0;
            animal.reproduction_probability = 0.0;
        }
        config
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Ecosystem::with_seed(EcosystemConfig::default(), 42).unwrap();
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.grid().side(), 15);
        assert!(sim.grid().is_barren());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EcosystemConfig::default();
        config.carnivore.eat_probability = 2.0;
        assert!(Ecosystem::with_seed(config, 1).is_err());
    }

    #[test]
    fn test_oversized_grid_rejected_before_allocation() {
        let config = EcosystemConfig {
            grid_side: usize::MAX,
            ..Default::default()
        };
        assert!(matches!(
            Ecosystem::with_seed(config, 1),
            Err(eco_core::Error::Config(_))
        ));
    }

    #[test]
    fn test_initialize_resets_tick_and_grid() {
        let mut sim = Ecosystem::with_seed(quiet_config(), 42).unwrap();
        sim.initialize(Population::new(10, 5, 2)).unwrap();
        sim.run(3).unwrap();
        assert_eq!(sim.tick(), 3);

        let snapshot = sim.initialize(Population::new(1, 0, 0)).unwrap();
        assert_eq!(sim.tick(), 0);
        assert_eq!(snapshot.census().plants, 1);
        assert_eq!(snapshot.census().living(), 1);
    }

    #[test]
    fn test_aging_pass_expires_last_tick() {
        let mut sim = Ecosystem::with_seed(quiet_config(), 42).unwrap();
        let pos = Position::new(4, 4);
        sim.grid_mut()
            .set(pos, Entity::new(EntityKind::Herbivore, 100, 1))
            .unwrap();
        sim.grid_mut()
            .set(Position::new(0, 0), Entity::new(EntityKind::Carnivore, 100, 2))
            .unwrap();

        sim.advance().unwrap();
        assert!(sim.grid().get(pos).unwrap().is_empty());
        assert_eq!(sim.grid().get(Position::new(0, 0)).unwrap().age, 1);
        assert_eq!(sim.last_report().expired, 1);
    }

    #[test]
    fn test_carnivores_act_before_herbivores() {
        // A herbivore next to both a plant and a hungry carnivore gets eaten
        // before it can feed.
        let mut config = quiet_config();
        config.carnivore.eat_probability = 1.0;
        config.herbivore.eat_probability = 1.0;
        let mut sim = Ecosystem::with_seed(config, 7).unwrap();

        let grid = sim.grid_mut();
        grid.set(Position::new(0, 0), Entity::new(EntityKind::Carnivore, 100, 80))
            .unwrap();
        grid.set(Position::new(0, 1), Entity::new(EntityKind::Herbivore, 100, 50))
            .unwrap();
        grid.set(Position::new(0, 2), Entity::new(EntityKind::Plant, 0, 10))
            .unwrap();

        sim.advance().unwrap();
        let census = sim.census();
        assert_eq!(census.herbivores, 0);
        assert_eq!(census.plants, 1);
        assert_eq!(sim.grid().get(Position::new(0, 0)).unwrap().energy, 120);
        assert_eq!(sim.last_report().herbivores_eaten, 1);
        assert_eq!(sim.last_report().plants_eaten, 0);
    }

    #[test]
    fn test_report_counts_each_diet_separately() {
        let mut config = quiet_config();
        config.carnivore.eat_probability = 1.0;
        config.herbivore.eat_probability = 1.0;
        let mut sim = Ecosystem::with_seed(config, 8).unwrap();

        let grid = sim.grid_mut();
        grid.set(Position::new(0, 0), Entity::new(EntityKind::Carnivore, 100, 80))
            .unwrap();
        grid.set(Position::new(0, 1), Entity::new(EntityKind::Herbivore, 100, 50))
            .unwrap();
        grid.set(Position::new(10, 10), Entity::new(EntityKind::Herbivore, 100, 50))
            .unwrap();
        grid.set(Position::new(10, 11), Entity::new(EntityKind::Plant, 0, 10))
            .unwrap();

        sim.advance().unwrap();
        assert_eq!(sim.last_report().herbivores_eaten, 1);
        assert_eq!(sim.last_report().plants_eaten, 1);
        assert_eq!(sim.census().plants, 0);
        assert_eq!(sim.census().herbivores, 1);
    }

    #[test]
    fn test_growth_pass_sees_its_own_sprouts() {
        // Sprouts placed south or east of a scanned plant are visited later in
        // the same sweep and may grow again.
        let mut config = quiet_config();
        config.plant.growth_probability = 1.0;
        config.grid_side = 4;
        let mut sim = Ecosystem::with_seed(config, 3).unwrap();
        sim.grid_mut()
            .set(Position::new(0, 0), Entity::new(EntityKind::Plant, 0, 10))
            .unwrap();

        sim.advance().unwrap();
        assert!(sim.census().plants >= 2);
        assert_eq!(sim.last_report().sprouts + 1, sim.census().plants);
    }

    #[test]
    fn test_same_seed_same_history() {
        let population = Population::new(60, 30, 10);
        let mut a = Ecosystem::with_seed(EcosystemConfig::default(), 99).unwrap();
        let mut b = Ecosystem::with_seed(EcosystemConfig::default(), 99).unwrap();

        assert_eq!(a.initialize(population).unwrap(), b.initialize(population).unwrap());
        for _ in 0..20 {
            assert_eq!(a.advance().unwrap(), b.advance().unwrap());
        }
        assert_eq!(a.last_report(), b.last_report());
    }

    #[test]
    fn test_report_census_matches_grid() {
        let mut sim = Ecosystem::with_seed(EcosystemConfig::default(), 5).unwrap();
        sim.initialize(Population::new(50, 25, 8)).unwrap();
        let report = sim.run(10).unwrap();
        assert_eq!(report.tick, 10);
        assert_eq!(report.census, sim.census());
        assert_eq!(report.census.total(), 225);
    }
}
