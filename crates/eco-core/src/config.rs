//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default side length of the square grid
pub const DEFAULT_GRID_SIDE: usize = 15;

/// Largest accepted grid side
pub const MAX_GRID_SIDE: usize = 1024;

/// Plant parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantConfig {
    /// Lifespan in ticks
    pub max_age: i32,
    /// Chance per tick that a plant seeds an empty neighbour
    pub growth_probability: f64,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            max_age: 10,
            growth_probability: 0.2,
        }
    }
}

/// Parameters shared by herbivores and carnivores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalConfig {
    /// Lifespan in ticks
    pub max_age: i32,
    /// Energy of a newly placed or newborn animal
    pub initial_energy: i32,
    /// Eating never raises energy above this
    pub max_energy: i32,
    /// Minimum energy required to reproduce
    pub reproduction_threshold: i32,
    pub reproduction_probability: f64,
    pub move_probability: f64,
    pub eat_probability: f64,
    /// Energy gained per prey eaten
    pub eat_gain: i32,
    /// Energy cost to move
    pub move_cost: i32,
    /// Energy cost to reproduce
    pub reproduce_cost: i32,
}

impl AnimalConfig {
    pub fn herbivore() -> Self {
        Self {
            max_age: 50,
            initial_energy: 200,
            max_energy: 200,
            reproduction_threshold: 20,
            reproduction_probability: 0.075,
            move_probability: 0.7,
            eat_probability: 0.9,
            eat_gain: 30,
            move_cost: 5,
            reproduce_cost: 10,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            max_age: 80,
            initial_energy: 200,
            max_energy: 200,
            reproduction_threshold: 20,
            reproduction_probability: 0.025,
            move_probability: 0.5,
            eat_probability: 1.0,
            eat_gain: 20,
            move_cost: 5,
            reproduce_cost: 10,
        }
    }

    fn validate(&self, species: &str) -> Result<()> {
        check_probability(species, "reproduction_probability", self.reproduction_probability)?;
        check_probability(species, "move_probability", self.move_probability)?;
        check_probability(species, "eat_probability", self.eat_probability)?;
        if self.max_age <= 0 {
            return Err(Error::Config(format!("{species}.max_age must be positive")));
        }
        if self.max_energy < self.initial_energy {
            return Err(Error::Config(format!(
                "{species}.max_energy ({}) is below initial_energy ({})",
                self.max_energy, self.initial_energy
            )));
        }
        if self.move_cost < 0 || self.reproduce_cost < 0 || self.eat_gain < 0 {
            return Err(Error::Config(format!(
                "{species} energy deltas must not be negative"
            )));
        }
        Ok(())
    }
}

fn check_probability(species: &str, name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{species}.{name} must be within [0, 1], got {value}"
        )))
    }
}

/// Simulation-wide parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcosystemConfig {
    /// Side length of the square grid
    pub grid_side: usize,
    /// Random seed for reproducibility; drawn from the OS when absent
    pub seed: Option<u64>,
    /// Ticks between population summaries in the log
    pub log_interval: u64,
    pub plant: PlantConfig,
    pub herbivore: AnimalConfig,
    pub carnivore: AnimalConfig,
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            grid_side: DEFAULT_GRID_SIDE,
            seed: None,
            log_interval: 100,
            plant: PlantConfig::default(),
            herbivore: AnimalConfig::herbivore(),
            carnivore: AnimalConfig::carnivore(),
        }
    }
}

impl EcosystemConfig {
    pub fn validate(&self) -> Result<()> {
        if self.grid_side == 0 {
            return Err(Error::Config("grid_side must be positive".to_string()));
        }
        if self.grid_side > MAX_GRID_SIDE {
            return Err(Error::Config(format!(
                "grid_side {} exceeds the maximum of {MAX_GRID_SIDE}",
                self.grid_side
            )));
        }
        if self.plant.max_age <= 0 {
            return Err(Error::Config("plant.max_age must be positive".to_string()));
        }
        check_probability("plant", "growth_probability", self.plant.growth_probability)?;
        self.herbivore.validate("herbivore")?;
        self.carnivore.validate("carnivore")?;
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: String,
    /// Server port
    pub port: u16,
    /// Directory of static front-end files served on unmatched routes
    pub static_dir: Option<String>,
    /// OpenTelemetry endpoint
    pub otel_endpoint: Option<String>,
    pub ecosystem: EcosystemConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: None,
            otel_endpoint: None,
            ecosystem: EcosystemConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with `ECO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("ECO_BIND_ADDRESS") {
            config.bind_address = addr;
        }
        if let Some(port) = lookup("ECO_PORT") {
            config.port = parse_var("ECO_PORT", &port)?;
        }
        if let Some(dir) = lookup("ECO_STATIC_DIR").filter(|d| !d.is_empty()) {
            config.static_dir = Some(dir);
        }
        if let Some(seed) = lookup("ECO_SEED") {
            config.ecosystem.seed = Some(parse_var("ECO_SEED", &seed)?);
        }
        if let Some(side) = lookup("ECO_GRID_SIDE") {
            config.ecosystem.grid_side = parse_var("ECO_GRID_SIDE", &side)?;
        }
        if let Some(endpoint) = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|e| !e.is_empty()) {
            config.otel_endpoint = Some(endpoint);
        }

        config.ecosystem.validate()?;
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} has invalid value {raw:?}")))
}
