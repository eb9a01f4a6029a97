//! Configuration for networks and the evolution loop.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::error::ConfigError;
use crate::neural::{Activation, MutationConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub evolution: EvolutionConfig,
    /// Random seed; drawn from entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network shape and initialisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Neuron count per stage, input stage first
    pub topology: Vec<usize>,
    /// Activation installed on every layer of the initial population
    pub activation: Activation,
    /// Lower bound of initial weights and biases
    pub init_min: f32,
    /// Upper bound of initial weights and biases
    pub init_max: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Networks per generation; odd values are rounded up
    pub size: usize,
}

/// Evolution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Probability of perturbing each weight and bias of an offspring
    pub mutation_chance: f32,
    /// Magnitude of perturbations
    pub mutation_strength: f32,
    /// Per-position probability that children inherit without swapping
    pub crossover_chance: f32,
    /// Probability that a parent pair produces offspring at all
    pub crossover_probability: f32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Generations between summary lines
    pub stats_interval: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            topology: vec![5, 3, 2],
            activation: Activation::Tanh,
            init_min: -5.0,
            init_max: 5.0,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self { size: 50 }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation_chance: 0.01,
            mutation_strength: 0.5,
            crossover_chance: 0.01,
            crossover_probability: 0.01,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 1,
        }
    }
}

impl PopulationConfig {
    /// Population size forced even by rounding up.
    pub fn effective_size(&self) -> usize {
        if self.size % 2 == 0 {
            self.size
        } else {
            let forced = self.size + 1;
            log::warn!(
                "population size {} is odd, using {} instead",
                self.size,
                forced
            );
            forced
        }
    }
}

impl EvolutionConfig {
    pub fn mutation(&self) -> MutationConfig {
        MutationConfig {
            chance: self.mutation_chance,
            strength: self.mutation_strength,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.network.topology.len() < 2 {
            return invalid("topology needs at least 2 stages");
        }
        if self.network.topology.contains(&0) {
            return invalid("topology stages must be > 0");
        }
        if !(self.network.init_min <= self.network.init_max) {
            return invalid("init_min must not exceed init_max");
        }
        if self.population.size < 2 {
            return invalid("population size must be >= 2");
        }

        let probabilities = [
            ("mutation_chance", self.evolution.mutation_chance),
            ("crossover_chance", self.evolution.crossover_chance),
            ("crossover_probability", self.evolution.crossover_probability),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }
        if !(self.evolution.mutation_strength >= 0.0) {
            return invalid("mutation_strength must be >= 0");
        }
        Ok(())
    }
}
