//! # NEUROEVO
//!
//! Feedforward neural networks trained by a genetic algorithm.
//!
//! ## Features
//!
//! - **Layered networks**: dense weight matrices chained by a topology vector
//! - **Shared activations**: rectified, sigmoid and tanh, shared across layers
//! - **Evolution**: ranking, uniform-swap crossover, mutation and reinsertion
//! - **External fitness**: the environment scores networks, the crate evolves them
//! - **Reproducible**: seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust
//! use neuroevo::{Config, FitnessReport, Population};
//!
//! let mut config = Config::default();
//! config.population.size = 10;
//!
//! let mut population = Population::new_with_seed(&config, 42).unwrap();
//!
//! // The environment drives each network and reports a score
//! let scores: Vec<f32> = population
//!     .networks()
//!     .iter()
//!     .map(|net| net.feed_forward(&[0.1, 0.2, 0.3, 0.4, 0.5]).unwrap()[0])
//!     .collect();
//! population.assign_fitness(&FitnessReport::from_scores(&scores)).unwrap();
//!
//! let stats = population.evolve().unwrap();
//! assert_eq!(stats.generation, 1);
//! assert_eq!(population.networks().len(), 10);
//! ```
//!
//! ## Networks
//!
//! ```rust
//! use neuroevo::neural::{Activation, NeuralNet};
//!
//! let mut net = NeuralNet::new(&[5, 3, 2]).unwrap();
//! net.set_activation_function(Some(Activation::Tanh.shared())).unwrap();
//!
//! let outputs = net.feed_forward(&[0.0; 5]).unwrap();
//! assert_eq!(outputs, vec![0.0, 0.0]);
//! ```

pub mod config;
pub mod error;
pub mod evolution;
pub mod fitness;
pub mod neural;
pub mod stats;

// Re-export main types
pub use config::Config;
pub use error::{ConfigError, NetworkError, Result};
pub use evolution::{EvolutionEngine, Population};
pub use fitness::{Evaluated, FitnessReport};
pub use neural::{Activation, Layer, NeuralNet};
pub use stats::{GenerationStats, StatsHistory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
