//! Feedforward neural networks.
//!
//! - Dense layers with a shared activation function
//! - Forward propagation through a fixed topology
//! - Weight/bias mutation
//! - Uniform-swap crossover between two parents

mod activation;
mod crossover;
mod layer;
mod mutations;
mod network;

pub use activation::{Activation, SharedActivation};
pub use crossover::uniform_swap;
pub use layer::Layer;
pub use mutations::MutationConfig;
pub use network::NeuralNet;
