//! Weight and bias mutations.

use super::network::NeuralNet;
use rand::Rng;

/// Configuration for mutation operations
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MutationConfig {
    /// Probability of perturbing each weight and bias
    pub chance: f32,
    /// Perturbations are drawn from `[-strength, strength]`
    pub strength: f32,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            chance: 0.01,
            strength: 0.5,
        }
    }
}

impl MutationConfig {
    /// True when mutation cannot change any value
    pub fn is_noop(&self) -> bool {
        self.chance <= 0.0 || self.strength == 0.0
    }
}

impl NeuralNet {
    /// Mutate every layer in place, see [`Layer::mutate`](super::Layer::mutate).
    pub fn mutate<R: Rng + ?Sized>(&mut self, chance: f32, magnitude: f32, rng: &mut R) {
        for layer in self.layers_mut() {
            layer.mutate(chance, magnitude, rng);
        }
    }

    /// Apply the mutation described by `config`
    pub fn mutate_with<R: Rng + ?Sized>(&mut self, config: &MutationConfig, rng: &mut R) {
        self.mutate(config.chance, config.strength, rng);
    }
}
