//! Genetic crossover between neural networks.

use super::network::NeuralNet;
use crate::error::Result;
use rand::Rng;

/// Produce two children by a per-position swap of the parents' parameters.
///
/// For every weight and every bias, with probability `crossover_chance` the
/// children inherit straight (child1 from `parent1`, child2 from `parent2`);
/// otherwise the position is swapped across the children. Children are built
/// from a [`NeuralNet::topology_copy`] of `parent1`, so they keep its
/// activations and start with zero fitness.
pub fn uniform_swap<R: Rng + ?Sized>(
    parent1: &NeuralNet,
    parent2: &NeuralNet,
    crossover_chance: f32,
    rng: &mut R,
) -> Result<(NeuralNet, NeuralNet)> {
    parent1.ensure_same_topology(parent2)?;

    let mut child1 = parent1.topology_copy();
    let mut child2 = parent1.topology_copy();

    let layers = child1
        .layers_mut()
        .iter_mut()
        .zip(child2.layers_mut().iter_mut())
        .zip(parent1.layers().iter().zip(parent2.layers()));

    for ((c1, c2), (p1, p2)) in layers {
        let weights = c1
            .weights
            .iter_mut()
            .zip(c2.weights.iter_mut())
            .zip(p1.weights.iter().zip(p2.weights.iter()));
        let biases = c1
            .biases
            .iter_mut()
            .zip(c2.biases.iter_mut())
            .zip(p1.biases.iter().zip(p2.biases.iter()));

        for ((v1, v2), (&a, &b)) in weights.chain(biases) {
            if rng.gen::<f32>() < crossover_chance {
                *v1 = a;
                *v2 = b;
            } else {
                *v1 = b;
                *v2 = a;
            }
        }
    }

    Ok((child1, child2))
}

impl NeuralNet {
    /// Crossover with another network, see [`uniform_swap`].
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        other: &Self,
        crossover_chance: f32,
        rng: &mut R,
    ) -> Result<(Self, Self)> {
        uniform_swap(self, other, crossover_chance, rng)
    }
}
