//! Network structure and forward propagation.

use super::activation::SharedActivation;
use super::layer::Layer;
use crate::error::{NetworkError, Result};
use rand::Rng;
use std::cmp::Ordering;
use std::fmt;

/// Fully connected feedforward network
#[derive(Clone, Debug)]
pub struct NeuralNet {
    /// Neuron count per stage, input stage first
    topology: Vec<usize>,
    /// `topology.len() - 1` layers chained end to end
    layers: Vec<Layer>,
    /// Diagnostic weight count including a virtual bias unit per stage
    weight_count: usize,
    /// Score assigned by the environment for the current round
    fitness: f32,
}

impl NeuralNet {
    /// Zero-weighted network with one sigmoid layer per adjacent stage pair.
    pub fn new(topology: &[usize]) -> Result<Self> {
        if topology.len() < 2 {
            return Err(NetworkError::InvalidTopology {
                stages: topology.len(),
            });
        }

        let layers = topology
            .windows(2)
            .map(|pair| Layer::new(pair[0], pair[1]))
            .collect();

        Ok(Self {
            topology: topology.to_vec(),
            layers,
            weight_count: Self::count_weights(topology),
            fitness: 0.0,
        })
    }

    fn count_weights(topology: &[usize]) -> usize {
        topology
            .windows(2)
            .map(|pair| (pair[0] + 1) * pair[1])
            .sum()
    }

    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Layers for in-place value edits; shapes stay fixed.
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    #[inline]
    pub fn n_inputs(&self) -> usize {
        self.topology[0]
    }

    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    /// Sum of `(size_i + 1) * size_{i+1}` over adjacent stages.
    ///
    /// Not checked against the real storage, which holds `n` biases per layer.
    pub fn weight_count(&self) -> usize {
        self.weight_count
    }

    /// Get total number of stored parameters (weights + biases)
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    /// Fails with `ShapeMismatch` at the first stage where the topologies differ.
    pub(crate) fn ensure_same_topology(&self, other: &Self) -> Result<()> {
        if self.topology.len() != other.topology.len() {
            return Err(NetworkError::shape(
                "topology stages",
                self.topology.len(),
                other.topology.len(),
            ));
        }
        match self.topology.iter().zip(&other.topology).find(|(a, b)| a != b) {
            Some((&expected, &actual)) => Err(NetworkError::shape("topology stage size", expected, actual)),
            None => Ok(()),
        }
    }

    /// Ascending by fitness; ties and NaN compare equal.
    pub fn cmp_fitness(&self, other: &Self) -> Ordering {
        self.fitness
            .partial_cmp(&other.fitness)
            .unwrap_or(Ordering::Equal)
    }

    /// Propagate inputs through every layer in topology order.
    pub fn feed_forward(&self, inputs: &[f32]) -> Result<Vec<f32>> {
        let (first, rest) = self
            .layers
            .split_first()
            .ok_or(NetworkError::InvalidTopology { stages: self.topology.len() })?;

        let mut activation = first.calculate(inputs)?;
        for layer in rest {
            activation = layer.calculate(&activation)?;
        }

        Ok(activation)
    }

    /// Randomize every weight and bias in `[min, max]`.
    pub fn randomize_all<R: Rng + ?Sized>(&mut self, min: f32, max: f32, rng: &mut R) {
        for layer in &mut self.layers {
            layer.randomize_weights(min, max, rng);
            layer.randomize_biases(min, max, rng);
        }
    }

    /// Install one activation on every layer.
    pub fn set_activation_function(&mut self, activation: Option<SharedActivation>) -> Result<()> {
        let activation = activation.ok_or(NetworkError::NullActivation)?;
        for layer in &mut self.layers {
            layer.set_activation_function(SharedActivation::clone(&activation));
        }
        Ok(())
    }

    /// Same topology and activations, zero weights and biases, zero fitness.
    pub fn topology_copy(&self) -> Self {
        Self {
            topology: self.topology.clone(),
            layers: self.layers.iter().map(Layer::blank_copy).collect(),
            weight_count: self.weight_count,
            fitness: 0.0,
        }
    }

    /// Independent copy of every layer; activations stay shared.
    ///
    /// Fitness is not carried over.
    pub fn deep_copy(&self) -> Self {
        Self {
            topology: self.topology.clone(),
            layers: self.layers.iter().map(Layer::deep_copy).collect(),
            weight_count: self.weight_count,
            fitness: 0.0,
        }
    }

    /// Check if network is valid (no NaN/Inf)
    pub fn is_valid(&self) -> bool {
        self.layers.iter().all(Layer::is_valid)
    }
}

impl fmt::Display for NeuralNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(f, "Layer_{}:", i)?;
            writeln!(f, "{}", layer)?;
        }
        Ok(())
    }
}
